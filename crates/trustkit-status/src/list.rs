//! Status-list value types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use trustkit_vc::StatusPurpose;

/// Public view of a status list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusList {
    pub id: String,
    pub issuer: String,
    pub purpose: StatusPurpose,
    /// Number of addressable indices.
    pub capacity: usize,
    /// Base64 of the packed bitstring.
    pub encoded_list: String,
}

/// Everything needed to rebuild a list in another manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusListSnapshot {
    #[serde(flatten)]
    pub list: StatusList,
    /// Next index automatic assignment will try.
    pub cursor: usize,
    /// credential id -> index.
    pub assignments: BTreeMap<String, usize>,
}

/// Flags for one index or credential.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCheck {
    pub revoked: bool,
    pub suspended: bool,
}

impl StatusCheck {
    pub(crate) fn for_purpose(purpose: StatusPurpose, flag: bool) -> Self {
        match purpose {
            StatusPurpose::Revocation => Self {
                revoked: flag,
                suspended: false,
            },
            StatusPurpose::Suspension => Self {
                revoked: false,
                suspended: flag,
            },
        }
    }

    /// Neither revoked nor suspended.
    pub fn is_clear(&self) -> bool {
        !self.revoked && !self.suspended
    }

    pub(crate) fn merge(self, other: Self) -> Self {
        Self {
            revoked: self.revoked || other.revoked,
            suspended: self.suspended || other.suspended,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusStatistics {
    pub capacity: usize,
    pub used_indices: usize,
    pub revoked_count: usize,
    pub suspended_count: usize,
    /// Free indices at or above the assignment cursor.
    pub available_indices: usize,
}

/// One entry of a batch update. A `None` flag is left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspended: Option<bool>,
}

impl StatusUpdate {
    pub fn revoke(index: usize, on: bool) -> Self {
        Self {
            index,
            revoked: Some(on),
            suspended: None,
        }
    }

    pub fn suspend(index: usize, on: bool) -> Self {
        Self {
            index,
            revoked: None,
            suspended: Some(on),
        }
    }

    /// The requested value for `purpose`, and whether the other purpose's
    /// flag was also given.
    pub(crate) fn split(&self, purpose: StatusPurpose) -> (Option<bool>, bool) {
        match purpose {
            StatusPurpose::Revocation => (self.revoked, self.suspended.is_some()),
            StatusPurpose::Suspension => (self.suspended, self.revoked.is_some()),
        }
    }
}
