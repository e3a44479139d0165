//! # Temporal Types — UTC-Only Timestamps
//!
//! [`Timestamp`] is a UTC instant truncated to whole seconds. Credential
//! issuance and expiration dates are compared through this type so the
//! verification clock and the credential fields agree on precision.
//!
//! Non-UTC inputs are rejected by [`Timestamp::parse()`]; there is no silent
//! offset conversion on the strict path.

use chrono::{DateTime, SecondsFormat, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TrustError;

/// A UTC-only timestamp, truncated to seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// From a `DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse an RFC 3339 timestamp with a `Z` suffix.
    ///
    /// # Errors
    ///
    /// [`TrustError::InvalidTimestamp`] if the string is not RFC 3339 or uses
    /// an explicit offset (even `+00:00`).
    pub fn parse(s: &str) -> Result<Self, TrustError> {
        if !s.ends_with('Z') {
            return Err(TrustError::InvalidTimestamp(format!(
                "timestamp must use Z suffix, got {s:?}"
            )));
        }
        Self::parse_lenient(s)
    }

    /// Parse any RFC 3339 timestamp and convert it to UTC.
    ///
    /// Credentials issued elsewhere sometimes carry offsets; this is the path
    /// used when reading their dates.
    pub fn parse_lenient(s: &str) -> Result<Self, TrustError> {
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| TrustError::InvalidTimestamp(format!("{s:?}: {e}")))?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// `YYYY-MM-DDTHH:MM:SSZ`.
    pub fn to_iso8601(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}
