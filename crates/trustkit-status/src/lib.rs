//! # trustkit-status — Status Lists
//!
//! Revocation and suspension state for issued credentials, held in packed
//! bitstrings. Each [`StatusList`] belongs to one `(issuer, purpose)` pair
//! and owns an index space: a credential is assigned at most one index per
//! list and an index is held by at most one credential.
//!
//! ## Encoding
//!
//! Bit `i` lives in byte `i / 8` at mask `0x80 >> (i % 8)` (most
//! significant bit first). The packed bytes are published as standard
//! padded base64. See [`BitString`].
//!
//! ## Concurrency
//!
//! [`StatusListManager`] guards every list with its own lock. Operations on
//! different lists never contend, and index assignment within one list is
//! linearizable.

pub mod bitstring;
pub mod error;
pub mod list;
pub mod manager;

pub use bitstring::BitString;
pub use error::StatusListError;
pub use list::{StatusCheck, StatusList, StatusListSnapshot, StatusStatistics, StatusUpdate};
pub use manager::StatusListManager;

/// `type` of the `credentialStatus` entries this crate produces.
pub const STATUS_ENTRY_TYPE: &str = "BitstringStatusListEntry";
