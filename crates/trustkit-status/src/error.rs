//! Status-list error types.

use thiserror::Error;
use trustkit_vc::StatusPurpose;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatusListError {
    #[error("status list not found: {0}")]
    ListNotFound(String),

    #[error("index {index} of list {list_id} is already assigned to {credential_id}")]
    IndexAlreadyAssigned {
        list_id: String,
        index: usize,
        credential_id: String,
    },

    #[error("list {list_id} tracks {actual}, not {requested}")]
    PurposeMismatch {
        list_id: String,
        requested: StatusPurpose,
        actual: StatusPurpose,
    },

    #[error("status list already exists: {0}")]
    ListAlreadyExists(String),

    #[error("invalid capacity: {0}")]
    InvalidCapacity(String),

    #[error("index {index} is outside capacity {capacity}")]
    IndexOutOfRange { index: usize, capacity: usize },

    /// No free index remains at or above the allocation cursor.
    #[error("list {list_id} has no free index left (capacity {capacity})")]
    CapacityExhausted { list_id: String, capacity: usize },

    #[error("credential {credential_id} already holds index {index}")]
    CredentialAlreadyIndexed { credential_id: String, index: usize },

    #[error("invalid encoded list: {0}")]
    InvalidEncoding(String),
}
