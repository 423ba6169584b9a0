use std::sync::Arc;

use thiserror::Error;

use crate::storage::StorageError;

// cloneable so the same failure can be both returned and published
#[derive(Clone, Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Storage(Arc<StorageError>),
}

impl From<StorageError> for SessionError {
    fn from(value: StorageError) -> Self {
        SessionError::Storage(Arc::new(value))
    }
}
