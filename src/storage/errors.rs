use thiserror::Error;
use time::error::ComponentRange;
use tokio::io::Error as IoError;

use crate::data::NoteId;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("data directory is not initialized properly")]
    DataDirNotInitialized,

    #[error("failed to set up note storage: {0}")]
    Setup(#[source] IoError),

    #[error("insufficient permissions to access storage")]
    Permission,

    #[error("failed to read notes: {0}")]
    Read(#[from] ReadError),

    #[error("failed to write notes: {0}")]
    Write(#[from] WriteError),
}

impl StorageError {
    pub fn is_read(&self) -> bool {
        matches!(self, StorageError::Read(_))
    }

    pub fn is_write(&self) -> bool {
        matches!(self, StorageError::Write(_))
    }
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error(transparent)]
    Io(#[from] IoError),

    #[error("notes file too large")]
    TooBig,

    #[error("cannot decode notes: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("cannot interpret timestamp")]
    Timestamp(#[from] ComponentRange),

    #[error("duplicate note id {0}")]
    DuplicateId(NoteId),

    #[error("note {note_id} belongs to another identity")]
    ForeignOwner { note_id: NoteId },
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error(transparent)]
    Io(#[from] IoError),

    #[error("cannot encode notes: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("duplicate note id {0}")]
    DuplicateId(NoteId),

    #[error("note {note_id} belongs to another identity")]
    ForeignOwner { note_id: NoteId },
}
