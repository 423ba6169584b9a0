mod errors;
mod internal;

use async_trait::async_trait;

use crate::data::{Note, NoteId};
use crate::identity_string::IdentityStr;

pub use errors::*;
pub use internal::{NoteStorage, NoteStorageImpl};

/// Durable per-identity note collections.
///
/// `load` and `save` are the only durability primitives: every mutation
/// rewrites the whole collection of the identity. `save` is all-or-nothing,
/// a failed or interrupted save leaves the previous collection readable.
///
/// `upsert` and `delete` are read-modify-write over the collection and are
/// not isolated from each other. Two concurrent mutations of the same
/// identity may both load before either saves, in which case the later save
/// silently drops the earlier one's change. Callers are expected to run a
/// single session per identity.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// All notes of the identity in stored order, empty if nothing has been
    /// saved yet.
    async fn load(
        &self,
        identity: &IdentityStr,
    ) -> Result<Vec<Note>, StorageError>;

    /// Replaces the whole collection. Timestamps are stored as given, only
    /// `upsert` restamps the note it writes.
    async fn save(
        &self,
        identity: &IdentityStr,
        notes: &[Note],
    ) -> Result<(), StorageError>;

    async fn upsert(
        &self,
        identity: &IdentityStr,
        note: Note,
    ) -> Result<(), StorageError>;

    /// Deleting an id that isn't stored is not an error.
    async fn delete(
        &self,
        identity: &IdentityStr,
        note_id: &NoteId,
    ) -> Result<(), StorageError>;
}
