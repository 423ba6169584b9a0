use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use libc::{mode_t, uid_t};
use log::{debug, error, info, trace};

use crate::config::AppConfig;
use crate::data::{Note, NoteId, remove_from, truncate_to_millis, upsert_into};
use crate::identity_string::IdentityStr;
use crate::lib_constants::{
    NOTES_DIRECTORY_PATH,
    NOTES_FILENAME_PREFIX,
    NOTES_FILENAME_SUFFIX,
    REQUIRED_NOTES_DIR_PERMISSIONS,
    TMP_FILENAME_INFIX,
};
use crate::storage::{NoteStore, ReadError, StorageError, WriteError};

use data::NotesData;
use io_trait::{Metadata, NoteStorageIo, ProductionNoteStorageIo};

mod data;
mod io_trait;

pub type NoteStorage = NoteStorageImpl<ProductionNoteStorageIo>;

/// File-backed [`NoteStore`], one JSON file per identity under
/// `<data directory>/notes`.
#[allow(private_bounds)]
#[derive(Debug)]
pub struct NoteStorageImpl<Io: NoteStorageIo> {
    io: Io,
    notes_dir: PathBuf,
    max_collection_size: u64,
}

impl NoteStorage {
    pub async fn new(
        app_config: &AppConfig,
    ) -> Result<NoteStorage, StorageError> {
        Self::new_internal(
            &app_config.data_directory,
            app_config.max_collection_size,
            ProductionNoteStorageIo::new(),
        ).await
    }

    pub fn get_notes_dir(app_config: &AppConfig) -> PathBuf {
        app_config.data_directory.join(NOTES_DIRECTORY_PATH)
    }
}

#[allow(private_bounds)]
impl<Io: NoteStorageIo> NoteStorageImpl<Io> {
    async fn new_internal(
        data_dir: &Path,
        max_collection_size: u64,
        io: Io,
    ) -> Result<NoteStorageImpl<Io>, StorageError> {
        debug!("creating note storage at \"{}\"", data_dir.display());
        match io.metadata(data_dir).await {
            Ok(Metadata { is_dir: true, .. }) => {},
            Ok(_) => return Err(StorageError::DataDirNotInitialized),
            Err(e) if e.kind() == ErrorKind::NotFound =>
                return Err(StorageError::DataDirNotInitialized),
            Err(e) => return Err(StorageError::Setup(e)),
        }
        let notes_dir = data_dir.join(NOTES_DIRECTORY_PATH);
        let meta = match io.metadata(&notes_dir).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("creating notes directory \"{}\"", notes_dir.display());
                io.create_dir(&notes_dir).await.map_err(StorageError::Setup)?;
                io.metadata(&notes_dir).await.map_err(StorageError::Setup)?
            },
            Err(e) => return Err(StorageError::Setup(e)),
        };
        if !meta.is_dir {
            return Err(StorageError::DataDirNotInitialized);
        }
        validate_notes_dir_permissions(&meta, io.get_uid())?;
        Ok(NoteStorageImpl { io, notes_dir, max_collection_size })
    }

    async fn read_collection(
        &self,
        identity: &IdentityStr,
    ) -> Result<Vec<Note>, ReadError> {
        let path = self.get_notes_path(identity);
        debug!(
            "reading notes for \"{identity}\" at \"{}\"",
            path.display(),
        );
        let contents = match self.io
            .read_file(&path, self.max_collection_size.saturating_add(1))
            .await
        {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no notes stored for \"{identity}\" yet");
                return Ok(Vec::new());
            },
            Err(e) => return Err(e.into()),
        };
        trace!("read {} bytes of notes for \"{identity}\"", contents.len());
        if contents.len() as u64 > self.max_collection_size {
            return Err(ReadError::TooBig);
        }
        let data: NotesData = serde_json::from_slice(&contents)?;
        let notes = data.into_notes(identity)?;
        trace!("decoded {} notes for \"{identity}\"", notes.len());
        Ok(notes)
    }

    async fn write_collection(
        &self,
        identity: &IdentityStr,
        notes: &[Note],
    ) -> Result<(), WriteError> {
        let serialized = serde_json::to_vec(&NotesData::from_notes(identity, notes)?)?;
        let filename = self.get_notes_path(identity);
        let tmp_filename = self.get_notes_tmp_path(identity);
        debug!(
            "writing {} notes for \"{identity}\" to \"{}\"",
            notes.len(),
            filename.display(),
        );
        trace!(
            "tmp filename for \"{identity}\": \"{}\"",
            tmp_filename.display(),
        );
        if let Err(e) = self.io.write_file(&tmp_filename, &serialized).await {
            error!(
                "failed to write tmp file \"{}\" for \"{identity}\": {e}",
                tmp_filename.display(),
            );
            self.remove_tmp_file(&tmp_filename).await;
            return Err(e.into());
        }
        trace!(
            "renaming tmp file \"{}\" for \"{identity}\"",
            tmp_filename.display(),
        );
        if let Err(e) = self.io.rename_file(&tmp_filename, &filename).await {
            error!(
                "failed to rename tmp file \"{}\" for \"{identity}\": {e}",
                tmp_filename.display(),
            );
            self.remove_tmp_file(&tmp_filename).await;
            return Err(e.into());
        }
        // the new collection is already in place, a failed directory sync
        // only weakens durability across power loss
        if let Err(e) = self.io.sync_dir(&self.notes_dir).await {
            error!(
                "failed to sync notes directory \"{}\": {e}",
                self.notes_dir.display(),
            );
        }
        Ok(())
    }

    async fn remove_tmp_file(&self, tmp_filename: &Path) {
        match self.io.remove_file(tmp_filename).await {
            Ok(()) => {},
            Err(e) if e.kind() == ErrorKind::NotFound => {},
            Err(e) => error!(
                "failed to remove tmp file \"{}\": {e}",
                tmp_filename.display(),
            ),
        }
    }

    fn get_notes_path(&self, identity: &IdentityStr) -> PathBuf {
        self.notes_dir.join(
            NOTES_FILENAME_PREFIX.to_owned() +
                &identity.to_filename_part() +
                NOTES_FILENAME_SUFFIX
        )
    }

    fn get_notes_tmp_path(&self, identity: &IdentityStr) -> PathBuf {
        let mut path = self.get_notes_path(identity).into_os_string();
        path.push(TMP_FILENAME_INFIX);
        path.push(self.io.generate_uuid().hyphenated().to_string());
        path.into()
    }
}

#[async_trait]
impl<Io: NoteStorageIo> NoteStore for NoteStorageImpl<Io> {
    async fn load(
        &self,
        identity: &IdentityStr,
    ) -> Result<Vec<Note>, StorageError> {
        Ok(self.read_collection(identity).await?)
    }

    async fn save(
        &self,
        identity: &IdentityStr,
        notes: &[Note],
    ) -> Result<(), StorageError> {
        Ok(self.write_collection(identity, notes).await?)
    }

    async fn upsert(
        &self,
        identity: &IdentityStr,
        mut note: Note,
    ) -> Result<(), StorageError> {
        debug!("upserting note {} for \"{identity}\"", note.id);
        let mut notes = self.read_collection(identity).await?;
        note.updated_at = truncate_to_millis(self.io.get_time());
        let note_id = note.id.clone();
        let replaced = upsert_into(&mut notes, note);
        trace!(
            "note {note_id} for \"{identity}\" {}",
            if replaced { "replaced" } else { "appended" },
        );
        Ok(self.write_collection(identity, &notes).await?)
    }

    async fn delete(
        &self,
        identity: &IdentityStr,
        note_id: &NoteId,
    ) -> Result<(), StorageError> {
        debug!("deleting note {note_id} for \"{identity}\"");
        let mut notes = self.read_collection(identity).await?;
        if !remove_from(&mut notes, note_id) {
            debug!("note {note_id} for \"{identity}\" not found, nothing to delete");
            return Ok(());
        }
        Ok(self.write_collection(identity, &notes).await?)
    }
}

fn validate_notes_dir_permissions(
    meta: &Metadata,
    uid: uid_t,
) -> Result<(), StorageError> {
    let required = REQUIRED_NOTES_DIR_PERMISSIONS as mode_t;
    if meta.uid != uid || meta.mode & required != required {
        return Err(StorageError::Permission);
    }
    Ok(())
}
