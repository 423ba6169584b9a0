use std::os::unix::prelude::*;
use std::path::Path;

use async_trait::async_trait;
use libc::{mode_t, uid_t};
use time::UtcDateTime;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::{fs, io};
use uuid::Uuid;

use crate::lib_constants::{NOTES_FILE_PERMISSIONS, REQUIRED_NOTES_DIR_PERMISSIONS};
use crate::rng::make_uuid;

#[async_trait]
pub trait NoteStorageIo: Send + Sync {
    async fn metadata(&self, path: &Path) -> io::Result<Metadata>;

    async fn create_dir(&self, path: &Path) -> io::Result<()>;

    /// Reads at most `limit` bytes.
    async fn read_file(&self, path: &Path, limit: u64) -> io::Result<Vec<u8>>;

    /// Creates a new file, fails if it already exists. The data is flushed
    /// to the device before returning.
    async fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()>;

    async fn rename_file(&self, from: &Path, to: &Path) -> io::Result<()>;

    async fn remove_file(&self, path: &Path) -> io::Result<()>;

    async fn sync_dir(&self, path: &Path) -> io::Result<()>;

    fn get_uid(&self) -> uid_t;

    fn get_time(&self) -> UtcDateTime;

    fn generate_uuid(&self) -> Uuid;
}

pub struct Metadata {
    pub is_dir: bool,
    pub uid: uid_t,
    pub mode: mode_t,
}

#[derive(Debug)]
pub struct ProductionNoteStorageIo;

impl ProductionNoteStorageIo {
    pub fn new() -> Self {
        ProductionNoteStorageIo
    }
}

#[async_trait]
impl NoteStorageIo for ProductionNoteStorageIo {
    async fn metadata(&self, path: &Path) -> io::Result<Metadata> {
        let meta = fs::metadata(path).await?;
        Ok(Metadata {
            is_dir: meta.is_dir(),
            uid: meta.uid(),
            mode: meta.mode() as mode_t,
        })
    }

    async fn create_dir(&self, path: &Path) -> io::Result<()> {
        fs::DirBuilder::new()
            .mode(REQUIRED_NOTES_DIR_PERMISSIONS)
            .create(path)
            .await
    }

    async fn read_file(&self, path: &Path, limit: u64) -> io::Result<Vec<u8>> {
        let file = fs::File::open(path).await?;
        let mut buf = Vec::new();
        io::BufReader::new(file).take(limit).read_to_end(&mut buf).await?;
        Ok(buf)
    }

    async fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(NOTES_FILE_PERMISSIONS)
            .open(path)
            .await?;
        file.write_all(data).await?;
        file.sync_all().await
    }

    async fn rename_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to).await
    }

    async fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path).await
    }

    async fn sync_dir(&self, path: &Path) -> io::Result<()> {
        fs::File::open(path).await?.sync_all().await
    }

    fn get_uid(&self) -> uid_t {
        unsafe { libc::getuid() }
    }

    fn get_time(&self) -> UtcDateTime {
        UtcDateTime::now()
    }

    fn generate_uuid(&self) -> Uuid {
        make_uuid(&mut rand::rng())
    }
}
