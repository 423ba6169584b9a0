use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use libc::uid_t;
use time::UtcDateTime;
use tokio::io;
use tokio::sync::Barrier;
use uuid::Uuid;

use crate::storage::internal::io_trait::{Metadata, NoteStorageIo};
use crate::storage::internal::tests::data::{DATA_DIR, NOW, TEST_UID};

// an in-memory file tree, every mutating call is recorded as an event
pub struct TestStorageIo {
    entries: Mutex<HashMap<PathBuf, TestEntry>>,
    events: Mutex<Vec<StorageWrite>>,
    faults: Mutex<Faults>,
    read_barrier: Mutex<Option<(Arc<Barrier>, usize)>>,
    uuid_counter: AtomicU64,
    now: Mutex<UtcDateTime>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TestEntry {
    Dir {
        uid: uid_t,
        mode: u32,
    },
    File(Vec<u8>),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StorageWrite {
    CreateDir {
        path: PathBuf,
    },
    Write {
        path: PathBuf,
        data: Vec<u8>,
    },
    Rename {
        from: PathBuf,
        to: PathBuf,
    },
    Remove {
        path: PathBuf,
    },
    SyncDir {
        path: PathBuf,
    },
}

#[derive(Default)]
pub struct Faults {
    pub metadata: Option<io::ErrorKind>,
    pub read: Option<io::ErrorKind>,
    pub write: Option<WriteFault>,
    pub rename: bool,
    pub remove: bool,
    pub sync_dir: bool,
}

#[derive(Clone, Copy, Debug)]
pub enum WriteFault {
    // nothing gets created
    Fail,
    // only the first n bytes reach the file, then the write fails
    Truncate(usize),
}

impl TestStorageIo {
    /// An empty tree containing just the data directory.
    pub fn new() -> Self {
        let io = TestStorageIo::empty();
        io.put_entry(DATA_DIR, TestEntry::Dir { uid: TEST_UID, mode: 0o700 });
        io
    }

    pub fn empty() -> Self {
        TestStorageIo {
            entries: Mutex::new(HashMap::from([
                ("/".into(), TestEntry::Dir { uid: 0, mode: 0o755 }),
            ])),
            events: Mutex::new(Vec::new()),
            faults: Mutex::new(Faults::default()),
            read_barrier: Mutex::new(None),
            uuid_counter: AtomicU64::new(0),
            now: Mutex::new(*NOW),
        }
    }

    pub fn put_entry(&self, path: impl Into<PathBuf>, entry: TestEntry) {
        self.entries.lock().unwrap().insert(path.into(), entry);
    }

    pub fn put_file(&self, path: impl Into<PathBuf>, contents: impl AsRef<[u8]>) {
        self.put_entry(path, TestEntry::File(contents.as_ref().to_vec()));
    }

    pub fn file_contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        match self.entries.lock().unwrap().get(path.as_ref()) {
            Some(TestEntry::File(contents)) => Some(contents.clone()),
            _ => None,
        }
    }

    pub fn file_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<_> = self.entries.lock().unwrap()
            .iter()
            .filter(|(_, entry)| matches!(entry, TestEntry::File(_)))
            .map(|(path, _)| path.clone())
            .collect();
        paths.sort();
        paths
    }

    pub fn events(&self) -> Vec<StorageWrite> {
        self.events.lock().unwrap().to_vec()
    }

    pub fn clear_events(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn set_faults(&self, f: impl FnOnce(&mut Faults)) {
        f(&mut self.faults.lock().unwrap());
    }

    pub fn clear_faults(&self) {
        *self.faults.lock().unwrap() = Faults::default();
    }

    pub fn set_now(&self, now: UtcDateTime) {
        *self.now.lock().unwrap() = now;
    }

    /// The next `readers` reads wait for each other before returning.
    pub fn set_read_barrier(&self, readers: usize) {
        *self.read_barrier.lock().unwrap() =
            Some((Arc::new(Barrier::new(readers)), readers));
    }

    fn take_read_barrier(&self) -> Option<Arc<Barrier>> {
        let mut slot = self.read_barrier.lock().unwrap();
        let (barrier, remaining) = slot.as_mut()?;
        let barrier = barrier.clone();
        *remaining -= 1;
        if *remaining == 0 {
            *slot = None;
        }
        Some(barrier)
    }

    fn record(&self, event: StorageWrite) {
        self.events.lock().unwrap().push(event);
    }

    fn parent_is_dir(entries: &HashMap<PathBuf, TestEntry>, path: &Path) -> bool {
        path.parent()
            .and_then(|parent| entries.get(parent))
            .is_some_and(|entry| matches!(entry, TestEntry::Dir { .. }))
    }
}

impl Debug for TestStorageIo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("TestStorageIo")
    }
}

#[async_trait]
impl NoteStorageIo for TestStorageIo {
    async fn metadata(&self, path: &Path) -> io::Result<Metadata> {
        if let Some(kind) = self.faults.lock().unwrap().metadata {
            return Err(kind.into());
        }
        match self.entries.lock().unwrap().get(path) {
            Some(TestEntry::Dir { uid, mode }) =>
                Ok(Metadata { is_dir: true, uid: *uid, mode: *mode as libc::mode_t }),
            Some(TestEntry::File(_)) =>
                Ok(Metadata { is_dir: false, uid: TEST_UID, mode: 0o600 }),
            None => Err(io::ErrorKind::NotFound.into()),
        }
    }

    async fn create_dir(&self, path: &Path) -> io::Result<()> {
        self.record(StorageWrite::CreateDir { path: path.into() });
        let mut entries = self.entries.lock().unwrap();
        if !Self::parent_is_dir(&entries, path) {
            return Err(io::ErrorKind::NotFound.into());
        }
        if entries.contains_key(path) {
            return Err(io::ErrorKind::AlreadyExists.into());
        }
        entries.insert(path.into(), TestEntry::Dir { uid: TEST_UID, mode: 0o700 });
        Ok(())
    }

    async fn read_file(&self, path: &Path, limit: u64) -> io::Result<Vec<u8>> {
        if let Some(barrier) = self.take_read_barrier() {
            barrier.wait().await;
        }
        if let Some(kind) = self.faults.lock().unwrap().read {
            return Err(kind.into());
        }
        match self.entries.lock().unwrap().get(path) {
            Some(TestEntry::File(contents)) => Ok(
                contents.iter()
                    .take(usize::try_from(limit).unwrap_or(usize::MAX))
                    .copied()
                    .collect()
            ),
            Some(TestEntry::Dir { .. }) => Err(io::ErrorKind::Other.into()),
            None => Err(io::ErrorKind::NotFound.into()),
        }
    }

    async fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        self.record(StorageWrite::Write { path: path.into(), data: data.to_vec() });
        let fault = self.faults.lock().unwrap().write;
        let mut entries = self.entries.lock().unwrap();
        if !Self::parent_is_dir(&entries, path) {
            return Err(io::ErrorKind::NotFound.into());
        }
        if entries.contains_key(path) {
            return Err(io::ErrorKind::AlreadyExists.into());
        }
        match fault {
            None => {
                entries.insert(path.into(), TestEntry::File(data.to_vec()));
                Ok(())
            },
            Some(WriteFault::Fail) => Err(io::ErrorKind::StorageFull.into()),
            Some(WriteFault::Truncate(len)) => {
                let len = len.min(data.len());
                entries.insert(path.into(), TestEntry::File(data[..len].to_vec()));
                Err(io::ErrorKind::WriteZero.into())
            },
        }
    }

    async fn rename_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.record(StorageWrite::Rename { from: from.into(), to: to.into() });
        if self.faults.lock().unwrap().rename {
            return Err(io::ErrorKind::Other.into());
        }
        let mut entries = self.entries.lock().unwrap();
        let entry = entries.remove(from)
            .ok_or(io::Error::from(io::ErrorKind::NotFound))?;
        entries.insert(to.into(), entry);
        Ok(())
    }

    async fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.record(StorageWrite::Remove { path: path.into() });
        if self.faults.lock().unwrap().remove {
            return Err(io::ErrorKind::Other.into());
        }
        self.entries.lock().unwrap()
            .remove(path)
            .map(|_| ())
            .ok_or(io::ErrorKind::NotFound.into())
    }

    async fn sync_dir(&self, path: &Path) -> io::Result<()> {
        self.record(StorageWrite::SyncDir { path: path.into() });
        if self.faults.lock().unwrap().sync_dir {
            return Err(io::ErrorKind::Other.into());
        }
        Ok(())
    }

    fn get_uid(&self) -> uid_t {
        TEST_UID
    }

    fn get_time(&self) -> UtcDateTime {
        *self.now.lock().unwrap()
    }

    fn generate_uuid(&self) -> Uuid {
        Uuid::from_u128(u128::from(self.uuid_counter.fetch_add(1, Ordering::Relaxed)) + 1)
    }
}
