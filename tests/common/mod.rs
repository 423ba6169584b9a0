#![allow(dead_code)]

use std::path::PathBuf;

use assert_fs::TempDir;
use locnotes::config::AppConfig;
use locnotes::data::{Note, from_unix_millis};
use locnotes::logging::init_test_logging;
use locnotes::storage::NoteStorage;

pub const IDENTITY: &str = "a@x.com";
pub const IDENTITY_NOTES_FILENAME: &str = "notes_a%40x.com.json";

pub fn make_config(dir: &TempDir) -> AppConfig {
    AppConfig {
        data_directory: dir.path().to_path_buf(),
        max_collection_size: 64 * 1024,
    }
}

pub async fn setup_storage() -> (TempDir, NoteStorage) {
    init_test_logging();
    let dir = TempDir::new().expect("failed to create temp dir");
    let storage = NoteStorage::new(&make_config(&dir))
        .await
        .expect("storage creation failed");
    (dir, storage)
}

pub fn notes_file(dir: &TempDir, filename: &str) -> PathBuf {
    dir.path().join("notes").join(filename)
}

pub fn make_note(id: &str, title: &str) -> Note {
    Note {
        id: id.into(),
        owner_identity: IDENTITY.into(),
        title: title.into(),
        body: "B".into(),
        updated_at: from_unix_millis(1_700_000_000_000).unwrap(),
        location_label: "City".into(),
        attachment_ref: None,
    }
}
