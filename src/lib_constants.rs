pub const DEFAULT_DATA_DIR: &str = "/var/lib/locnotes";
pub const APP_CONFIG_ENV_PREFIX: &str = "LOCNOTES_";

// a single identity's whole collection is read into memory on every
// operation, so the limit applies to the serialized file
pub const DEFAULT_MAX_COLLECTION_SIZE: u64 = 16 * 1024 * 1024;

// relative to the data directory
pub const NOTES_DIRECTORY_PATH: &str = "notes";

pub const NOTES_FILENAME_PREFIX: &str = "notes_";
pub const NOTES_FILENAME_SUFFIX: &str = ".json";
pub const TMP_FILENAME_INFIX: &str = ".tmp.";

pub const REQUIRED_NOTES_DIR_PERMISSIONS: u32 = 0o700;
pub const NOTES_FILE_PERMISSIONS: u32 = 0o600;
