use std::borrow::Borrow;
use std::fmt::{Display, Formatter};

use time::error::ComponentRange;
use time::{Duration, UtcDateTime};

use crate::identity_string::IdentityString;
use crate::rng::make_uuid;

/// Location label stored while the place name is still being resolved.
pub const LOCATION_PENDING: &str = "Fetching location...";

const NANOS_IN_MILLI: i128 = 1_000_000;

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NoteId(String);

impl NoteId {
    pub fn generate() -> Self {
        NoteId(make_uuid(&mut rand::rng()).hyphenated().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        NoteId(value)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        NoteId(value.to_owned())
    }
}

impl Borrow<str> for NoteId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Note {
    pub id: NoteId,
    pub owner_identity: IdentityString,
    pub title: String,
    pub body: String,
    /// Set at creation, restamped by the storage on every write.
    pub updated_at: UtcDateTime,
    pub location_label: String,
    pub attachment_ref: Option<String>,
}

impl Note {
    pub fn new(
        owner_identity: IdentityString,
        title: impl Into<String>,
        body: impl Into<String>,
        location_label: impl Into<String>,
    ) -> Self {
        Note {
            id: NoteId::generate(),
            owner_identity,
            title: title.into(),
            body: body.into(),
            updated_at: truncate_to_millis(UtcDateTime::now()),
            location_label: location_label.into(),
            attachment_ref: None,
        }
    }

    pub fn with_attachment(mut self, attachment_ref: impl Into<String>) -> Self {
        self.attachment_ref = Some(attachment_ref.into());
        self
    }

    pub fn is_location_pending(&self) -> bool {
        self.location_label == LOCATION_PENDING
    }
}

/// Replaces the note with the same id keeping its position, appends
/// otherwise. Returns whether a note got replaced.
pub fn upsert_into(notes: &mut Vec<Note>, note: Note) -> bool {
    match notes.iter_mut().find(|n| n.id == note.id) {
        Some(existing) => {
            *existing = note;
            true
        },
        None => {
            notes.push(note);
            false
        },
    }
}

/// Returns whether anything was removed.
pub fn remove_from(notes: &mut Vec<Note>, note_id: &NoteId) -> bool {
    let len_before = notes.len();
    notes.retain(|n| n.id != *note_id);
    notes.len() != len_before
}

pub fn truncate_to_millis(time: UtcDateTime) -> UtcDateTime {
    time - Duration::nanoseconds(i64::from(time.nanosecond() % 1_000_000))
}

// rounds down like truncate_to_millis, also before the epoch
pub fn to_unix_millis(time: UtcDateTime) -> i64 {
    time.unix_timestamp_nanos().div_euclid(NANOS_IN_MILLI) as i64
}

pub fn from_unix_millis(millis: i64) -> Result<UtcDateTime, ComponentRange> {
    UtcDateTime::from_unix_timestamp_nanos(i128::from(millis) * NANOS_IN_MILLI)
}
