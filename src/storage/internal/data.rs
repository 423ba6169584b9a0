use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::data::{Note, NoteId, from_unix_millis, to_unix_millis};
use crate::identity_string::IdentityStr;
use crate::storage::{ReadError, WriteError};

#[derive(Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NotesData {
    #[serde(default)]
    pub notes: Vec<NoteData>,
}

#[derive(Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct NoteData {
    pub id: String,
    pub owner_identity: String,
    pub title: String,
    pub body: String,
    pub created_at_or_updated_at: i64,
    pub location_label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_ref: Option<String>,
}

impl NotesData {
    pub fn from_notes(
        identity: &IdentityStr,
        notes: &[Note],
    ) -> Result<NotesData, WriteError> {
        let mut seen = HashSet::with_capacity(notes.len());
        let notes = notes.iter()
            .map(|note| {
                if note.owner_identity.as_str() != identity.as_str() {
                    return Err(WriteError::ForeignOwner { note_id: note.id.clone() });
                }
                if !seen.insert(note.id.as_str()) {
                    return Err(WriteError::DuplicateId(note.id.clone()));
                }
                Ok(
                    NoteData {
                        id: note.id.as_str().to_owned(),
                        owner_identity: note.owner_identity.as_str().to_owned(),
                        title: note.title.clone(),
                        body: note.body.clone(),
                        created_at_or_updated_at: to_unix_millis(note.updated_at),
                        location_label: note.location_label.clone(),
                        attachment_ref: note.attachment_ref.clone(),
                    }
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(NotesData { notes })
    }

    pub fn into_notes(
        self,
        identity: &IdentityStr,
    ) -> Result<Vec<Note>, ReadError> {
        let mut seen = HashSet::with_capacity(self.notes.len());
        self.notes
            .into_iter()
            .map(|data| {
                let id = NoteId::from(data.id);
                if data.owner_identity != identity.as_str() {
                    return Err(ReadError::ForeignOwner { note_id: id });
                }
                if !seen.insert(id.clone()) {
                    return Err(ReadError::DuplicateId(id));
                }
                Ok(
                    Note {
                        id,
                        owner_identity: data.owner_identity.into(),
                        title: data.title,
                        body: data.body,
                        updated_at: from_unix_millis(data.created_at_or_updated_at)?,
                        location_label: data.location_label,
                        attachment_ref: data.attachment_ref,
                    }
                )
            })
            .collect()
    }
}
