//! Work records and their identity
//!
//! A [`Work`] is one catalog entry describing a book. Identity is the
//! [`WorkId`] alone: two works with identical content but different ids are
//! distinct entries.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Provenance tag given to works entered by hand
pub const MANUAL_SOURCE: &str = "manual entry";

/// Length of a generated work id
pub const WORK_ID_LEN: usize = 21;

const ID_ALPHABET: &[u8; 64] =
    b"_-0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// The whole catalog: work id to work. Ordered so serialized output is stable.
pub type Catalog = BTreeMap<WorkId, Work>;

/// Opaque unique identifier of a work
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkId(String);

impl WorkId {
    /// Generate a fresh URL-safe id.
    ///
    /// Randomness comes from v4 UUIDs. Bytes 6 and 8 carry the fixed
    /// version and variant bits, so they are skipped and every symbol of
    /// the id holds six random bits.
    pub fn generate() -> Self {
        let mut id = String::with_capacity(WORK_ID_LEN);
        while id.len() < WORK_ID_LEN {
            let bytes = Uuid::new_v4().into_bytes();
            for (i, byte) in bytes.iter().enumerate() {
                if i == 6 || i == 8 {
                    continue;
                }
                if id.len() == WORK_ID_LEN {
                    break;
                }
                id.push(ID_ALPHABET[(byte & 0x3f) as usize] as char);
            }
        }
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for WorkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for WorkId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for WorkId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The editable part of a work
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkFields {
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub isbn: String,
}

impl WorkFields {
    pub fn new(
        author: impl Into<String>,
        title: impl Into<String>,
        isbn: impl Into<String>,
    ) -> Self {
        Self {
            author: author.into(),
            title: title.into(),
            isbn: isbn.into(),
        }
    }
}

/// A single catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Work {
    pub id: WorkId,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub source: String,
    /// Keyed `FromImport` so catalog files written by earlier versions load unchanged
    #[serde(
        rename = "FromImport",
        alias = "fromImport",
        alias = "from_import",
        default
    )]
    pub from_import: bool,
}

impl Work {
    /// A hand-entered work with a freshly generated id
    pub fn manual(fields: WorkFields) -> Self {
        Self {
            id: WorkId::generate(),
            author: fields.author,
            title: fields.title,
            isbn: fields.isbn,
            source: MANUAL_SOURCE.to_string(),
            from_import: false,
        }
    }

    /// Overwrite the editable fields. Provenance is left alone.
    pub fn apply(&mut self, fields: WorkFields) {
        self.author = fields.author;
        self.title = fields.title;
        self.isbn = fields.isbn;
    }

    pub fn fields(&self) -> WorkFields {
        WorkFields {
            author: self.author.clone(),
            title: self.title.clone(),
            isbn: self.isbn.clone(),
        }
    }
}
