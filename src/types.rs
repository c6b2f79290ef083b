//! Records the presentation layer selects
//!
//! Field names match the rows the backend returns (`getPlainTexts`,
//! `getEmbeddings`, `getAlignments`) so they deserialize directly.

use serde::{Deserialize, Serialize};

use crate::selection::Identifiable;

/// Backend row id
pub type RecordId = u64;

/// Uploaded text corpus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plaintext {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Word embedding trained on one plaintext
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub pt_id: RecordId,
}

/// Alignment between two embeddings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alignment {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub e1_id: RecordId,
    pub e2_id: RecordId,
}

impl Plaintext {
    pub fn new(id: RecordId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
        }
    }
}

impl Embedding {
    pub fn new(id: RecordId, name: impl Into<String>, pt_id: RecordId) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            pt_id,
        }
    }
}

impl Alignment {
    pub fn new(id: RecordId, name: impl Into<String>, e1_id: RecordId, e2_id: RecordId) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            e1_id,
            e2_id,
        }
    }
}

impl Identifiable for Plaintext {
    type Id = RecordId;

    fn id(&self) -> &RecordId {
        &self.id
    }
}

impl Identifiable for Embedding {
    type Id = RecordId;

    fn id(&self) -> &RecordId {
        &self.id
    }
}

impl Identifiable for Alignment {
    type Id = RecordId;

    fn id(&self) -> &RecordId {
        &self.id
    }
}
