//! Session message types for presentation layer ↔ state communication

use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogKind, Catalogs, ParamValue};
use crate::state::{AppState, EmbeddingSlot, StateChange};
use crate::types::{Alignment, Embedding, Plaintext, RecordId};

/// Mutation applied to one selection queue
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum QueueOp<T> {
    /// Append without deduplication
    Push(T),

    /// Remove the oldest item
    PopFront,

    /// Add if absent, remove if present
    Toggle(T),

    /// Deduplicating push that evicts the oldest item at `threshold`
    BoundedPush { item: T, threshold: usize },

    /// Bounded push using the queue's standard selection limit
    Select(T),

    /// Shrink to at most `len` items
    Truncate(usize),

    Clear,
}

/// Things a payload can be built for
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum BuildRequest {
    GenerateEmbedding {
        name: String,
        #[serde(default)]
        description: String,
    },
    GenerateAlignment {
        name: String,
        #[serde(default)]
        description: String,
    },
    /// Embeddings of the plaintext compared in `slot`
    GetEmbeddings { slot: EmbeddingSlot },
    GetAlignments,
    GetAlignment,
    GetTopShiftedWords { num_words: u32 },
    GetContext {
        first: bool,
        #[serde(default)]
        neighbors: Option<u32>,
    },
}

/// Requests read from the session input, one per line
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum SessionRequest {
    Plaintexts(QueueOp<Plaintext>),
    Embeddings { slot: EmbeddingSlot, op: QueueOp<Embedding> },
    Alignments(QueueOp<Alignment>),

    /// Set or clear the word under inspection
    SelectWord(Option<String>),

    /// Change a catalog's selected variant; `strict` refuses unknown names
    SelectVariant {
        kind: CatalogKind,
        variant: String,
        #[serde(default)]
        strict: bool,
    },

    SetParam {
        kind: CatalogKind,
        variant: String,
        key: String,
        value: ParamValue,
    },

    /// Build a backend payload from the current selection
    Build(BuildRequest),

    GetState,
    GetCatalogs,

    /// Clear every selection
    Reset,

    /// Persist the current catalogs to the config file
    SaveConfig,

    /// Health check
    Ping,

    /// End the session
    Shutdown,
}

/// Responses written to the session output
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum SessionResponse {
    /// Queue length after a push, truncate or clear
    Length(usize),

    /// Id of the item removed from the front, if any
    Removed(Option<RecordId>),

    Toggled { id: RecordId, added: bool },

    Pushed { inserted: bool, evicted: Option<RecordId> },

    /// Parameter value replaced by `SetParam`
    Previous(Option<ParamValue>),

    State(AppState),
    Catalogs(Catalogs),

    /// Payload ready to post to the backend
    Payload { route: String, body: serde_json::Value },

    /// Unsolicited notification that state changed
    Changed(StateChange),

    /// Request processed
    Ready,

    Pong,

    Error(String),
}
