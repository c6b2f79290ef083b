//! Backend request payloads built from the current selection
//!
//! The computation backend is reached by the presentation layer; this module
//! only assembles the JSON bodies it expects from [`AppState`] and the
//! selected catalog variants, and rejects selections the backend would
//! refuse anyway.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{Catalogs, ParamValue, Params};
use crate::constants::requests::{ALIGNMENT_TYPE_KEY, DEFAULT_NEIGHBORS};
use crate::state::{AppState, EmbeddingSlot};
use crate::types::RecordId;

/// Train an embedding on the most recently selected plaintext
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateEmbeddingRequest {
    pub id: RecordId,
    pub name: String,
    pub description: String,
    pub embedding_type: String,
    pub config: Params,
}

/// Align the embeddings selected for the two comparison slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateAlignmentRequest {
    pub e1_id: RecordId,
    pub e2_id: RecordId,
    pub name: String,
    pub description: String,
    pub config: Params,
}

/// List existing alignments for the selected embedding pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentsQuery {
    pub e1_id: RecordId,
    pub e2_id: RecordId,
}

/// List the embeddings trained on the plaintext a slot compares
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingsQuery {
    pub pt_id: RecordId,
}

/// Fetch one alignment by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentQuery {
    pub id: RecordId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopShiftedWordsQuery {
    pub id: RecordId,
    pub num_words: u32,
}

/// Nearest neighbors of the selected word across an alignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextQuery {
    pub a_id: RecordId,
    pub word: String,
    /// Whether `word` belongs to the first embedding of the alignment
    pub first: bool,
    pub neighbors: u32,
}

/// Any payload this crate can build, tagged with its backend route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BackendRequest {
    GenerateEmbedding(GenerateEmbeddingRequest),
    GenerateAlignment(GenerateAlignmentRequest),
    GetEmbeddings(EmbeddingsQuery),
    GetAlignments(AlignmentsQuery),
    GetAlignment(AlignmentQuery),
    GetTopShiftedWords(TopShiftedWordsQuery),
    GetContext(ContextQuery),
}

impl BackendRequest {
    pub fn route(&self) -> &'static str {
        match self {
            BackendRequest::GenerateEmbedding(_) => "/generateEmbedding",
            BackendRequest::GenerateAlignment(_) => "/generateAlignment",
            BackendRequest::GetEmbeddings(_) => "/getEmbeddings",
            BackendRequest::GetAlignments(_) => "/getAlignments",
            BackendRequest::GetAlignment(_) => "/getAlignment",
            BackendRequest::GetTopShiftedWords(_) => "/getTopShiftedWords",
            BackendRequest::GetContext(_) => "/getContext",
        }
    }

    /// JSON body without the enum tag
    pub fn body(&self) -> Result<serde_json::Value> {
        let body = match self {
            BackendRequest::GenerateEmbedding(req) => serde_json::to_value(req),
            BackendRequest::GenerateAlignment(req) => serde_json::to_value(req),
            BackendRequest::GetEmbeddings(req) => serde_json::to_value(req),
            BackendRequest::GetAlignments(req) => serde_json::to_value(req),
            BackendRequest::GetAlignment(req) => serde_json::to_value(req),
            BackendRequest::GetTopShiftedWords(req) => serde_json::to_value(req),
            BackendRequest::GetContext(req) => serde_json::to_value(req),
        };
        body.with_context(|| format!("Failed to serialize body for {}", self.route()))
    }
}

pub fn generate_embedding(
    state: &AppState,
    catalogs: &Catalogs,
    name: &str,
    description: &str,
) -> Result<GenerateEmbeddingRequest> {
    let plaintext = state
        .selected_plaintexts
        .back()
        .context("No plaintext selected")?;
    let embedding_type = catalogs.embedding.selected();
    let config = catalogs
        .embedding
        .selected_params()
        .with_context(|| format!("Embedding type '{}' is not in the catalog", embedding_type))?
        .clone();

    debug!(pt_id = plaintext.id, embedding_type = %embedding_type, "Built embedding request");
    Ok(GenerateEmbeddingRequest {
        id: plaintext.id,
        name: name.to_string(),
        description: description.to_string(),
        embedding_type: embedding_type.to_string(),
        config,
    })
}

pub fn generate_alignment(
    state: &AppState,
    catalogs: &Catalogs,
    name: &str,
    description: &str,
) -> Result<GenerateAlignmentRequest> {
    let (e1_id, e2_id) = embedding_pair(state)?;
    let alignment_type = catalogs.alignment.selected();
    let mut config = catalogs
        .alignment
        .selected_params()
        .with_context(|| format!("Alignment type '{}' is not in the catalog", alignment_type))?
        .clone();
    config.insert(ALIGNMENT_TYPE_KEY.to_string(), ParamValue::from(alignment_type));

    debug!(e1_id, e2_id, alignment_type = %alignment_type, "Built alignment request");
    Ok(GenerateAlignmentRequest {
        e1_id,
        e2_id,
        name: name.to_string(),
        description: description.to_string(),
        config,
    })
}

/// Embeddings of the plaintext compared in `slot`: the first selected
/// plaintext feeds `ForPt1`, the second `ForPt2`
pub fn embeddings_query(state: &AppState, slot: EmbeddingSlot) -> Result<EmbeddingsQuery> {
    let plaintext = state
        .selected_plaintexts
        .get(slot.plaintext_index())
        .with_context(|| format!("No plaintext selected for {:?}", slot))?;
    Ok(EmbeddingsQuery { pt_id: plaintext.id })
}

pub fn alignment_query(state: &AppState) -> Result<AlignmentQuery> {
    let alignment = state
        .selected_alignments
        .back()
        .context("No alignment selected")?;
    Ok(AlignmentQuery { id: alignment.id })
}

pub fn alignments_query(state: &AppState) -> Result<AlignmentsQuery> {
    let (e1_id, e2_id) = embedding_pair(state)?;
    Ok(AlignmentsQuery { e1_id, e2_id })
}

pub fn top_shifted_words(state: &AppState, num_words: u32) -> Result<TopShiftedWordsQuery> {
    let alignment = state
        .selected_alignments
        .back()
        .context("No alignment selected")?;
    Ok(TopShiftedWordsQuery {
        id: alignment.id,
        num_words,
    })
}

/// `neighbors` falls back to the backend's default when `None`
pub fn context_query(state: &AppState, first: bool, neighbors: Option<u32>) -> Result<ContextQuery> {
    let alignment = state
        .selected_alignments
        .back()
        .context("No alignment selected")?;
    let word = state.selected_word.as_deref().context("No word selected")?;
    Ok(ContextQuery {
        a_id: alignment.id,
        word: word.to_string(),
        first,
        neighbors: neighbors.unwrap_or(DEFAULT_NEIGHBORS),
    })
}

/// Latest embedding of each slot; they must differ
fn embedding_pair(state: &AppState) -> Result<(RecordId, RecordId)> {
    let slot_id = |slot: EmbeddingSlot| {
        state
            .selected_embeddings
            .get(slot)
            .back()
            .map(|embedding| embedding.id)
            .with_context(|| format!("No embedding selected for {:?}", slot))
    };
    let e1_id = slot_id(EmbeddingSlot::ForPt1)?;
    let e2_id = slot_id(EmbeddingSlot::ForPt2)?;
    if e1_id == e2_id {
        bail!("Cannot align embedding {} with itself", e1_id);
    }
    Ok((e1_id, e2_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::variants::*;
    use crate::types::{Alignment, Embedding, Plaintext};

    fn state_with_pair(e1: RecordId, e2: RecordId) -> AppState {
        let mut state = AppState::new();
        state.select_embedding(EmbeddingSlot::ForPt1, Embedding::new(e1, "first", 1));
        state.select_embedding(EmbeddingSlot::ForPt2, Embedding::new(e2, "second", 2));
        state
    }

    #[test]
    fn test_generate_embedding_uses_latest_plaintext() {
        let mut state = AppState::new();
        state.select_plaintext(Plaintext::new(3, "old"));
        state.select_plaintext(Plaintext::new(9, "new"));

        let req = generate_embedding(&state, &Catalogs::default(), "w2v", "test run").unwrap();
        assert_eq!(req.id, 9);
        assert_eq!(req.embedding_type, WORD2VEC);
        assert_eq!(req.config["size"], ParamValue::Int(100));
    }

    #[test]
    fn test_generate_embedding_without_plaintext_fails() {
        let err = generate_embedding(&AppState::new(), &Catalogs::default(), "n", "d").unwrap_err();
        assert!(err.to_string().contains("No plaintext selected"));
    }

    #[test]
    fn test_generate_alignment_carries_type_and_params() {
        let state = state_with_pair(4, 7);
        let mut catalogs = Catalogs::default();
        catalogs.alignment.select(ALIGN_S4);

        let req = generate_alignment(&state, &catalogs, "a", "b").unwrap();
        assert_eq!((req.e1_id, req.e2_id), (4, 7));
        assert_eq!(req.config[ALIGNMENT_TYPE_KEY], ParamValue::Text(ALIGN_S4.to_string()));
        assert_eq!(req.config["iters"], ParamValue::Int(100));
    }

    #[test]
    fn test_generate_alignment_rejects_same_embedding() {
        let state = state_with_pair(5, 5);
        let err = generate_alignment(&state, &Catalogs::default(), "a", "b").unwrap_err();
        assert!(err.to_string().contains("with itself"));
    }

    #[test]
    fn test_generate_alignment_requires_both_slots() {
        let mut state = AppState::new();
        state.select_embedding(EmbeddingSlot::ForPt1, Embedding::new(1, "only", 1));
        let err = alignments_query(&state).unwrap_err();
        assert!(err.to_string().contains("ForPt2"));
    }

    #[test]
    fn test_generate_alignment_dangling_selection_fails() {
        let state = state_with_pair(1, 2);
        let mut catalogs = Catalogs::default();
        catalogs.alignment.select("procrustes");
        assert!(generate_alignment(&state, &catalogs, "a", "b").is_err());
    }

    #[test]
    fn test_embeddings_query_follows_slot_order() {
        let mut state = AppState::new();
        state.select_plaintext(Plaintext::new(4, "left"));
        state.select_plaintext(Plaintext::new(6, "right"));

        assert_eq!(embeddings_query(&state, EmbeddingSlot::ForPt1).unwrap().pt_id, 4);
        assert_eq!(embeddings_query(&state, EmbeddingSlot::ForPt2).unwrap().pt_id, 6);
    }

    #[test]
    fn test_embeddings_query_without_plaintext_fails() {
        let mut state = AppState::new();
        state.select_plaintext(Plaintext::new(4, "only"));

        let err = embeddings_query(&state, EmbeddingSlot::ForPt2).unwrap_err();
        assert!(err.to_string().contains("No plaintext selected for ForPt2"));
        assert!(embeddings_query(&AppState::new(), EmbeddingSlot::ForPt1).is_err());
    }

    #[test]
    fn test_alignment_query_uses_latest_alignment() {
        let mut state = AppState::new();
        state.selected_alignments.push(Alignment::new(3, "old", 1, 2));
        state.selected_alignments.push(Alignment::new(8, "new", 1, 2));

        let req = BackendRequest::GetAlignment(alignment_query(&state).unwrap());
        assert_eq!(req.route(), "/getAlignment");
        assert_eq!(req.body().unwrap(), serde_json::json!({"id": 8}));
    }

    #[test]
    fn test_alignment_query_without_alignment_fails() {
        let err = alignment_query(&AppState::new()).unwrap_err();
        assert!(err.to_string().contains("No alignment selected"));
    }

    #[test]
    fn test_context_query_defaults_neighbors() {
        let mut state = AppState::new();
        state.select_alignment(Alignment::new(12, "al", 1, 2));
        state.selected_word = Some("virus".to_string());

        let query = context_query(&state, true, None).unwrap();
        assert_eq!(query.a_id, 12);
        assert_eq!(query.word, "virus");
        assert_eq!(query.neighbors, DEFAULT_NEIGHBORS);
    }

    #[test]
    fn test_context_query_requires_word() {
        let mut state = AppState::new();
        state.select_alignment(Alignment::new(12, "al", 1, 2));
        assert!(context_query(&state, false, Some(5)).is_err());
    }

    #[test]
    fn test_body_is_untagged() {
        let req = BackendRequest::GetTopShiftedWords(TopShiftedWordsQuery { id: 2, num_words: 20 });
        assert_eq!(req.route(), "/getTopShiftedWords");
        assert_eq!(req.body().unwrap(), serde_json::json!({"id": 2, "num_words": 20}));
    }
}
