//! Application state and the container that owns it
//!
//! [`AppState`] is the plain aggregate of every selection the user has made.
//! [`StateContainer`] owns one `AppState` together with the variant
//! [`Catalogs`], is built once at startup and handed to whoever drives the
//! UI. All writes go through the container so that subscribers receive a
//! [`StateChange`] after each one.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, info, trace};

use crate::catalog::{CatalogKind, Catalogs, ParamValue};
use crate::constants::selection::{MAX_ALIGNMENTS, MAX_EMBEDDINGS_PER_SLOT, MAX_PLAINTEXTS};
use crate::selection::{BoundedPush, SelectionQueue};
use crate::types::{Alignment, Embedding, Plaintext};

/// Comparison target an embedding is selected for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmbeddingSlot {
    #[serde(rename = "forPt1")]
    ForPt1,
    #[serde(rename = "forPt2")]
    ForPt2,
}

impl EmbeddingSlot {
    /// Position of the plaintext this slot compares in `selected_plaintexts`
    pub fn plaintext_index(self) -> usize {
        match self {
            EmbeddingSlot::ForPt1 => 0,
            EmbeddingSlot::ForPt2 => 1,
        }
    }
}

/// Embedding selections, one queue per comparison slot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectedEmbeddings {
    #[serde(rename = "forPt1", default)]
    pub for_pt1: SelectionQueue<Embedding>,
    #[serde(rename = "forPt2", default)]
    pub for_pt2: SelectionQueue<Embedding>,
}

impl SelectedEmbeddings {
    pub fn get(&self, slot: EmbeddingSlot) -> &SelectionQueue<Embedding> {
        match slot {
            EmbeddingSlot::ForPt1 => &self.for_pt1,
            EmbeddingSlot::ForPt2 => &self.for_pt2,
        }
    }

    pub fn get_mut(&mut self, slot: EmbeddingSlot) -> &mut SelectionQueue<Embedding> {
        match slot {
            EmbeddingSlot::ForPt1 => &mut self.for_pt1,
            EmbeddingSlot::ForPt2 => &mut self.for_pt2,
        }
    }
}

/// Everything the user currently has selected
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default)]
    pub selected_plaintexts: SelectionQueue<Plaintext>,
    #[serde(default)]
    pub selected_embeddings: SelectedEmbeddings,
    #[serde(default)]
    pub selected_alignments: SelectionQueue<Alignment>,
    #[serde(default)]
    pub selected_word: Option<String>,
}

impl AppState {
    /// Empty queues, no selected word
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a plaintext, keeping at most the two most recent
    pub fn select_plaintext(&mut self, plaintext: Plaintext) -> BoundedPush<Plaintext> {
        self.selected_plaintexts.bounded_push(plaintext, MAX_PLAINTEXTS)
    }

    /// Select the embedding shown for `slot`, replacing the previous one
    pub fn select_embedding(&mut self, slot: EmbeddingSlot, embedding: Embedding) -> BoundedPush<Embedding> {
        self.selected_embeddings
            .get_mut(slot)
            .bounded_push(embedding, MAX_EMBEDDINGS_PER_SLOT)
    }

    pub fn select_alignment(&mut self, alignment: Alignment) -> BoundedPush<Alignment> {
        self.selected_alignments.bounded_push(alignment, MAX_ALIGNMENTS)
    }
}

/// Notification sent to subscribers after a write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StateChange {
    Plaintexts,
    Embeddings(EmbeddingSlot),
    Alignments,
    SelectedWord(Option<String>),
    VariantSelected { kind: CatalogKind, variant: String },
    ParamChanged { kind: CatalogKind, variant: String, key: String },
    CatalogsReplaced,
}

/// Owned copy of the whole state, for serialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: AppState,
    pub catalogs: Catalogs,
}

/// Single owner of application state and catalogs
#[derive(Debug)]
pub struct StateContainer {
    state: AppState,
    catalogs: Catalogs,
    subscribers: Vec<Sender<StateChange>>,
}

impl Default for StateContainer {
    fn default() -> Self {
        Self::new(Catalogs::default())
    }
}

impl StateContainer {
    pub fn new(catalogs: Catalogs) -> Self {
        info!(
            embedding = %catalogs.embedding.selected(),
            alignment = %catalogs.alignment.selected(),
            classifier = %catalogs.classifier.selected(),
            "State container created"
        );
        Self {
            state: AppState::new(),
            catalogs,
            subscribers: Vec::new(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state.clone(),
            catalogs: self.catalogs.clone(),
        }
    }

    /// Register for change notifications.
    /// Dropping the receiver unsubscribes on the next write.
    pub fn subscribe(&mut self) -> Receiver<StateChange> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        debug!(subscribers = self.subscribers.len(), "Subscriber added");
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn update_plaintexts<R>(&mut self, f: impl FnOnce(&mut SelectionQueue<Plaintext>) -> R) -> R {
        let result = f(&mut self.state.selected_plaintexts);
        self.notify(StateChange::Plaintexts);
        result
    }

    pub fn update_embeddings<R>(
        &mut self,
        slot: EmbeddingSlot,
        f: impl FnOnce(&mut SelectionQueue<Embedding>) -> R,
    ) -> R {
        let result = f(self.state.selected_embeddings.get_mut(slot));
        self.notify(StateChange::Embeddings(slot));
        result
    }

    pub fn update_alignments<R>(&mut self, f: impl FnOnce(&mut SelectionQueue<Alignment>) -> R) -> R {
        let result = f(&mut self.state.selected_alignments);
        self.notify(StateChange::Alignments);
        result
    }

    pub fn set_selected_word(&mut self, word: Option<String>) {
        self.state.selected_word = word.clone();
        self.notify(StateChange::SelectedWord(word));
    }

    /// Clear every selection queue and the selected word
    pub fn reset_selections(&mut self) {
        info!("Resetting all selections");
        self.update_plaintexts(SelectionQueue::clear);
        self.update_embeddings(EmbeddingSlot::ForPt1, SelectionQueue::clear);
        self.update_embeddings(EmbeddingSlot::ForPt2, SelectionQueue::clear);
        self.update_alignments(SelectionQueue::clear);
        self.set_selected_word(None);
    }

    /// Point `kind` at `variant` without checking it exists
    pub fn select_variant(&mut self, kind: CatalogKind, variant: impl Into<String>) {
        let variant = variant.into();
        self.catalogs.get_mut(kind).select(variant.clone());
        self.notify(StateChange::VariantSelected { kind, variant });
    }

    /// Point `kind` at `variant`, failing if the catalog has no such entry
    pub fn select_variant_strict(&mut self, kind: CatalogKind, variant: &str) -> Result<()> {
        self.catalogs.get_mut(kind).select_strict(variant)?;
        self.notify(StateChange::VariantSelected {
            kind,
            variant: variant.to_string(),
        });
        Ok(())
    }

    pub fn set_param(
        &mut self,
        kind: CatalogKind,
        variant: &str,
        key: &str,
        value: ParamValue,
    ) -> Option<ParamValue> {
        let previous = self.catalogs.get_mut(kind).set_param(variant, key, value);
        self.notify(StateChange::ParamChanged {
            kind,
            variant: variant.to_string(),
            key: key.to_string(),
        });
        previous
    }

    pub fn replace_catalogs(&mut self, catalogs: Catalogs) {
        self.catalogs = catalogs;
        self.notify(StateChange::CatalogsReplaced);
    }

    fn notify(&mut self, change: StateChange) {
        trace!(change = ?change, "State changed");
        let before = self.subscribers.len();
        self.subscribers.retain(|tx| tx.send(change.clone()).is_ok());
        let pruned = before - self.subscribers.len();
        if pruned > 0 {
            debug!(pruned, remaining = self.subscribers.len(), "Dropped closed subscribers");
        }
    }
}
