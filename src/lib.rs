//! Client-side state for exploring word embeddings and their alignments
//!
//! The crate tracks what the user has selected (plaintexts, embeddings for
//! each comparison slot, alignments, a word) and which algorithm variants
//! and parameters will be used for the next backend request.

#![forbid(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod constants;
pub mod event_handler;
pub mod ipc;
pub mod requests;
pub mod selection;
pub mod state;
pub mod types;

pub use catalog::{Catalog, CatalogKind, Catalogs, ParamValue, Params};
pub use selection::{BoundedPush, Identifiable, SelectionQueue, Toggle};
pub use state::{AppState, EmbeddingSlot, StateChange, StateContainer};
