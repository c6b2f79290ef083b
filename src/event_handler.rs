use anyhow::Result;
use std::path::Path;
use tracing::{debug, info};

use crate::config::Config;
use crate::constants::selection::{MAX_ALIGNMENTS, MAX_EMBEDDINGS_PER_SLOT, MAX_PLAINTEXTS};
use crate::ipc::{BuildRequest, QueueOp, SessionRequest, SessionResponse};
use crate::requests::{self, BackendRequest};
use crate::selection::{BoundedPush, Identifiable, SelectionQueue, Toggle};
use crate::state::StateContainer;
use crate::types::RecordId;

/// Apply one session request to the container.
///
/// Errors are for the caller to report back; the container is left as it
/// was before the failing step.
pub fn handle_request(
    container: &mut StateContainer,
    request: SessionRequest,
    config_path: &Path,
) -> Result<SessionResponse> {
    let response = match request {
        SessionRequest::Plaintexts(op) => {
            container.update_plaintexts(|queue| apply_queue_op(queue, op, MAX_PLAINTEXTS))
        }
        SessionRequest::Embeddings { slot, op } => container.update_embeddings(slot, |queue| {
            apply_queue_op(queue, op, MAX_EMBEDDINGS_PER_SLOT)
        }),
        SessionRequest::Alignments(op) => {
            container.update_alignments(|queue| apply_queue_op(queue, op, MAX_ALIGNMENTS))
        }

        SessionRequest::SelectWord(word) => {
            container.set_selected_word(word);
            SessionResponse::Ready
        }

        SessionRequest::SelectVariant { kind, variant, strict } => {
            if strict {
                container.select_variant_strict(kind, &variant)?;
            } else {
                container.select_variant(kind, variant);
            }
            SessionResponse::Ready
        }

        SessionRequest::SetParam { kind, variant, key, value } => {
            SessionResponse::Previous(container.set_param(kind, &variant, &key, value))
        }

        SessionRequest::Build(build) => {
            let request = build_backend_request(container, build)?;
            info!(route = request.route(), "Built backend payload");
            SessionResponse::Payload {
                route: request.route().to_string(),
                body: request.body()?,
            }
        }

        SessionRequest::GetState => SessionResponse::State(container.state().clone()),
        SessionRequest::GetCatalogs => SessionResponse::Catalogs(container.catalogs().clone()),

        SessionRequest::Reset => {
            container.reset_selections();
            SessionResponse::Ready
        }

        SessionRequest::SaveConfig => {
            Config::from_catalogs(container.catalogs()).save_to(config_path)?;
            SessionResponse::Ready
        }

        SessionRequest::Ping => SessionResponse::Pong,

        // The session loop stops after acknowledging
        SessionRequest::Shutdown => SessionResponse::Ready,
    };
    Ok(response)
}

fn build_backend_request(container: &StateContainer, build: BuildRequest) -> Result<BackendRequest> {
    let state = container.state();
    let catalogs = container.catalogs();
    let request = match build {
        BuildRequest::GenerateEmbedding { name, description } => BackendRequest::GenerateEmbedding(
            requests::generate_embedding(state, catalogs, &name, &description)?,
        ),
        BuildRequest::GenerateAlignment { name, description } => BackendRequest::GenerateAlignment(
            requests::generate_alignment(state, catalogs, &name, &description)?,
        ),
        BuildRequest::GetEmbeddings { slot } => {
            BackendRequest::GetEmbeddings(requests::embeddings_query(state, slot)?)
        }
        BuildRequest::GetAlignments => BackendRequest::GetAlignments(requests::alignments_query(state)?),
        BuildRequest::GetAlignment => BackendRequest::GetAlignment(requests::alignment_query(state)?),
        BuildRequest::GetTopShiftedWords { num_words } => {
            BackendRequest::GetTopShiftedWords(requests::top_shifted_words(state, num_words)?)
        }
        BuildRequest::GetContext { first, neighbors } => {
            BackendRequest::GetContext(requests::context_query(state, first, neighbors)?)
        }
    };
    Ok(request)
}

fn apply_queue_op<T>(queue: &mut SelectionQueue<T>, op: QueueOp<T>, limit: usize) -> SessionResponse
where
    T: Identifiable<Id = RecordId>,
{
    match op {
        QueueOp::Push(item) => SessionResponse::Length(queue.push(item)),
        QueueOp::PopFront => SessionResponse::Removed(queue.pop_front().map(|item| *item.id())),
        QueueOp::Toggle(item) => {
            let id = *item.id();
            let added = matches!(queue.toggle(item), Toggle::Added);
            debug!(id, added, "Toggled selection");
            SessionResponse::Toggled { id, added }
        }
        QueueOp::BoundedPush { item, threshold } => pushed(queue.bounded_push(item, threshold)),
        QueueOp::Select(item) => pushed(queue.bounded_push(item, limit)),
        QueueOp::Truncate(len) => {
            queue.truncate(len);
            SessionResponse::Length(queue.len())
        }
        QueueOp::Clear => {
            queue.clear();
            SessionResponse::Length(0)
        }
    }
}

fn pushed<T: Identifiable<Id = RecordId>>(outcome: BoundedPush<T>) -> SessionResponse {
    match outcome {
        BoundedPush::Inserted => SessionResponse::Pushed {
            inserted: true,
            evicted: None,
        },
        BoundedPush::Evicted(oldest) => SessionResponse::Pushed {
            inserted: true,
            evicted: Some(*oldest.id()),
        },
        BoundedPush::AlreadyPresent => SessionResponse::Pushed {
            inserted: false,
            evicted: None,
        },
    }
}
