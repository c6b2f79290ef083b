//! Request loop driving a state container from a session stream

use anyhow::Result;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use tracing::{debug, info, warn};

use super::{read_message, write_message, Incoming, SessionRequest, SessionResponse};
use crate::event_handler::handle_request;
use crate::state::{StateChange, StateContainer};

/// One connected presentation layer
pub struct Session<R, W> {
    reader: R,
    writer: W,
    container: StateContainer,
    changes: Receiver<StateChange>,
    config_path: PathBuf,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(reader: R, writer: W, mut container: StateContainer, config_path: PathBuf) -> Self {
        let changes = container.subscribe();
        Self {
            reader,
            writer,
            container,
            changes,
            config_path,
        }
    }

    /// Serve requests until `Shutdown` or end of input.
    /// Each reply is followed by one `Changed` line per state change it caused.
    pub fn run(&mut self) -> Result<()> {
        info!(config = %self.config_path.display(), "Session started");

        loop {
            let request = match read_message::<SessionRequest, _>(&mut self.reader)? {
                Incoming::Message(request) => request,
                Incoming::Invalid(reason) => {
                    warn!(reason = %reason, "Rejected session line");
                    write_message(&mut self.writer, &SessionResponse::Error(reason))?;
                    continue;
                }
                Incoming::Eof => {
                    info!("Session input closed");
                    break;
                }
            };

            debug!(request = ?request, "Session request");
            let shutdown = matches!(request, SessionRequest::Shutdown);

            let response = handle_request(&mut self.container, request, &self.config_path)
                .unwrap_or_else(|e| {
                    let message = format!("{e:#}");
                    warn!(error = %message, "Request failed");
                    SessionResponse::Error(message)
                });
            write_message(&mut self.writer, &response)?;

            for change in self.changes.try_iter() {
                write_message(&mut self.writer, &SessionResponse::Changed(change))?;
            }

            if shutdown {
                info!("Received shutdown request");
                break;
            }
        }
        Ok(())
    }

    pub fn container(&self) -> &StateContainer {
        &self.container
    }

    /// Hand back the container and output stream
    pub fn into_parts(self) -> (StateContainer, W) {
        (self.container, self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::EmbeddingSlot;
    use std::io::Cursor;

    fn run_lines(input: &str) -> (StateContainer, Vec<SessionResponse>) {
        let mut session = Session::new(
            Cursor::new(input.as_bytes().to_vec()),
            Vec::new(),
            StateContainer::default(),
            PathBuf::from("unused.json"),
        );
        session.run().unwrap();
        let (container, output) = session.into_parts();
        let responses = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        (container, responses)
    }

    #[test]
    fn test_session_replies_then_reports_changes() {
        let input = concat!(
            r#"{"Plaintexts": {"Toggle": {"id": 1, "name": "news"}}}"#, "\n",
            r#"{"SelectWord": "bank"}"#, "\n",
        );
        let (container, responses) = run_lines(input);

        assert_eq!(
            responses,
            vec![
                SessionResponse::Toggled { id: 1, added: true },
                SessionResponse::Changed(StateChange::Plaintexts),
                SessionResponse::Ready,
                SessionResponse::Changed(StateChange::SelectedWord(Some("bank".to_string()))),
            ]
        );
        assert_eq!(container.state().selected_word.as_deref(), Some("bank"));
    }

    #[test]
    fn test_session_stops_at_shutdown() {
        let input = "\"Ping\"\n\"Shutdown\"\n\"Ping\"\n";
        let (_, responses) = run_lines(input);
        assert_eq!(responses, vec![SessionResponse::Pong, SessionResponse::Ready]);
    }

    #[test]
    fn test_session_keeps_container_until_finished() {
        let input = r#"{"Alignments": {"Select": {"id": 5, "name": "al", "e1_id": 1, "e2_id": 2}}}"#;
        let mut session = Session::new(
            Cursor::new(input.as_bytes().to_vec()),
            Vec::new(),
            StateContainer::default(),
            PathBuf::from("unused.json"),
        );
        session.run().unwrap();
        assert_eq!(session.container().state().selected_alignments.map(|a| a.id), vec![5]);
    }

    #[test]
    fn test_session_survives_bad_lines_and_errors() {
        let input = concat!(
            "not json\n",
            r#"{"Build": "GetAlignments"}"#, "\n",
            r#"{"Embeddings": {"slot": "forPt1", "op": "PopFront"}}"#, "\n",
        );
        let (_, responses) = run_lines(input);

        assert!(matches!(responses[0], SessionResponse::Error(_)));
        match &responses[1] {
            SessionResponse::Error(message) => assert!(message.contains("No embedding selected")),
            other => panic!("unexpected response {other:?}"),
        }
        assert_eq!(responses[2], SessionResponse::Removed(None));
        assert_eq!(responses[3], SessionResponse::Changed(StateChange::Embeddings(EmbeddingSlot::ForPt1)));
    }
}
