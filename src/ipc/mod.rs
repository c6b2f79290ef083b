//! Line-delimited JSON session protocol
//!
//! The presentation layer talks to the state container over a pair of byte
//! streams (stdin/stdout for the CLI). Each message is one JSON document on a
//! single line.

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::io::{BufRead, Read, Write};

mod messages;
mod session;

pub use messages::{BuildRequest, QueueOp, SessionRequest, SessionResponse};
pub use session::Session;

use crate::constants::session::MAX_LINE_SIZE;

/// Outcome of reading one line
#[derive(Debug)]
pub enum Incoming<T> {
    Message(T),
    /// The line was unusable; the stream is still positioned at the next line
    Invalid(String),
    Eof,
}

/// Write one message followed by a newline
pub fn write_message<T: Serialize, W: Write>(writer: &mut W, msg: &T) -> Result<()> {
    let json = serde_json::to_vec(msg).context("Failed to serialize message to JSON")?;
    writer.write_all(&json).context("Failed to write message")?;
    writer.write_all(b"\n").context("Failed to write message terminator")?;
    writer.flush().context("Failed to flush stream")?;
    Ok(())
}

/// Read the next non-blank line and decode it.
/// I/O failures are errors; oversized or malformed lines are [`Incoming::Invalid`].
pub fn read_message<T: DeserializeOwned, R: BufRead>(reader: &mut R) -> Result<Incoming<T>> {
    loop {
        let mut line = Vec::new();
        let read = reader
            .by_ref()
            .take(MAX_LINE_SIZE as u64 + 1)
            .read_until(b'\n', &mut line)
            .context("Failed to read message line")?;
        if read == 0 {
            return Ok(Incoming::Eof);
        }

        if line.len() > MAX_LINE_SIZE && line.last() != Some(&b'\n') {
            reader
                .skip_until(b'\n')
                .context("Failed to skip oversized message")?;
            return Ok(Incoming::Invalid(format!(
                "Message too large (max: {} bytes)",
                MAX_LINE_SIZE
            )));
        }

        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        return Ok(match serde_json::from_slice(&line) {
            Ok(msg) => Incoming::Message(msg),
            Err(e) => Incoming::Invalid(format!("Failed to deserialize message: {e}")),
        });
    }
}
