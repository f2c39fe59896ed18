//! Line-oriented wire helpers for the conversational protocol
//!
//! One message unit is one newline-delimited UTF-8 line. A server message
//! ending in `:` is a prompt and the client answers with exactly one line;
//! any other message is informational. A message containing "Goodbye" tells
//! the client the conversation is over.

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

const LINE_ENDINGS: &[char] = &['\n', '\r'];

/// Suffix marking a server message as a prompt requiring one client reply
pub const PROMPT_SUFFIX: char = ':';

/// Whether a server message asks the client for a reply
pub fn is_prompt(message: &str) -> bool {
    message.ends_with(PROMPT_SUFFIX)
}

/// Send one message unit. Messages must be single-line; the newline is the
/// frame delimiter.
pub async fn send_message<W>(writer: &mut W, message: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    debug_assert!(!message.contains('\n'), "message units are single lines");
    writer.write_all(message.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

/// Read one client reply line. `None` means the peer closed the connection.
pub async fn read_reply<R>(reader: &mut R) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    let bytes = reader.read_line(&mut line).await?;
    if bytes == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(LINE_ENDINGS).to_string()))
}
