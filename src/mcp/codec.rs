//! Line codec for the MCP stdio transport.
//!
//! Each message is one JSON-RPC 2.0 object serialized on a single line and
//! terminated by `\n`. A trailing `\r` is tolerated on input.

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Default cap on a single inbound line.
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 4 * 1024 * 1024;

/// Read one non-blank line.
///
/// Returns `None` on clean EOF. Lines longer than `max_message_bytes` are an
/// `InvalidData` error; the stream cannot be resynchronized after that.
pub async fn read_message<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    max_message_bytes: usize,
) -> std::io::Result<Option<String>> {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        // One extra byte distinguishes "exactly at the limit" from "over it".
        let limit = max_message_bytes as u64 + 1;
        let n = (&mut *reader).take(limit).read_until(b'\n', &mut buf).await?;
        if n == 0 {
            return Ok(None);
        }
        if buf.last() != Some(&b'\n') && buf.len() > max_message_bytes {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Message too large: exceeds {} bytes", max_message_bytes),
            ));
        }

        while matches!(buf.last(), Some(b'\n' | b'\r')) {
            buf.pop();
        }
        if buf.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        return String::from_utf8(std::mem::take(&mut buf))
            .map(Some)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e));
    }
}

/// Write one message as a single line and flush.
pub async fn write_message<W, T>(writer: &mut W, message: &T) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize + ?Sized,
{
    let mut line = serde_json::to_vec(message)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::BufReader;

    #[tokio::test]
    async fn test_reads_lines_and_skips_blanks() {
        let input = b"{\"a\":1}\r\n\n   \n{\"b\":2}\n";
        let mut reader = BufReader::new(&input[..]);
        assert_eq!(
            read_message(&mut reader, 1024).await.unwrap().as_deref(),
            Some("{\"a\":1}")
        );
        assert_eq!(
            read_message(&mut reader, 1024).await.unwrap().as_deref(),
            Some("{\"b\":2}")
        );
        assert_eq!(read_message(&mut reader, 1024).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_last_line_without_newline() {
        let mut reader = BufReader::new(&b"{\"a\":1}"[..]);
        assert_eq!(
            read_message(&mut reader, 1024).await.unwrap().as_deref(),
            Some("{\"a\":1}")
        );
    }

    #[tokio::test]
    async fn test_oversized_line_rejected() {
        let input = format!("{}\n", "x".repeat(64));
        let mut reader = BufReader::new(input.as_bytes());
        let err = read_message(&mut reader, 16).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn test_line_at_limit_accepted() {
        let input = format!("{}\n", "x".repeat(16));
        let mut reader = BufReader::new(input.as_bytes());
        assert_eq!(read_message(&mut reader, 16).await.unwrap().unwrap().len(), 16);
    }

    #[tokio::test]
    async fn test_write_message_appends_newline() {
        let mut out = Vec::new();
        write_message(&mut out, &json!({"jsonrpc": "2.0", "id": 1}))
            .await
            .unwrap();
        assert_eq!(out, b"{\"jsonrpc\":\"2.0\",\"id\":1}\n");
    }
}
