//! Fixed16 response framing.
//!
//! # Responsibilities
//! - Read exactly 16 header bytes and parse status and body length
//! - Read exactly `length` body bytes, however the stream fragments them
//!
//! # Header layout
//! ```text
//! 0      3                      15 16
//! ┌──────┬───────────────────────┬──┐
//! │ 200  │ ␠␠␠␠␠␠␠␠␠123          │\n│
//! └──────┴───────────────────────┴──┘
//!  status  length (space padded)  terminator
//! ```

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::livestatus::types::{GatewayError, LivestatusResponse};

/// Size of the fixed16 header.
pub const HEADER_LEN: usize = 16;

/// Upper bound on a single body read.
const READ_CHUNK: usize = 64 * 1024;

/// Parsed fixed16 header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    pub status: u16,
    pub length: usize,
}

impl ResponseHeader {
    /// Parse the 16 header bytes.
    pub fn parse(bytes: &[u8; HEADER_LEN]) -> Result<Self, GatewayError> {
        let status_field = &bytes[0..3];
        if !status_field.iter().all(u8::is_ascii_digit) {
            return Err(GatewayError::Protocol(format!(
                "malformed status in header {:?}",
                String::from_utf8_lossy(bytes)
            )));
        }
        let status = status_field
            .iter()
            .fold(0u16, |acc, d| acc * 10 + u16::from(d - b'0'));

        let length_field = bytes[3..15].trim_ascii();
        if length_field.is_empty() || !length_field.iter().all(u8::is_ascii_digit) {
            return Err(GatewayError::Protocol(format!(
                "malformed length in header {:?}",
                String::from_utf8_lossy(bytes)
            )));
        }
        let length = std::str::from_utf8(length_field)
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .ok_or_else(|| GatewayError::Protocol("body length out of range".to_string()))?;

        Ok(Self { status, length })
    }
}

/// Read one complete response: header, then exactly the declared body.
pub async fn read_response<R>(reader: &mut R) -> Result<LivestatusResponse, GatewayError>
where
    R: AsyncRead + Unpin,
{
    let mut raw = [0u8; HEADER_LEN];
    reader.read_exact(&mut raw).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            GatewayError::Protocol("connection closed before full response header".to_string())
        } else {
            GatewayError::Transport(e)
        }
    })?;

    let header = ResponseHeader::parse(&raw)?;
    tracing::debug!(status = header.status, length = header.length, "Response header read");

    let body = read_body(reader, header.length).await?;
    Ok(LivestatusResponse {
        status: header.status,
        body,
    })
}

async fn read_body<R>(reader: &mut R, length: usize) -> Result<Vec<u8>, GatewayError>
where
    R: AsyncRead + Unpin,
{
    if length == 0 {
        return Ok(Vec::new());
    }

    let mut body = Vec::with_capacity(length.min(READ_CHUNK));
    let mut chunk = vec![0u8; length.min(READ_CHUNK)];

    while body.len() < length {
        let want = (length - body.len()).min(chunk.len());
        let n = reader.read(&mut chunk[..want]).await?;
        if n == 0 {
            return Err(GatewayError::Protocol(format!(
                "connection closed after {} of {} body bytes",
                body.len(),
                length
            )));
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    fn frame(status: u16, body: &str) -> Vec<u8> {
        let mut out = format!("{:03} {:>11}\n", status, body.len()).into_bytes();
        out.extend_from_slice(body.as_bytes());
        out
    }

    /// Feed `data` through a duplex pipe whose buffer holds only `chunk` bytes.
    async fn read_fragmented(data: Vec<u8>, chunk: usize) -> Result<LivestatusResponse, GatewayError> {
        let (mut writer, mut reader) = tokio::io::duplex(chunk);
        tokio::spawn(async move {
            let _ = writer.write_all(&data).await;
        });
        read_response(&mut reader).await
    }

    #[test]
    fn test_parse_header() {
        let header = ResponseHeader::parse(b"200         123\n").unwrap();
        assert_eq!(header, ResponseHeader { status: 200, length: 123 });
    }

    #[test]
    fn test_parse_header_zero_padded_length() {
        let header = ResponseHeader::parse(b"404000000000019\n").unwrap();
        assert_eq!(header, ResponseHeader { status: 404, length: 19 });
    }

    #[test]
    fn test_parse_header_rejects_garbage() {
        assert!(matches!(
            ResponseHeader::parse(b"HTTP/1.1 200 OK\n"),
            Err(GatewayError::Protocol(_))
        ));
        assert!(matches!(
            ResponseHeader::parse(b"200            \n"),
            Err(GatewayError::Protocol(_))
        ));
        assert!(matches!(
            ResponseHeader::parse(b"200      12x45\n\n"),
            Err(GatewayError::Protocol(_))
        ));
    }

    #[tokio::test]
    async fn test_read_single_chunk() {
        let body = r#"[["name"],["srv1"]]"#;
        let mut data: &[u8] = &frame(200, body);
        let response = read_response(&mut data).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, body.as_bytes());
    }

    #[tokio::test]
    async fn test_fragmentation_is_transparent() {
        let body = r#"[["host_name","state"],["web-01",0],["db-01",2]]"#;
        let whole = read_fragmented(frame(200, body), 4096).await.unwrap();

        for chunk in [1, 2, 3, 7, 15, 16, 17] {
            let fragmented = read_fragmented(frame(200, body), chunk).await.unwrap();
            assert_eq!(fragmented, whole, "chunk size {}", chunk);
        }
    }

    #[tokio::test]
    async fn test_non_200_body_read_in_full() {
        let body = "Invalid table name\n";
        let response = read_fragmented(frame(404, body), 3).await.unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(response.body, body.as_bytes());
    }

    #[tokio::test]
    async fn test_zero_length_body_does_not_block() {
        // The writer half stays open, so any body read would hang.
        let (mut writer, mut reader) = tokio::io::duplex(64);
        writer.write_all(b"200           0\n").await.unwrap();

        let response = tokio::time::timeout(
            std::time::Duration::from_secs(1),
            read_response(&mut reader),
        )
        .await
        .expect("reader blocked on empty body")
        .unwrap();

        assert_eq!(response.status, 200);
        assert!(response.body.is_empty());
        drop(writer);
    }

    #[tokio::test]
    async fn test_short_body_is_protocol_error() {
        let mut data: &[u8] = b"200          50\n[[\"a\"]]";
        assert!(matches!(
            read_response(&mut data).await,
            Err(GatewayError::Protocol(_))
        ));
    }

    #[tokio::test]
    async fn test_short_header_is_protocol_error() {
        let mut data: &[u8] = b"200   ";
        assert!(matches!(
            read_response(&mut data).await,
            Err(GatewayError::Protocol(_))
        ));
    }

    #[tokio::test]
    async fn test_body_larger_than_chunk() {
        let body = format!("[{}]", vec!["[1]"; 40_000].join(","));
        let response = read_fragmented(frame(200, &body), 8192).await.unwrap();
        assert_eq!(response.body.len(), body.len());
    }
}
