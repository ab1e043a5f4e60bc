use std::collections::HashMap;
use std::io;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response::StatusCode;

pub const HTTP_VERSION: &str = "HTTP/1.1";

/// `"HTTP/1.1 <code> <reason>\r\n"`
pub fn status_line(status: StatusCode) -> String {
    format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        status.as_u16(),
        status.reason_phrase()
    )
}

fn serialize_head(
    status: StatusCode,
    computed: &[(&str, String)],
    custom: &HashMap<String, String>,
) -> Vec<u8> {
    let mut buf = Vec::new();

    buf.extend_from_slice(status_line(status).as_bytes());

    // Computed headers first; a custom header with the same name wins.
    let computed = computed.iter().filter(|(k, _)| !custom.contains_key(*k));
    let custom = custom.iter().map(|(k, v)| (k.as_str(), v));

    for (k, v) in computed.map(|(k, v)| (*k, v)).chain(custom) {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    buf
}

/// Bytes queued for one write to the client.
#[derive(Debug)]
pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
}

impl ResponseWriter {
    /// Starts with the status line and the header block.
    pub fn head(
        status: StatusCode,
        computed: &[(&str, String)],
        custom: &HashMap<String, String>,
    ) -> Self {
        Self {
            buffer: serialize_head(status, computed, custom),
            written: 0,
        }
    }

    /// Raw bytes with no framing.
    pub fn raw(bytes: &[u8]) -> Self {
        Self {
            buffer: bytes.to_vec(),
            written: 0,
        }
    }

    pub fn body(mut self, body: &[u8]) -> Self {
        self.buffer.extend_from_slice(body);
        self
    }

    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> io::Result<()>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        while self.written < self.buffer.len() {
            let n = stream.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "connection closed while writing",
                ));
            }

            self.written += n;
        }

        stream.flush().await
    }
}
