//! RTT log streaming
//!
//! Copies the RTT byte stream to an output as text. Bytes that are not valid
//! UTF-8 are written as `\xNN` escapes so a noisy target never stops the
//! log. The loop only ends when the shutdown future resolves (Ctrl-C) or
//! the source fails.

use std::fmt::Write as _;
use std::future::Future;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::RttError;
use crate::infra::rtt::RttSource;

/// Incremental UTF-8 decoder with backslash escaping
///
/// An incomplete multi-byte sequence at the end of a chunk is held back
/// until the next chunk completes it.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    /// Decode the next chunk
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut data = std::mem::take(&mut self.pending);
        data.extend_from_slice(chunk);

        let mut text = String::with_capacity(data.len());
        let mut rest = data.as_slice();

        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    text.push_str(valid);
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    text.push_str(std::str::from_utf8(valid).unwrap_or_default());

                    match e.error_len() {
                        Some(len) => {
                            escape_into(&mut text, &after[..len]);
                            rest = &after[len..];
                        }
                        None => {
                            self.pending = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }

        text
    }

    /// Flush any held-back bytes as escapes
    pub fn finish(&mut self) -> String {
        let mut text = String::new();
        escape_into(&mut text, &std::mem::take(&mut self.pending));
        text
    }
}

fn escape_into(text: &mut String, bytes: &[u8]) {
    for byte in bytes {
        let _ = write!(text, "\\x{byte:02x}");
    }
}

/// Stream `source` to `out` until `shutdown` resolves or the source fails
pub async fn stream_log<S, W, F>(source: &mut S, out: &mut W, shutdown: F) -> Result<(), RttError>
where
    S: RttSource,
    W: AsyncWrite + Unpin,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut decoder = Utf8Decoder::default();

    loop {
        tokio::select! {
            // shutdown wins over a chunk that is ready at the same time
            biased;
            () = &mut shutdown => {
                let tail = decoder.finish();
                if !tail.is_empty() {
                    out.write_all(tail.as_bytes()).await?;
                    out.flush().await?;
                }
                tracing::debug!("Log stream interrupted");
                return Ok(());
            }
            chunk = source.read() => {
                let chunk = chunk?;
                if chunk.is_empty() {
                    continue;
                }
                let text = decoder.decode(&chunk);
                if text.is_empty() {
                    continue;
                }
                out.write_all(text.as_bytes()).await?;
                out.flush().await?;
            }
        }
    }
}
