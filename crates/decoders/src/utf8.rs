/// Incremental UTF-8 decoder for the inbound byte stream.
///
/// Chunks arriving from a serial device split multi-byte sequences at
/// arbitrary points. This decoder emits only whole characters: an
/// incomplete trailing sequence is carried over and prepended to the next
/// chunk, invalid bytes decode to U+FFFD without desyncing the stream.
/// ANSI escape bytes pass through untouched.
#[derive(Debug, Default)]
pub struct Utf8Stream {
    // Incomplete trailing sequence from the previous chunk (at most 3 bytes).
    pending: Vec<u8>,
}

impl Utf8Stream {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Decode a chunk, buffering any incomplete trailing sequence.
    pub fn decode(&mut self, input: &[u8]) -> String {
        if input.is_empty() && self.pending.is_empty() {
            return String::new();
        }

        let mut buf = std::mem::take(&mut self.pending);
        buf.extend_from_slice(input);

        let mut out = String::with_capacity(buf.len());
        let mut pos = 0;
        while pos < buf.len() {
            match std::str::from_utf8(&buf[pos..]) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(err) => {
                    let valid_up_to = err.valid_up_to();
                    if let Ok(valid) = std::str::from_utf8(&buf[pos..pos + valid_up_to]) {
                        out.push_str(valid);
                    }
                    pos += valid_up_to;

                    match err.error_len() {
                        Some(invalid) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            pos += invalid;
                        }
                        None => {
                            // Incomplete sequence at the end of the chunk:
                            // hold it back for the next call.
                            self.pending.extend_from_slice(&buf[pos..]);
                            break;
                        }
                    }
                }
            }
        }

        out
    }

    /// Drain the carried-over partial sequence at end of stream.
    ///
    /// A sequence that never completed renders as replacement characters.
    pub fn flush(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        let tail = std::mem::take(&mut self.pending);
        String::from_utf8_lossy(&tail).into_owned()
    }

    /// Whether a partial sequence is currently buffered.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}
