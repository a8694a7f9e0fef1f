use serde::Deserialize;

/// Incremental UTF-8 decoder. Network reads can split an encoded character;
/// the partial tail is carried until the rest of it arrives.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode everything decodable so far. Bytes that are invalid (rather
    /// than merely incomplete) come out as U+FFFD.
    pub fn push(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::new();

        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(valid) => {
                    out.push_str(valid);
                    self.pending.clear();
                    return out;
                }
                Err(err) => {
                    let valid_up_to = err.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid_up_to]));

                    match err.error_len() {
                        // Incomplete trailing sequence: keep it for the
                        // next read.
                        None => {
                            self.pending.drain(..valid_up_to);
                            return out;
                        }
                        Some(invalid_len) => {
                            out.push('\u{FFFD}');
                            self.pending.drain(..valid_up_to + invalid_len);
                        }
                    }
                }
            }
        }
    }
}

/// One semantic event from the completion stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    /// A fragment of assistant text.
    Delta(String),
    /// The `[DONE]` terminator.
    Done,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkPayload {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Line parser for the `data:`-framed completion stream. Feed it raw bytes
/// as they arrive and collect the events each feed completes; byte
/// boundaries never change the result.
#[derive(Debug, Default)]
pub struct SseParser {
    decoder: Utf8Decoder,
    buf: String,
    done: bool,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the `[DONE]` terminator has been seen. Everything after it is
    /// ignored.
    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn push(&mut self, bytes: &[u8]) -> Vec<SseEvent> {
        let mut events = Vec::new();

        if self.done {
            return events;
        }

        let decoded = self.decoder.push(bytes);
        self.buf.push_str(&decoded);

        while let Some(newline) = self.buf.find('\n') {
            let mut line: String = self.buf[..newline].to_string();
            self.buf.drain(..=newline);

            if line.ends_with('\r') {
                line.pop();
            }
            if line.starts_with(':') || line.trim().is_empty() {
                continue;
            }

            let payload = match line.strip_prefix("data: ") {
                Some(payload) => payload.trim(),
                None => continue,
            };

            if payload == "[DONE]" {
                self.done = true;
                events.push(SseEvent::Done);
                break;
            }

            match serde_json::from_str::<ChunkPayload>(payload) {
                Ok(parsed) => {
                    let content = parsed
                        .choices
                        .into_iter()
                        .next()
                        .and_then(|choice| choice.delta.content);

                    if let Some(content) = content {
                        if !content.is_empty() {
                            events.push(SseEvent::Delta(content));
                        }
                    }
                }
                Err(_) => {
                    // Not a complete payload yet; put the line back and wait
                    // for more bytes.
                    self.buf.insert_str(0, &format!("{}\n", line));
                    break;
                }
            }
        }

        events
    }
}
