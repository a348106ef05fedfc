//! Incremental server-sent-events framing.
//!
//! Bytes arrive in arbitrary chunks; a frame is complete once a blank line
//! follows it. Only the `event:` and `data:` fields are kept.

/// One complete SSE frame.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SseFrame {
    /// Value of the `event:` field, `"message"` when absent.
    pub event: String,
    /// All `data:` lines joined with `\n`.
    pub data: String,
}

#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a network chunk. Carriage returns are dropped so `\r\n`
    /// framing is handled like `\n`.
    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend(chunk.iter().copied().filter(|b| *b != b'\r'));
    }

    /// Pop the next complete frame, skipping frames without data.
    pub fn next_frame(&mut self) -> Result<Option<SseFrame>, std::str::Utf8Error> {
        while let Some(pos) = self.buf.windows(2).position(|w| w == b"\n\n") {
            let raw: Vec<u8> = self.buf.drain(..pos + 2).collect();
            if let Some(frame) = parse_frame(std::str::from_utf8(&raw)?) {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }

    /// Flush a trailing frame the server did not terminate with a blank line.
    pub fn finish(&mut self) -> Result<Option<SseFrame>, std::str::Utf8Error> {
        if let Some(frame) = self.next_frame()? {
            return Ok(Some(frame));
        }
        let raw = std::mem::take(&mut self.buf);
        Ok(parse_frame(std::str::from_utf8(&raw)?))
    }
}

fn parse_frame(raw: &str) -> Option<SseFrame> {
    let mut event = None;
    let mut data: Option<String> = None;

    for line in raw.lines() {
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => event = Some(value.to_owned()),
            "data" => match data.as_mut() {
                Some(existing) => {
                    existing.push('\n');
                    existing.push_str(value);
                }
                None => data = Some(value.to_owned()),
            },
            _ => {}
        }
    }

    data.map(|data| SseFrame {
        event: event.unwrap_or_else(|| "message".to_owned()),
        data,
    })
}
