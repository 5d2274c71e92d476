// src/exec/stream.rs

//! Incremental decoding of piped child output.
//!
//! Bytes arrive in arbitrary pieces. [`StreamDecoder`] turns them into UTF-8
//! text chunks (holding back an incomplete multi-byte sequence until the next
//! read) and, when asked, into complete lines.

/// Text produced from one read.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Decoded {
    /// Everything decodable so far, in order. Empty if the read ended inside
    /// a multi-byte sequence.
    pub chunk: String,
    /// Lines completed by this read, without their terminators.
    pub lines: Vec<String>,
}

#[derive(Debug, Default)]
pub struct StreamDecoder {
    pending: Vec<u8>,
    partial_line: String,
    split_lines: bool,
}

impl StreamDecoder {
    pub fn new(split_lines: bool) -> Self {
        Self {
            split_lines,
            ..Self::default()
        }
    }

    pub fn push(&mut self, bytes: &[u8]) -> Decoded {
        self.pending.extend_from_slice(bytes);

        let cut = match std::str::from_utf8(&self.pending) {
            Ok(_) => self.pending.len(),
            // Incomplete sequence at the end: keep it for the next read.
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(_) => self.pending.len(),
        };
        let rest = self.pending.split_off(cut);
        let chunk = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending = rest;

        self.decoded(chunk)
    }

    /// Flush everything held back at end of stream.
    ///
    /// Undecodable trailing bytes become replacement characters and an
    /// unterminated last line is reported as a line.
    pub fn finish(&mut self) -> Decoded {
        let chunk = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();

        let mut decoded = self.decoded(chunk);
        if self.split_lines && !self.partial_line.is_empty() {
            decoded.lines.push(std::mem::take(&mut self.partial_line));
        }
        decoded
    }

    fn decoded(&mut self, chunk: String) -> Decoded {
        let mut lines = Vec::new();
        if self.split_lines && !chunk.is_empty() {
            self.partial_line.push_str(&chunk);
            while let Some(pos) = self.partial_line.find('\n') {
                let mut line: String = self.partial_line.drain(..=pos).collect();
                line.pop();
                if line.ends_with('\r') {
                    line.pop();
                }
                lines.push(line);
            }
        }
        Decoded { chunk, lines }
    }
}
