//! Newline record framing over an arbitrary chunked byte stream.

use tracing::warn;

const TERMINATOR: u8 = b'\n';

/// Upper bound on buffered bytes without a terminator.
pub const DEFAULT_MAX_PENDING: usize = 64 * 1024;

/// Reassembles newline-terminated records from raw read chunks.
///
/// Bytes are buffered rather than decoded per chunk so a multi-byte UTF-8
/// sequence split across two reads still decodes correctly. After `push`
/// returns, the buffer never holds a terminator.
#[derive(Debug)]
pub struct RecordFramer {
    pending: Vec<u8>,
    max_pending: usize,
}

impl Default for RecordFramer {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordFramer {
    pub fn new() -> Self {
        Self::with_max_pending(DEFAULT_MAX_PENDING)
    }

    pub fn with_max_pending(max_pending: usize) -> Self {
        Self {
            pending: Vec::new(),
            max_pending,
        }
    }

    /// Append one chunk and return every record it completed, in order.
    ///
    /// Records are decoded lossily, trimmed, and dropped when empty.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut records = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.pending[start..]
            .iter()
            .position(|b| *b == TERMINATOR)
        {
            let end = start + offset;
            let record = String::from_utf8_lossy(&self.pending[start..end]);
            let record = record.trim();
            if !record.is_empty() {
                records.push(record.to_string());
            }
            start = end + 1;
        }
        self.pending.drain(..start);

        if self.pending.len() > self.max_pending {
            warn!(
                discarded = self.pending.len(),
                limit = self.max_pending,
                "Unterminated record exceeded buffer limit, discarding"
            );
            self.pending.clear();
        }

        records
    }

    /// Bytes waiting for a terminator.
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    pub fn reset(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_multiple_records_in_one_chunk() {
        let mut framer = RecordFramer::new();
        assert_eq!(
            framer.push(b"ROBOT,1,1,N\nhello\n"),
            vec!["ROBOT,1,1,N".to_string(), "hello".to_string()]
        );
        assert!(framer.pending().is_empty());
    }

    #[test]
    fn chunking_does_not_change_records() {
        let stream = b"ROBOT,3,4,N\r\n{\"status\":\"done\"}\n\nTARGET,7,B1\nhel";
        let mut whole = RecordFramer::new();
        let expected = whole.push(stream);

        for split in 1..stream.len() {
            let mut framer = RecordFramer::new();
            let mut got = framer.push(&stream[..split]);
            got.extend(framer.push(&stream[split..]));
            assert_eq!(got, expected, "split at {split}");
            assert_eq!(framer.pending(), b"hel");
        }

        let mut bytewise = RecordFramer::new();
        let got: Vec<String> = stream.iter().flat_map(|b| bytewise.push(&[*b])).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn unterminated_record_stays_buffered() {
        let mut framer = RecordFramer::new();
        assert!(framer.push(b"TARGET,7,B1").is_empty());
        assert_eq!(framer.pending(), b"TARGET,7,B1");
        assert_eq!(framer.push(b"\n"), vec!["TARGET,7,B1".to_string()]);
    }

    #[test]
    fn utf8_split_across_chunks_is_reassembled() {
        let bytes = "状态\n".as_bytes();
        let mut framer = RecordFramer::new();
        assert!(framer.push(&bytes[..2]).is_empty());
        assert_eq!(framer.push(&bytes[2..]), vec!["状态".to_string()]);
    }

    #[test]
    fn blank_records_are_skipped() {
        let mut framer = RecordFramer::new();
        assert!(framer.push(b"\n  \r\n").is_empty());
    }

    #[test]
    fn oversized_unterminated_input_is_discarded() {
        let mut framer = RecordFramer::with_max_pending(8);
        assert!(framer.push(b"0123456789").is_empty());
        assert!(framer.pending().is_empty());
        assert_eq!(framer.push(b"ok\n"), vec!["ok".to_string()]);
    }
}
