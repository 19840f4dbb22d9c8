//! Append-only binary buffer allocation.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::schema;

/// Data URI header for embedded buffers.
pub const TEXT_BUFFER_HEADER: &str = "data:application/octet-stream;base64,";

/// Zero padding to the next 4-byte boundary, keyed by `length % 4`.
const PADDINGS: [&[u8]; 4] = [&[], &[0, 0, 0], &[0, 0], &[0]];

/// Where appended bytes landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferSlot {
    /// Buffer index the bytes were written to.
    pub buffer: usize,
    /// Byte offset within that buffer.
    pub offset: usize,
    /// Byte length of the stored block.
    pub length: usize,
}

/// The destination for binary payloads.
///
/// Binary mode appends everything to one shared blob and reports the
/// offset at append time. Text mode wraps every append in a standalone
/// base64 data-URI buffer record. Appended data is never edited, only
/// grown.
#[derive(Debug)]
pub enum BufferSink {
    /// One shared blob (GLB binary chunk).
    Binary { blob: Vec<u8> },
    /// Independent base64-embedded buffer records.
    Embedded { buffers: Vec<schema::Buffer> },
}

impl BufferSink {
    /// Create a sink for the requested output mode.
    pub fn new(binary: bool) -> Self {
        if binary {
            BufferSink::Binary { blob: Vec::new() }
        } else {
            BufferSink::Embedded {
                buffers: Vec::new(),
            }
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, BufferSink::Binary { .. })
    }

    /// Append a naturally aligned numeric block (float32/uint32 streams
    /// need no padding).
    pub fn append(&mut self, bytes: &[u8]) -> BufferSlot {
        match self {
            BufferSink::Binary { blob } => {
                let offset = blob.len();
                blob.extend_from_slice(bytes);
                BufferSlot {
                    buffer: 0,
                    offset,
                    length: bytes.len(),
                }
            }
            BufferSink::Embedded { buffers } => {
                let index = buffers.len();
                buffers.push(schema::Buffer {
                    byte_length: bytes.len(),
                    uri: Some(format!("{}{}", TEXT_BUFFER_HEADER, STANDARD.encode(bytes))),
                });
                BufferSlot {
                    buffer: index,
                    offset: 0,
                    length: bytes.len(),
                }
            }
        }
    }

    /// Append an opaque block (encoded image, compressed stream),
    /// zero-padded to the next 4-byte boundary. The reported length
    /// includes the padding.
    pub fn append_opaque(&mut self, bytes: &[u8]) -> BufferSlot {
        let padding = PADDINGS[bytes.len() % 4];
        if padding.is_empty() {
            return self.append(bytes);
        }
        let mut padded = Vec::with_capacity(bytes.len() + padding.len());
        padded.extend_from_slice(bytes);
        padded.extend_from_slice(padding);
        self.append(&padded)
    }

    /// Total length of the shared blob (0 in text mode).
    pub fn blob_len(&self) -> usize {
        match self {
            BufferSink::Binary { blob } => blob.len(),
            BufferSink::Embedded { .. } => 0,
        }
    }

    /// Consume the sink: the buffer records accumulated in text mode and
    /// the shared blob from binary mode.
    pub fn into_parts(self) -> (Vec<schema::Buffer>, Vec<u8>) {
        match self {
            BufferSink::Binary { blob } => (Vec::new(), blob),
            BufferSink::Embedded { buffers } => (buffers, Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_appends_report_running_offset() {
        let mut sink = BufferSink::new(true);
        let a = sink.append(&[1, 2, 3, 4]);
        let b = sink.append(&[5, 6, 7, 8]);

        assert_eq!(a.buffer, 0);
        assert_eq!(a.offset, 0);
        assert_eq!(b.offset, 4);
        assert_eq!(sink.blob_len(), 8);
    }

    #[test]
    fn test_opaque_append_pads_to_four_bytes() {
        for extra in 0..4usize {
            let mut sink = BufferSink::new(true);
            sink.append_opaque(&vec![0xAB; 4 + extra]);
            assert_eq!(sink.blob_len() % 4, 0, "length {} not padded", 4 + extra);
        }
    }

    #[test]
    fn test_padding_is_zero_bytes() {
        let mut sink = BufferSink::new(true);
        sink.append_opaque(&[0xFF; 5]);
        let (_, blob) = sink.into_parts();
        assert_eq!(blob.len(), 8);
        assert_eq!(&blob[5..], &[0, 0, 0]);
    }

    #[test]
    fn test_embedded_append_creates_standalone_buffers() {
        let mut sink = BufferSink::new(false);
        let a = sink.append(b"Hello");
        let b = sink.append(b"World");

        assert_eq!(a.buffer, 0);
        assert_eq!(b.buffer, 1);
        assert_eq!(a.offset, 0);
        assert_eq!(b.offset, 0);

        let (buffers, blob) = sink.into_parts();
        assert!(blob.is_empty());
        assert_eq!(buffers.len(), 2);
        assert_eq!(
            buffers[0].uri.as_deref(),
            Some("data:application/octet-stream;base64,SGVsbG8=")
        );
        assert_eq!(buffers[0].byte_length, 5);
    }
}
