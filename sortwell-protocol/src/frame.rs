//! Companion link framing
//!
//! ```text
//! ┌──────┬─────┬─────┬──────┬─────────────────┬─────┐
//! │ 0xA5 │ SEQ │ LEN │ KIND │ payload (LEN B) │ XOR │
//! └──────┴─────┴─────┴──────┴─────────────────┴─────┘
//! ```
//!
//! `SEQ` is chosen by the station and echoed in the reply. `XOR` covers
//! every byte after the start marker. Bytes outside a frame are ignored,
//! so the receiver resynchronizes on the next `0xA5`.

use heapless::Vec;

/// Start-of-frame marker
pub const FRAME_START: u8 = 0xA5;

/// Largest payload a frame can carry
pub const MAX_PAYLOAD_SIZE: usize = 250;

/// Start, sequence, length, kind and checksum bytes
pub const FRAME_OVERHEAD: usize = 5;

/// Largest encoded frame
pub const MAX_FRAME_SIZE: usize = FRAME_OVERHEAD + MAX_PAYLOAD_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    PayloadTooLarge,
    /// Received checksum differs from the computed one
    InvalidChecksum,
    /// Length byte out of range, or the payload does not decode
    InvalidFrame,
    /// Frame kind differs from the one expected
    UnexpectedType(u8),
    /// Output buffer cannot hold the encoded frame
    BufferTooSmall,
}

/// One frame, without the start marker and checksum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub seq: u8,
    pub msg_type: u8,
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

/// XOR over the header and payload bytes
fn checksum(header: [u8; 3], payload: &[u8]) -> u8 {
    header.iter().chain(payload).fold(0, |acc, b| acc ^ b)
}

impl Frame {
    pub fn new(seq: u8, msg_type: u8, payload: &[u8]) -> Result<Self, FrameError> {
        let payload = Vec::from_slice(payload).map_err(|_| FrameError::PayloadTooLarge)?;
        Ok(Self {
            seq,
            msg_type,
            payload,
        })
    }

    /// Frame with no payload
    pub fn empty(seq: u8, msg_type: u8) -> Self {
        Self {
            seq,
            msg_type,
            payload: Vec::new(),
        }
    }

    fn header(&self) -> [u8; 3] {
        // Payload capacity keeps the length within a byte
        [self.seq, self.payload.len() as u8, self.msg_type]
    }

    /// Write the wire form into `out`, returning the bytes used
    pub fn encode(&self, out: &mut [u8]) -> Result<usize, FrameError> {
        let size = FRAME_OVERHEAD + self.payload.len();
        let out = out.get_mut(..size).ok_or(FrameError::BufferTooSmall)?;

        let header = self.header();
        let (marker, rest) = out.split_at_mut(1);
        let (head, rest) = rest.split_at_mut(3);
        let (body, tail) = rest.split_at_mut(self.payload.len());

        marker[0] = FRAME_START;
        head.copy_from_slice(&header);
        body.copy_from_slice(&self.payload);
        tail[0] = checksum(header, &self.payload);

        Ok(size)
    }

    /// Wire form as an owned buffer
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut out = Vec::new();
        out.resize_default(FRAME_OVERHEAD + self.payload.len())
            .map_err(|_| FrameError::BufferTooSmall)?;
        self.encode(&mut out)?;
        Ok(out)
    }
}

/// Where the parser is within a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Hunting,
    Seq,
    Length { seq: u8 },
    Kind { seq: u8, len: u8 },
    Payload { seq: u8, len: u8, kind: u8 },
    Checksum { seq: u8, len: u8, kind: u8 },
}

/// Byte-at-a-time frame receiver
#[derive(Debug, Clone)]
pub struct FrameParser {
    stage: Stage,
    payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    pub fn new() -> Self {
        Self {
            stage: Stage::Hunting,
            payload: Vec::new(),
        }
    }

    /// Discard any partial frame
    pub fn reset(&mut self) {
        self.stage = Stage::Hunting;
        self.payload.clear();
    }

    /// Consume one byte
    ///
    /// Yields a frame on its checksum byte. Any error also resets the
    /// parser, so the caller can keep feeding.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Frame>, FrameError> {
        self.stage = match self.stage {
            Stage::Hunting if byte == FRAME_START => Stage::Seq,
            Stage::Hunting => Stage::Hunting,
            Stage::Seq => Stage::Length { seq: byte },
            Stage::Length { .. } if byte as usize > MAX_PAYLOAD_SIZE => {
                self.reset();
                return Err(FrameError::InvalidFrame);
            }
            Stage::Length { seq } => Stage::Kind { seq, len: byte },
            Stage::Kind { seq, len } => {
                self.payload.clear();
                if len == 0 {
                    Stage::Checksum { seq, len, kind: byte }
                } else {
                    Stage::Payload { seq, len, kind: byte }
                }
            }
            Stage::Payload { seq, len, kind } => {
                // Bounded by the length check
                let _ = self.payload.push(byte);
                if self.payload.len() < len as usize {
                    Stage::Payload { seq, len, kind }
                } else {
                    Stage::Checksum { seq, len, kind }
                }
            }
            Stage::Checksum { seq, len, kind } => {
                let valid = checksum([seq, len, kind], &self.payload) == byte;
                let payload = core::mem::take(&mut self.payload);
                self.reset();
                if !valid {
                    return Err(FrameError::InvalidChecksum);
                }
                return Ok(Some(Frame {
                    seq,
                    msg_type: kind,
                    payload,
                }));
            }
        };
        Ok(None)
    }

    /// Consume bytes up to and including the first complete frame
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<Frame>, FrameError> {
        for &byte in bytes {
            if let Some(frame) = self.feed(byte)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_frame_layout() {
        let mut out = [0u8; 8];
        let used = Frame::empty(7, 0x10).encode(&mut out).unwrap();

        assert_eq!(used, FRAME_OVERHEAD);
        assert_eq!(&out[..used], &[FRAME_START, 7, 0, 0x10, 7 ^ 0x10]);
    }

    #[test]
    fn test_payload_frame_layout() {
        let encoded = Frame::new(1, 0x90, &[0x02, 0x05])
            .unwrap()
            .encode_to_vec()
            .unwrap();

        assert_eq!(
            encoded.as_slice(),
            &[FRAME_START, 1, 2, 0x90, 0x02, 0x05, 1 ^ 2 ^ 0x90 ^ 0x02 ^ 0x05]
        );
    }

    #[test]
    fn test_short_output_buffer() {
        let frame = Frame::new(0, 0x10, &[1, 2, 3]).unwrap();
        let mut out = [0u8; 7];
        assert_eq!(frame.encode(&mut out), Err(FrameError::BufferTooSmall));
    }

    #[test]
    fn test_oversized_payload() {
        assert_eq!(
            Frame::new(0, 0x10, &[0u8; MAX_PAYLOAD_SIZE + 1]),
            Err(FrameError::PayloadTooLarge)
        );
    }

    #[test]
    fn test_bad_checksum_then_recovery() {
        let good = Frame::new(3, 0x90, &[4, 5]).unwrap().encode_to_vec().unwrap();
        let mut bad = good.clone();
        let last = bad.len() - 1;
        bad[last] ^= 0xFF;

        let mut parser = FrameParser::new();
        assert_eq!(parser.feed_bytes(&bad), Err(FrameError::InvalidChecksum));
        assert_eq!(parser.feed_bytes(&good).unwrap().map(|f| f.seq), Some(3));
    }

    #[test]
    fn test_length_byte_out_of_range() {
        let mut parser = FrameParser::new();
        assert_eq!(parser.feed_bytes(&[FRAME_START, 0]), Ok(None));
        assert_eq!(parser.feed(251), Err(FrameError::InvalidFrame));
    }

    #[test]
    fn test_boot_noise_before_reply() {
        let frame = Frame::new(42, 0x90, &[9]).unwrap();
        let mut stream = Vec::<u8, 20>::new();
        stream.extend_from_slice(&[0x00, 0xFF, 0x12, 0x34]).unwrap();
        stream.extend_from_slice(&frame.encode_to_vec().unwrap()).unwrap();

        let mut parser = FrameParser::new();
        assert_eq!(parser.feed_bytes(&stream), Ok(Some(frame)));
    }

    proptest! {
        #[test]
        fn parser_accepts_every_encoded_frame(
            seq in any::<u8>(),
            kind in any::<u8>(),
            payload in proptest::collection::vec(any::<u8>(), 0..=MAX_PAYLOAD_SIZE),
        ) {
            let frame = Frame::new(seq, kind, &payload).unwrap();
            let encoded = frame.encode_to_vec().unwrap();

            let mut parser = FrameParser::new();
            prop_assert_eq!(parser.feed_bytes(&encoded), Ok(Some(frame)));
        }

        #[test]
        fn flipped_payload_bit_is_caught(
            payload in proptest::collection::vec(any::<u8>(), 1..32),
            bit in 0u32..8,
        ) {
            let mut encoded = Frame::new(5, 0x90, &payload).unwrap().encode_to_vec().unwrap();
            encoded[4] ^= 1 << bit;

            let mut parser = FrameParser::new();
            prop_assert_eq!(parser.feed_bytes(&encoded), Err(FrameError::InvalidChecksum));
        }
    }
}
