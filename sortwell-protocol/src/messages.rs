//! Message types for the companion link
//!
//! - Station → Companion: [`Request`] frames (`MSG_REQUEST`)
//! - Companion → Station: [`Reply`] frames (`MSG_REPLY`)
//!
//! Strings are borrowed from the frame payload on decode.

use serde::{Deserialize, Serialize};

use crate::frame::{Frame, FrameError, MAX_PAYLOAD_SIZE};

/// Station → Companion
pub const MSG_REQUEST: u8 = 0x10;
/// Companion → Station
pub const MSG_REPLY: u8 = 0x90;

/// Requests from the station
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Request<'a> {
    /// Take a picture
    Capture,
    /// Classify a captured image
    Classify { image: u32 },
    /// Count the items already archived in a folder
    CountArchived { folder: &'a str },
    /// Archive an image under `folder/name`
    Store {
        image: u32,
        folder: &'a str,
        name: &'a str,
    },
}

/// Replies from the companion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reply<'a> {
    Captured { image: u32 },
    /// One `<Category> -> <Color>` line
    Classification { line: &'a str },
    ArchivedCount { count: u32 },
    Stored,
    /// The companion could not serve the request
    Failed { code: u8 },
}

impl<'a> Request<'a> {
    /// Encode this request into a frame
    pub fn to_frame(&self, seq: u8) -> Result<Frame, FrameError> {
        encode(seq, MSG_REQUEST, self)
    }

    /// Parse a request from a frame
    pub fn from_frame(frame: &'a Frame) -> Result<Self, FrameError> {
        decode(frame, MSG_REQUEST)
    }
}

impl<'a> Reply<'a> {
    /// Encode this reply into a frame
    pub fn to_frame(&self, seq: u8) -> Result<Frame, FrameError> {
        encode(seq, MSG_REPLY, self)
    }

    /// Parse a reply from a frame
    pub fn from_frame(frame: &'a Frame) -> Result<Self, FrameError> {
        decode(frame, MSG_REPLY)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Reply::Failed { .. })
    }
}

fn encode<T: Serialize>(seq: u8, msg_type: u8, message: &T) -> Result<Frame, FrameError> {
    let mut buffer = [0u8; MAX_PAYLOAD_SIZE];
    let used = postcard::to_slice(message, &mut buffer).map_err(|_| FrameError::PayloadTooLarge)?;
    Frame::new(seq, msg_type, used)
}

fn decode<'a, T: Deserialize<'a>>(frame: &'a Frame, msg_type: u8) -> Result<T, FrameError> {
    if frame.msg_type != msg_type {
        return Err(FrameError::UnexpectedType(frame.msg_type));
    }
    postcard::from_bytes(&frame.payload).map_err(|_| FrameError::InvalidFrame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameParser;
    use proptest::prelude::*;

    #[test]
    fn test_capture_request_is_small() {
        let frame = Request::Capture.to_frame(1).unwrap();
        assert_eq!(frame.msg_type, MSG_REQUEST);
        // Variant index only
        assert_eq!(frame.payload.as_slice(), &[0]);
    }

    #[test]
    fn test_store_request_over_the_wire() {
        let request = Request::Store {
            image: 12,
            folder: "glass",
            name: "glass_4",
        };
        let encoded = request.to_frame(9).unwrap().encode_to_vec().unwrap();

        let mut parser = FrameParser::new();
        let frame = parser.feed_bytes(&encoded).unwrap().unwrap();
        assert_eq!(frame.seq, 9);
        assert_eq!(Request::from_frame(&frame), Ok(request));
    }

    #[test]
    fn test_classification_reply_borrows_line() {
        let frame = Reply::Classification {
            line: "Glass -> Purple",
        }
        .to_frame(3)
        .unwrap();

        match Reply::from_frame(&frame).unwrap() {
            Reply::Classification { line } => assert_eq!(line, "Glass -> Purple"),
            other => panic!("unexpected reply {:?}", other),
        }
    }

    #[test]
    fn test_reply_type_checked() {
        let frame = Request::Capture.to_frame(0).unwrap();
        assert_eq!(
            Reply::from_frame(&frame),
            Err(FrameError::UnexpectedType(MSG_REQUEST))
        );
    }

    #[test]
    fn test_garbage_payload_rejected() {
        let frame = Frame::new(0, MSG_REPLY, &[0xEE, 0x01]).unwrap();
        assert_eq!(Reply::from_frame(&frame), Err(FrameError::InvalidFrame));
    }

    #[test]
    fn test_failed_reply() {
        let frame = Reply::Failed { code: 4 }.to_frame(0).unwrap();
        let reply = Reply::from_frame(&frame).unwrap();
        assert!(reply.is_failure());
        assert!(!Reply::Stored.is_failure());
    }

    #[test]
    fn test_oversized_line_rejected() {
        let line = core::str::from_utf8(&[b'x'; MAX_PAYLOAD_SIZE]).unwrap();
        assert_eq!(
            Reply::Classification { line }.to_frame(0),
            Err(FrameError::PayloadTooLarge)
        );
    }

    proptest! {
        #[test]
        fn count_reply_survives_the_wire(seq in any::<u8>(), count in any::<u32>()) {
            let frame = Reply::ArchivedCount { count }.to_frame(seq).unwrap();
            let encoded = frame.encode_to_vec().unwrap();

            let mut parser = FrameParser::new();
            let parsed = parser.feed_bytes(&encoded).unwrap().unwrap();
            prop_assert_eq!(parsed.seq, seq);
            prop_assert_eq!(Reply::from_frame(&parsed), Ok(Reply::ArchivedCount { count }));
        }

        #[test]
        fn decoding_arbitrary_payload_never_panics(
            payload in proptest::collection::vec(any::<u8>(), 0..64),
        ) {
            let frame = Frame::new(0, MSG_REPLY, &payload).unwrap();
            let _ = Reply::from_frame(&frame);
        }
    }
}
