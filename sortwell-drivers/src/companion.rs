//! Companion link client
//!
//! Serves the station's camera, classifier and archive by exchanging
//! request/reply frames with the companion computer over a UART. One request
//! is in flight at a time; the reply is matched by sequence number and any
//! other frame is dropped.

use heapless::String;
use sortwell_core::archive::ArchivePath;
use sortwell_core::traits::{
    Archive, Camera, Classifier, CollaboratorError, ImageHandle, MAX_RESPONSE_LEN,
};
use sortwell_hal::{UartRx, UartTx};
use sortwell_protocol::{Frame, FrameParser, Reply, Request, MSG_REPLY};

/// Client end of the companion link
pub struct CompanionLink<U> {
    uart: U,
    parser: FrameParser,
    seq: u8,
}

impl<U: UartTx + UartRx> CompanionLink<U> {
    pub fn new(uart: U) -> Self {
        Self {
            uart,
            parser: FrameParser::new(),
            seq: 0,
        }
    }

    pub fn release(self) -> U {
        self.uart
    }

    /// Send a request and block until its reply frame arrives
    fn exchange(&mut self, request: &Request<'_>) -> Result<Frame, CollaboratorError> {
        self.seq = self.seq.wrapping_add(1);
        let frame = request
            .to_frame(self.seq)
            .map_err(|_| CollaboratorError::Protocol)?;
        let bytes = frame
            .encode_to_vec()
            .map_err(|_| CollaboratorError::Protocol)?;

        self.parser.reset();
        self.uart
            .write_all(&bytes)
            .map_err(|_| CollaboratorError::Link)?;
        self.uart.flush().map_err(|_| CollaboratorError::Link)?;

        loop {
            let byte = self
                .uart
                .read_byte()
                .map_err(|_| CollaboratorError::Link)?;
            match self.parser.feed(byte) {
                Ok(Some(frame)) if frame.seq == self.seq && frame.msg_type == MSG_REPLY => {
                    return Ok(frame);
                }
                // Stale reply from an earlier request, or partial frame
                Ok(_) => {}
                Err(_) => return Err(CollaboratorError::Protocol),
            }
        }
    }
}

/// Map a reply that was not the expected one
fn unexpected(reply: Result<Reply<'_>, sortwell_protocol::FrameError>) -> CollaboratorError {
    match reply {
        Ok(Reply::Failed { code }) => CollaboratorError::Rejected(code),
        _ => CollaboratorError::Protocol,
    }
}

impl<U: UartTx + UartRx> Camera for CompanionLink<U> {
    fn capture(&mut self) -> Result<ImageHandle, CollaboratorError> {
        let frame = self.exchange(&Request::Capture)?;
        match Reply::from_frame(&frame) {
            Ok(Reply::Captured { image }) => Ok(ImageHandle(image)),
            other => Err(unexpected(other)),
        }
    }
}

impl<U: UartTx + UartRx> Classifier for CompanionLink<U> {
    fn classify(
        &mut self,
        image: ImageHandle,
    ) -> Result<String<MAX_RESPONSE_LEN>, CollaboratorError> {
        let frame = self.exchange(&Request::Classify { image: image.0 })?;
        match Reply::from_frame(&frame) {
            Ok(Reply::Classification { line }) => {
                let mut out = String::new();
                for c in line.chars() {
                    if out.push(c).is_err() {
                        break;
                    }
                }
                Ok(out)
            }
            other => Err(unexpected(other)),
        }
    }
}

impl<U: UartTx + UartRx> Archive for CompanionLink<U> {
    fn count_items(&mut self, folder: &str) -> Result<u32, CollaboratorError> {
        let frame = self.exchange(&Request::CountArchived { folder })?;
        match Reply::from_frame(&frame) {
            Ok(Reply::ArchivedCount { count }) => Ok(count),
            other => Err(unexpected(other)),
        }
    }

    fn store(&mut self, image: ImageHandle, path: &ArchivePath) -> Result<(), CollaboratorError> {
        let request = Request::Store {
            image: image.0,
            folder: &path.folder,
            name: &path.name,
        };
        let frame = self.exchange(&request)?;
        match Reply::from_frame(&frame) {
            Ok(Reply::Stored) => Ok(()),
            other => Err(unexpected(other)),
        }
    }
}
