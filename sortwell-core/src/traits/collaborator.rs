//! External collaborator traits: camera, classifier and archive
//!
//! The station never talks to these directly; on the firmware they are all
//! served by the companion computer over the serial link. Every call blocks
//! until the collaborator answers.

use heapless::String;

use crate::archive::ArchivePath;

/// Longest classification line kept
pub const MAX_RESPONSE_LEN: usize = 64;

/// Opaque reference to a captured image, owned by the collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ImageHandle(pub u32);

/// Collaborator call failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CollaboratorError {
    /// Transport failed (UART error)
    Link,
    /// Reply could not be decoded or did not match the request
    Protocol,
    /// Collaborator reported a failure with its own code
    Rejected(u8),
    /// Category folder already holds `u32::MAX` items
    ArchiveFull,
}

/// Image capture device
pub trait Camera {
    fn capture(&mut self) -> Result<ImageHandle, CollaboratorError>;
}

/// Classification backend
pub trait Classifier {
    /// Raw response line, expected as `<Category> -> <Color>`
    fn classify(&mut self, image: ImageHandle)
        -> Result<String<MAX_RESPONSE_LEN>, CollaboratorError>;
}

/// Persistent category-scoped image archive
pub trait Archive {
    /// Number of items already stored in `folder`
    fn count_items(&mut self, folder: &str) -> Result<u32, CollaboratorError>;

    fn store(&mut self, image: ImageHandle, path: &ArchivePath) -> Result<(), CollaboratorError>;
}
