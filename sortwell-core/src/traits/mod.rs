//! Hardware and collaborator traits
//!
//! These traits define the interface between the station logic and the
//! drivers, the companion computer and the event journal.

pub mod collaborator;
pub mod indicator;
pub mod input;
pub mod journal;
pub mod sensor;

pub use collaborator::{
    Archive, Camera, Classifier, CollaboratorError, ImageHandle, MAX_RESPONSE_LEN,
};
pub use indicator::{Color, Indicator};
pub use input::{Interrupt, NoInterrupt, Trigger};
pub use journal::{EventSink, Notice, Stage};
pub use sensor::RangeSensor;
