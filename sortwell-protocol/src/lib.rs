//! Companion Link Protocol
//!
//! This crate defines the UART protocol between the station controller and
//! the companion computer that owns the camera, the classifier and the
//! image archive.
//!
//! # Protocol Overview
//!
//! All messages use a simple binary frame format:
//! ```text
//! ┌───────┬─────┬────────┬──────┬─────────────┬──────────┐
//! │ START │ SEQ │ LENGTH │ TYPE │ PAYLOAD     │ CHECKSUM │
//! │ 1B    │ 1B  │ 1B     │ 1B   │ 0–250B      │ 1B       │
//! └───────┴─────┴────────┴──────┴─────────────┴──────────┘
//! ```
//!
//! The station sends one request at a time and blocks until the reply
//! carrying the same sequence number arrives. Payloads are postcard-encoded
//! [`Request`] and [`Reply`] values.

#![no_std]
#![deny(unsafe_code)]

pub mod frame;
pub mod messages;

pub use frame::{Frame, FrameError, FrameParser, FRAME_START, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE};
pub use messages::{Reply, Request, MSG_REPLY, MSG_REQUEST};
