//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in sortwell-core for the station hardware:
//!
//! - Ultrasonic distance sensors (HC-SR04 pulse timing)
//! - Tri-color indicator (digital or PWM channels)
//! - Operator inputs (debounced trigger, latching stop)
//! - Companion link client (camera, classifier, archive over UART)

#![no_std]
#![deny(unsafe_code)]

pub mod companion;
pub mod indicator;
pub mod input;
pub mod sensor;
