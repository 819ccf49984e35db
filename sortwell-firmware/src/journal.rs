//! Station journal
//!
//! Turns station notices into defmt log lines, naming bins by their
//! configured label.

use defmt::*;

use sortwell_core::config::StationConfig;
use sortwell_core::sensing::Reading;
use sortwell_core::traits::{EventSink, Notice};

/// Logs every notice over RTT
pub struct Journal {
    config: &'static StationConfig,
}

impl Journal {
    pub fn new(config: &'static StationConfig) -> Self {
        Self { config }
    }

    fn label(&self, bin: u8) -> &'static str {
        self.config
            .sensors
            .get(bin as usize)
            .map(|s| s.label.as_str())
            .unwrap_or("?")
    }

    fn note_range(&self, bin: u8, reading: Reading) {
        if reading.is_beyond_practical_range() {
            warn!(
                "{}: {} cm is beyond practical range, check sensor aim",
                self.label(bin),
                reading.distance_cm()
            );
        }
    }
}

impl EventSink for Journal {
    fn record(&mut self, notice: Notice<'_>) {
        match notice {
            Notice::Armed => info!("Trigger pressed, checking bins"),
            Notice::BinDisconnected { bin } => {
                error!("{}: no echo on any probe, sensor disconnected?", self.label(bin))
            }
            Notice::BinFull { bin, reading } => match reading {
                Reading::Distance(cm) => {
                    warn!("{}: full ({} cm), please empty it", self.label(bin), cm)
                }
                Reading::Invalid => {
                    warn!("{}: no valid reading, treating as full", self.label(bin))
                }
            },
            Notice::StillWaiting {
                bin,
                reading,
                elapsed_ms,
            } => {
                info!(
                    "{}: still waiting after {} ms ({} cm)",
                    self.label(bin),
                    elapsed_ms,
                    reading.distance_cm()
                );
                self.note_range(bin, reading);
            }
            Notice::BinClear {
                bin,
                reading,
                elapsed_ms,
            } => {
                info!(
                    "{}: clear ({} cm) after {} ms",
                    self.label(bin),
                    reading.distance_cm(),
                    elapsed_ms
                );
                self.note_range(bin, reading);
            }
            Notice::BinTimedOut { bin, elapsed_ms } => {
                warn!("{}: not emptied within {} ms", self.label(bin), elapsed_ms)
            }
            Notice::ClearanceFinished {
                exit_code,
                capture_allowed,
            } => {
                if capture_allowed {
                    info!("Clearance {} ({}), capturing", exit_code, exit_code.code());
                } else {
                    warn!("Clearance {} ({}), cycle skipped", exit_code, exit_code.code());
                }
            }
            Notice::Captured { image } => debug!("Captured image {}", image.0),
            Notice::Classified { category, known } => {
                info!("Classified as '{}'", category);
                if !known {
                    warn!("'{}' has no indicator color, showing alert", category);
                }
            }
            Notice::ClassificationUnparsable { raw } => {
                warn!("Unparsable classification '{}', using 'unknown'", raw)
            }
            Notice::Indicating { color } => debug!("Indicator {}", color),
            Notice::Archived { folder, name } => info!("Archived as {}/{}", folder, name),
            Notice::CollaboratorFailed { stage, error } => {
                error!("{} failed: {}", stage, error)
            }
            Notice::Interrupted => info!("Stop requested, shutting down"),
        }
    }
}
