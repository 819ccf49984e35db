//! Persistent configuration storage
//!
//! The station only reads from flash. Overrides are written into the
//! config partition from the host when the board is flashed.

/// Items kept in the config partition, one byte each on flash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// Postcard-encoded `StationConfig`
    StationConfig = 0,
    /// `station.toml` text
    StationConfigToml = 1,
}

impl TryFrom<u8> for StorageKey {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, u8> {
        match value {
            0 => Ok(StorageKey::StationConfig),
            1 => Ok(StorageKey::StationConfigToml),
            other => Err(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// The storage layer failed or found a corrupt partition
    Storage,
    /// No item stored under this key
    NotFound,
    /// Item larger than the caller's buffer
    BufferTooSmall,
}

/// Read access to keyed items in flash
pub trait FlashStorage {
    /// Copy the item stored under `key` into `buffer`, returning its length
    fn read(
        &mut self,
        key: StorageKey,
        buffer: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, FlashError>>;
}

#[cfg(feature = "sequential-storage")]
mod map_key {
    use sequential_storage::map::{Key, SerializationError};

    use super::StorageKey;

    impl Key for StorageKey {
        fn serialize_into(&self, buffer: &mut [u8]) -> Result<usize, SerializationError> {
            let slot = buffer
                .first_mut()
                .ok_or(SerializationError::BufferTooSmall)?;
            *slot = *self as u8;
            Ok(1)
        }

        fn deserialize_from(buffer: &[u8]) -> Result<(Self, usize), SerializationError> {
            let byte = buffer.first().ok_or(SerializationError::BufferTooSmall)?;
            StorageKey::try_from(*byte)
                .map(|key| (key, 1))
                .map_err(|_| SerializationError::InvalidFormat)
        }
    }
}
