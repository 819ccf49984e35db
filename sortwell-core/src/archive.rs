//! Archive naming
//!
//! Images are archived under a folder named after their category, as
//! `<folder>/<folder>_<n>` where `n` is one past the number of items the
//! folder already holds.

use core::fmt::Write;
use heapless::String;

/// Longest folder name kept
pub const MAX_FOLDER_LEN: usize = 32;

/// Longest item name: folder, underscore and a u32 counter
pub const MAX_ITEM_NAME_LEN: usize = MAX_FOLDER_LEN + 11;

/// Where one image goes in the archive
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ArchivePath {
    pub folder: String<MAX_FOLDER_LEN>,
    pub name: String<MAX_ITEM_NAME_LEN>,
}

impl ArchivePath {
    /// Next free path in `category`'s folder, given how many items it holds
    ///
    /// `None` once the counter is exhausted; no name is ever handed out twice.
    pub fn next_in(category: &str, existing: u32) -> Option<Self> {
        let index = existing.checked_add(1)?;
        let folder = folder_for(category);
        let mut name = String::new();
        // Capacity covers the folder plus "_4294967295"
        let _ = write!(name, "{}_{}", folder, index);
        Some(Self { folder, name })
    }
}

/// Folder name for a category: lower case, `/` replaced by `-`
///
/// Overlong categories are truncated; an empty one becomes "unknown".
pub fn folder_for(category: &str) -> String<MAX_FOLDER_LEN> {
    let mut folder = String::new();
    for c in category.trim().chars() {
        let c = match c {
            '/' => '-',
            c => c.to_ascii_lowercase(),
        };
        if folder.push(c).is_err() {
            break;
        }
    }
    if folder.is_empty() {
        let _ = folder.push_str("unknown");
    }
    folder
}
