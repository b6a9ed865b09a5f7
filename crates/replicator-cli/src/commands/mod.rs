pub mod drill;
pub mod init;
pub mod read;
pub mod scenes;
pub mod stats;
pub mod validate;

use anyhow::Result;

/// Convert a 1-based scene number from the command line to an index.
pub fn scene_index(number: usize) -> Result<usize> {
    number
        .checked_sub(1)
        .ok_or_else(|| anyhow::anyhow!("scene numbers start at 1"))
}
