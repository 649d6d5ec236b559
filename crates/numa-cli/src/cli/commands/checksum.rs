//! Checksum command: compute SHA-512 of a file.

use anyhow::Result;
use numa_core::checksum;
use std::path::Path;

/// Compute and print SHA-512 (hex) of the given file.
pub async fn run_checksum(path: &Path) -> Result<()> {
    let digest = checksum::sha512_path(path)?;
    println!("{}  {}", digest, path.display());
    Ok(())
}
