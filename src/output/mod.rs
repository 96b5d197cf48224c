pub mod formatter;

pub use formatter::{
    format_ranking_table, format_value, format_weights, ranking_grid, should_use_colors,
    RANKING_HEADER,
};

use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::path::Path;

use crate::sheets::{write_grid, Grid};

/// Save the ranking grid as a `;`-separated file atomically
pub fn write_ranking_file(path: &Path, grid: &Grid) -> Result<()> {
    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    write_grid(&mut file, grid)?;
    file.commit()
        .with_context(|| format!("Failed to save ranking to {}", path.display()))?;
    Ok(())
}
