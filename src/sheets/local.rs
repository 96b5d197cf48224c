use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs::{self, File};
use std::path::PathBuf;

use super::{Grid, SheetStore};

/// Sheets kept as `;`-separated files in a directory, one file per sheet.
#[derive(Debug, Clone)]
pub struct DirectorySheetStore {
    dir: PathBuf,
}

impl DirectorySheetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn sheet_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", name))
    }
}

/// Read a `;`-separated file into a grid; rows may differ in length.
pub fn read_grid(file: File) -> Result<Grid> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    reader
        .records()
        .map(|record| {
            record
                .map(|r| r.iter().map(str::to_string).collect())
                .context("Failed to parse sheet row")
        })
        .collect()
}

/// Write a grid as a `;`-separated file.
pub fn write_grid<W: std::io::Write>(writer: W, grid: &Grid) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_writer(writer);
    for row in grid {
        writer.write_record(row).context("Failed to write sheet row")?;
    }
    writer.flush().context("Failed to flush sheet")?;
    Ok(())
}

impl SheetStore for DirectorySheetStore {
    async fn read_sheet(&self, name: &str) -> Result<Grid> {
        let path = self.sheet_path(name);
        if !path.exists() {
            return Ok(Grid::new());
        }
        let file = File::open(&path)
            .with_context(|| format!("Failed to open sheet file at {}", path.display()))?;
        read_grid(file).with_context(|| format!("Failed to read sheet '{}'", name))
    }

    async fn write_sheet(&self, name: &str, grid: &Grid) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create sheet directory at {}", self.dir.display()))?;

        let path = self.sheet_path(name);
        let mut file = AtomicWriteFile::open(&path)
            .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
        write_grid(&mut file, grid)?;
        file.commit()
            .with_context(|| format!("Failed to save sheet '{}'", name))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn grid(rows: &[&[&str]]) -> Grid {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[tokio::test]
    async fn test_missing_sheet_reads_empty() {
        let store = DirectorySheetStore::new(env::temp_dir().join("clan_rating_test_missing_sheets"));
        let _ = fs::remove_dir_all(env::temp_dir().join("clan_rating_test_missing_sheets"));
        assert!(store.read_sheet("excuses").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_replaces_whole_sheet() {
        let dir = env::temp_dir().join("clan_rating_test_sheets");
        let _ = fs::remove_dir_all(&dir);
        let store = DirectorySheetStore::new(&dir);

        let first = grid(&[&["tag", "name", "100.1"], &["#1", "alice", "personal"], &["#2", "bob"]]);
        store.write_sheet("excuses", &first).await.unwrap();
        assert_eq!(store.read_sheet("excuses").await.unwrap(), first);

        let second = grid(&[&["tag", "name"], &["#3", "semi;colon"]]);
        store.write_sheet("excuses", &second).await.unwrap();
        assert_eq!(store.read_sheet("excuses").await.unwrap(), second);

        let raw = fs::read_to_string(store.sheet_path("excuses")).unwrap();
        assert!(raw.starts_with("tag;name\n"));

        let _ = fs::remove_dir_all(&dir);
    }
}
