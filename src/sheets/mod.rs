mod google;
mod local;

pub use google::GoogleSheetsStore;
pub use local::{read_grid, write_grid, DirectorySheetStore};

use anyhow::Result;

/// A sheet as rows of cells; the first row is the header.
pub type Grid = Vec<Vec<String>>;

/// Spreadsheet-like storage addressed by sheet name.
///
/// Sheets are always read and written in full.
#[allow(async_fn_in_trait)]
pub trait SheetStore {
    /// Read a whole sheet; a sheet that does not exist yet reads as empty.
    async fn read_sheet(&self, name: &str) -> Result<Grid>;

    /// Replace the whole content of a sheet.
    async fn write_sheet(&self, name: &str, grid: &Grid) -> Result<()>;
}
