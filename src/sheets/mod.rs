// Backing-store capability: a spreadsheet addressed as named, range-readable
// tables. Components depend on the trait; production wiring injects the
// Google client.
pub mod client;

use thiserror::Error;

pub use client::GoogleSheetsClient;

#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("sheets API returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Remote spreadsheet operations used by the record source and the user
/// repository. One call per method; implementations do not retry.
#[async_trait::async_trait]
pub trait SheetsApi: Send + Sync {
    /// Read every row in `range` (e.g. `Data!A2:F`). A range with no values
    /// yields an empty vec, not an error.
    async fn read_range(&self, range: &str) -> Result<Vec<Vec<String>>, SheetsError>;

    /// Append `rows` after the last data row of `range`'s table.
    async fn append_rows(&self, range: &str, rows: Vec<Vec<String>>) -> Result<(), SheetsError>;

    /// Overwrite the cells of `range` with `rows`.
    async fn update_range(&self, range: &str, rows: Vec<Vec<String>>) -> Result<(), SheetsError>;

    /// Titles of every sheet in the spreadsheet.
    async fn list_sheets(&self) -> Result<Vec<String>, SheetsError>;

    /// Add a new sheet with the given grid capacity.
    async fn create_sheet(
        &self,
        title: &str,
        row_count: u32,
        column_count: u32,
    ) -> Result<(), SheetsError>;
}
