// Search over the inventory data sheet: schema-on-read mapping from
// positional cells into named fields, exact-match filtering.
mod layout;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::sheets::SheetsApi;

pub use layout::{LayoutError, RecordLayout};

/// One search result row. Serialized flat; the field names are an external
/// contract shared with the UI and must not change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub block_no: String,
    pub part_no: String,
    pub thickness: String,
    pub nos: String,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, String>,
    pub color1: String,
    pub color2: String,
}

/// Read-only search over the data sheet. Every call re-fetches the full
/// range, so results are as fresh as the backing store; fine at the row
/// counts this deployment sees, a secondary index territory beyond that.
pub struct RecordSource<S> {
    api: Arc<S>,
    layout: RecordLayout,
}

impl<S: SheetsApi> RecordSource<S> {
    pub fn new(api: Arc<S>, layout: RecordLayout) -> Self {
        Self { api, layout }
    }

    /// Exact-match search by block number, optionally narrowed by part
    /// number and thickness. All supplied filters must hold; comparison is
    /// case-insensitive; result order is source row order.
    ///
    /// `block_no` is expected non-empty and already trimmed — callers
    /// normalize input, this component compares it verbatim. Rows whose
    /// leading cell is empty are skipped as blank/malformed.
    pub async fn search(
        &self,
        block_no: &str,
        part_no: Option<&str>,
        thickness: Option<&str>,
    ) -> Result<Vec<Record>, StoreError> {
        let rows = self
            .api
            .read_range(self.layout.range())
            .await
            .map_err(StoreError::SourceUnavailable)?;
        log::debug!(
            "search: {} rows from {}, blockNo={}",
            rows.len(),
            self.layout.range(),
            block_no
        );

        let want_block = block_no.to_lowercase();
        let want_part = part_no.map(str::to_lowercase);
        let want_thickness = thickness.map(str::to_lowercase);

        let results: Vec<Record> = rows
            .iter()
            .filter(|row| {
                let Some(first) = row.first().filter(|c| !c.is_empty()) else {
                    return false;
                };
                if first.to_lowercase() != want_block {
                    return false;
                }
                let row_part = row.get(1).map(|c| c.to_lowercase()).unwrap_or_default();
                let row_thickness = row.get(2).map(|c| c.to_lowercase()).unwrap_or_default();
                want_part.as_deref().map_or(true, |p| row_part == p)
                    && want_thickness.as_deref().map_or(true, |t| row_thickness == t)
            })
            .map(|row| self.layout.map_row(row))
            .collect();

        log::debug!("search: {} matching rows", results.len());
        Ok(results)
    }
}
