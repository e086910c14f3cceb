use std::collections::BTreeMap;

use thiserror::Error;

use super::Record;

/// Field names every layout must carry, in their fixed positions.
const KEY_COLUMNS: [&str; 4] = ["blockNo", "partNo", "thickness", "nos"];
const COLOR_COLUMNS: [&str; 2] = ["color1", "color2"];

#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("layout needs at least {0} columns, got {1}")]
    TooFewColumns(usize, usize),
    #[error("column {0} must be named {1:?}, got {2:?}")]
    MisplacedColumn(usize, &'static str, String),
    #[error("duplicate column name {0:?}")]
    DuplicateColumn(String),
    #[error("empty column name at position {0}")]
    EmptyColumn(usize),
}

/// Positional column-to-field mapping for one deployment of the data sheet.
///
/// Deployments differ in column count; the first four columns and the last
/// two are fixed by the search contract, everything between is the
/// processing-attribute tail. Mapping lives here as data so the query code
/// serves any width.
#[derive(Clone, Debug)]
pub struct RecordLayout {
    range: String,
    columns: Vec<String>,
}

impl RecordLayout {
    /// The 6-column deployment: keys and colors only.
    pub fn standard() -> Self {
        Self {
            range: "Data!A2:F".to_string(),
            columns: KEY_COLUMNS
                .iter()
                .chain(COLOR_COLUMNS.iter())
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// The 23-column deployment: keys, the full processing tail, colors.
    pub fn extended() -> Self {
        let tail = [
            "length",
            "height",
            "grossSqft",
            "netSqft",
            "finish",
            "grade",
            "shade",
            "epoxy",
            "mesh",
            "polishLine",
            "edgeCut",
            "cracks",
            "resin",
            "lotNo",
            "machine",
            "location",
            "remarks",
        ];
        let columns = KEY_COLUMNS
            .iter()
            .chain(tail.iter())
            .chain(COLOR_COLUMNS.iter())
            .map(|s| s.to_string())
            .collect();
        Self {
            range: "Data!A2:W".to_string(),
            columns,
        }
    }

    /// Build a custom layout. `columns` names every source column in order
    /// and must start with the key columns and end with the color pair.
    pub fn from_columns(
        range: impl Into<String>,
        columns: Vec<String>,
    ) -> Result<Self, LayoutError> {
        let min = KEY_COLUMNS.len() + COLOR_COLUMNS.len();
        if columns.len() < min {
            return Err(LayoutError::TooFewColumns(min, columns.len()));
        }
        for (i, expected) in KEY_COLUMNS.iter().enumerate() {
            if columns[i] != *expected {
                return Err(LayoutError::MisplacedColumn(i, expected, columns[i].clone()));
            }
        }
        let color_base = columns.len() - COLOR_COLUMNS.len();
        for (i, expected) in COLOR_COLUMNS.iter().enumerate() {
            let pos = color_base + i;
            if columns[pos] != *expected {
                return Err(LayoutError::MisplacedColumn(pos, expected, columns[pos].clone()));
            }
        }
        let mut seen = std::collections::BTreeSet::new();
        for (i, name) in columns.iter().enumerate() {
            if name.is_empty() {
                return Err(LayoutError::EmptyColumn(i));
            }
            if !seen.insert(name.clone()) {
                return Err(LayoutError::DuplicateColumn(name.clone()));
            }
        }
        Ok(Self {
            range: range.into(),
            columns,
        })
    }

    pub fn range(&self) -> &str {
        &self.range
    }

    /// Names of the processing-attribute tail, in source order.
    pub fn attribute_names(&self) -> &[String] {
        let end = self.columns.len() - COLOR_COLUMNS.len();
        &self.columns[KEY_COLUMNS.len()..end]
    }

    /// Map one raw row into a record. Cells past the end of a short row
    /// default to empty strings.
    pub fn map_row(&self, row: &[String]) -> Record {
        let cell = |i: usize| row.get(i).cloned().unwrap_or_default();
        let attributes: BTreeMap<String, String> = self
            .attribute_names()
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), cell(KEY_COLUMNS.len() + i)))
            .collect();
        let color_base = self.columns.len() - COLOR_COLUMNS.len();
        Record {
            block_no: cell(0),
            part_no: cell(1),
            thickness: cell(2),
            nos: cell(3),
            attributes,
            color1: cell(color_base),
            color2: cell(color_base + 1),
        }
    }
}
