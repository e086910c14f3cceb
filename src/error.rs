use thiserror::Error;

use crate::sheets::SheetsError;

/// Failures surfaced by the record and user components.
///
/// Lookup operations on the user repository do not use this type at their
/// public boundary; they degrade to absent and log the cause instead.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("data source unavailable: {0}")]
    SourceUnavailable(#[source] SheetsError),
    #[error("user repository unavailable: {0}")]
    RepositoryUnavailable(#[source] SheetsError),
    /// Raised from `create` for any failing step. The underlying cause is
    /// logged, not carried, so callers cannot tell ensure-table, read, and
    /// append failures apart.
    #[error("failed to create user")]
    CreateFailed,
}
