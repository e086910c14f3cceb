// User accounts persisted as rows of the `User` sheet (ID, Username,
// Password). The sheet is bootstrapped lazily on first create.
use std::sync::Arc;

use crate::error::StoreError;
use crate::sheets::{SheetsApi, SheetsError};

const USER_SHEET: &str = "User";
const USER_DATA_RANGE: &str = "User!A2:C";
const USER_APPEND_RANGE: &str = "User!A:C";
const USER_HEADER_RANGE: &str = "User!A1:C1";
const USER_SHEET_ROWS: u32 = 1000;
const USER_SHEET_COLS: u32 = 3;

/// One authentication principal. `password` is opaque credential material;
/// this layer stores and returns it verbatim, hashing happens upstream.
#[derive(Clone, Debug, PartialEq)]
pub struct UserAccount {
    pub id: i64,
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug)]
pub struct NewUser {
    pub username: String,
    pub password: String,
}

pub struct UserRepository<S> {
    api: Arc<S>,
}

impl<S: SheetsApi> UserRepository<S> {
    pub fn new(api: Arc<S>) -> Self {
        Self { api }
    }

    /// Look up a user by id. A backing-store failure degrades to `None`
    /// (logged); callers cannot tell "no such user" from "store
    /// unreachable". Inherited behavior, kept deliberately — see DESIGN.md.
    pub async fn get_by_id(&self, id: i64) -> Option<UserAccount> {
        match self.try_get_by_id(id).await {
            Ok(found) => found,
            Err(err) => {
                log::warn!("user lookup by id {id} degraded to absent: {err}");
                None
            }
        }
    }

    /// Case-insensitive username lookup with the same degrade-to-absent
    /// policy as [`get_by_id`](Self::get_by_id).
    pub async fn get_by_username(&self, username: &str) -> Option<UserAccount> {
        match self.try_get_by_username(username).await {
            Ok(found) => found,
            Err(err) => {
                log::warn!("user lookup by name {username:?} degraded to absent: {err}");
                None
            }
        }
    }

    pub async fn try_get_by_id(&self, id: i64) -> Result<Option<UserAccount>, StoreError> {
        let rows = self.fetch_rows().await?;
        // Non-numeric id cells are non-matching, not an error.
        Ok(rows
            .iter()
            .find(|row| parsed_id(row) == Some(id))
            .map(|row| row_to_user(row)))
    }

    pub async fn try_get_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserAccount>, StoreError> {
        let want = username.to_lowercase();
        let rows = self.fetch_rows().await?;
        Ok(rows
            .iter()
            .find(|row| {
                row.get(1)
                    .map(|cell| cell.to_lowercase() == want)
                    .unwrap_or(false)
            })
            .map(|row| row_to_user(row)))
    }

    /// Create a user with the next free id and append it to the sheet.
    ///
    /// Read-then-compute-then-append with no atomicity guarantee: two
    /// concurrent creates can assign the same id. Accepted for the
    /// low-concurrency administrative creation this service sees.
    ///
    /// Any failing step (ensure-table, read, append) logs its cause and
    /// comes back as the opaque [`StoreError::CreateFailed`].
    pub async fn create(&self, candidate: NewUser) -> Result<UserAccount, StoreError> {
        match self.try_create(&candidate).await {
            Ok(user) => {
                log::info!("created user {} (id {})", user.username, user.id);
                Ok(user)
            }
            Err(err) => {
                log::error!("creating user {:?} failed: {err}", candidate.username);
                Err(StoreError::CreateFailed)
            }
        }
    }

    async fn try_create(&self, candidate: &NewUser) -> Result<UserAccount, StoreError> {
        self.ensure_user_sheet()
            .await
            .map_err(StoreError::RepositoryUnavailable)?;
        let rows = self.fetch_rows().await?;
        let id = next_id(&rows);
        self.api
            .append_rows(
                USER_APPEND_RANGE,
                vec![vec![
                    id.to_string(),
                    candidate.username.clone(),
                    candidate.password.clone(),
                ]],
            )
            .await
            .map_err(StoreError::RepositoryUnavailable)?;
        Ok(UserAccount {
            id,
            username: candidate.username.clone(),
            password: candidate.password.clone(),
        })
    }

    /// Create the `User` sheet with its header row if it does not exist.
    /// Safe to call when it does: the existence check makes it a no-op.
    async fn ensure_user_sheet(&self) -> Result<(), SheetsError> {
        let sheets = self.api.list_sheets().await?;
        if sheets.iter().any(|title| title == USER_SHEET) {
            return Ok(());
        }
        log::info!("bootstrapping {USER_SHEET} sheet");
        self.api
            .create_sheet(USER_SHEET, USER_SHEET_ROWS, USER_SHEET_COLS)
            .await?;
        self.api
            .update_range(
                USER_HEADER_RANGE,
                vec![vec![
                    "ID".to_string(),
                    "Username".to_string(),
                    "Password".to_string(),
                ]],
            )
            .await
    }

    async fn fetch_rows(&self) -> Result<Vec<Vec<String>>, StoreError> {
        self.api
            .read_range(USER_DATA_RANGE)
            .await
            .map_err(StoreError::RepositoryUnavailable)
    }
}

fn parsed_id(row: &[String]) -> Option<i64> {
    row.first().and_then(|cell| cell.trim().parse().ok())
}

/// 1 for an empty table, otherwise max existing id + 1. Unparsable id cells
/// count as 0 so a corrupted cell cannot poison the sequence.
fn next_id(rows: &[Vec<String>]) -> i64 {
    rows.iter()
        .map(|row| parsed_id(row).unwrap_or(0))
        .max()
        .map_or(1, |max| max + 1)
}

fn row_to_user(row: &[String]) -> UserAccount {
    UserAccount {
        id: parsed_id(row).unwrap_or(0),
        username: row.get(1).cloned().unwrap_or_default(),
        password: row.get(2).cloned().unwrap_or_default(),
    }
}
