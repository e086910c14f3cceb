use std::sync::Arc;
use std::time::SystemTime;

use crate::auth::{Argon2Hasher, SessionStore};
use crate::configuration::Configuration;
use crate::records::RecordSource;
use crate::rest::AppState;
use crate::sheets::GoogleSheetsClient;
use crate::users::UserRepository;

/// Build the shared application state: one Sheets client behind both the
/// record source and the user repository, so tests can swap a fake in via
/// the same constructor shape.
pub fn build_state(config: &Configuration) -> AppState<GoogleSheetsClient> {
    let client = Arc::new(GoogleSheetsClient::new(
        &config.sheets_url,
        config.spreadsheet_id.clone(),
        config.sheets_token.clone(),
    ));
    AppState {
        records: Arc::new(RecordSource::new(client.clone(), config.layout.clone())),
        users: Arc::new(UserRepository::new(client)),
        sessions: SessionStore::new(config.session_ttl),
        hasher: Arc::new(Argon2Hasher),
        started_at: SystemTime::now(),
    }
}
