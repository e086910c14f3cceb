use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_secs: u64,
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

/// Body for both register and login.
#[derive(Serialize, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// What the API says about a user. Never carries credential material.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    #[serde(default)]
    pub block_no: Option<String>,
    #[serde(default)]
    pub part_no: Option<String>,
    #[serde(default)]
    pub thickness: Option<String>,
}
