use serde::Deserialize;
use serde_json::json;
use url::Url;

use super::{SheetsApi, SheetsError};

/// Google Sheets v4 REST client. Authenticates every call with a bearer
/// access token; obtaining and refreshing that token is the deployment's
/// concern, not this client's.
pub struct GoogleSheetsClient {
    http: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    token: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Deserialize)]
struct SheetProperties {
    title: String,
}

impl GoogleSheetsClient {
    pub fn new(base_url: &Url, spreadsheet_id: String, token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            spreadsheet_id,
            token,
        }
    }

    fn spreadsheet_url(&self) -> String {
        format!("{}/v4/spreadsheets/{}", self.base_url, self.spreadsheet_id)
    }

    fn values_url(&self, range: &str) -> String {
        format!("{}/values/{}", self.spreadsheet_url(), range)
    }

    async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response, SheetsError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let mut body = resp.text().await.unwrap_or_default();
        body.truncate(200);
        Err(SheetsError::Status {
            status: status.as_u16(),
            body,
        })
    }

    fn cell_to_string(cell: serde_json::Value) -> String {
        match cell {
            serde_json::Value::String(s) => s,
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl SheetsApi for GoogleSheetsClient {
    async fn read_range(&self, range: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        let resp = self
            .http
            .get(self.values_url(range))
            .bearer_auth(&self.token)
            .send()
            .await?;
        let parsed: ValueRange = Self::ensure_success(resp)
            .await?
            .json()
            .await
            .map_err(|e| SheetsError::Malformed(e.to_string()))?;
        Ok(parsed
            .values
            .into_iter()
            .map(|row| row.into_iter().map(Self::cell_to_string).collect())
            .collect())
    }

    async fn append_rows(&self, range: &str, rows: Vec<Vec<String>>) -> Result<(), SheetsError> {
        let resp = self
            .http
            .post(format!("{}:append", self.values_url(range)))
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(&self.token)
            .json(&json!({ "values": rows }))
            .send()
            .await?;
        Self::ensure_success(resp).await?;
        Ok(())
    }

    async fn update_range(&self, range: &str, rows: Vec<Vec<String>>) -> Result<(), SheetsError> {
        let resp = self
            .http
            .put(self.values_url(range))
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(&self.token)
            .json(&json!({ "values": rows }))
            .send()
            .await?;
        Self::ensure_success(resp).await?;
        Ok(())
    }

    async fn list_sheets(&self) -> Result<Vec<String>, SheetsError> {
        let resp = self
            .http
            .get(self.spreadsheet_url())
            .query(&[("fields", "sheets.properties.title")])
            .bearer_auth(&self.token)
            .send()
            .await?;
        let parsed: SpreadsheetMeta = Self::ensure_success(resp)
            .await?
            .json()
            .await
            .map_err(|e| SheetsError::Malformed(e.to_string()))?;
        Ok(parsed
            .sheets
            .into_iter()
            .map(|s| s.properties.title)
            .collect())
    }

    async fn create_sheet(
        &self,
        title: &str,
        row_count: u32,
        column_count: u32,
    ) -> Result<(), SheetsError> {
        let body = json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": title,
                        "gridProperties": {
                            "rowCount": row_count,
                            "columnCount": column_count,
                        }
                    }
                }
            }]
        });
        let resp = self
            .http
            .post(format!("{}:batchUpdate", self.spreadsheet_url()))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        Self::ensure_success(resp).await?;
        Ok(())
    }
}
