use std::net::SocketAddr;
use std::time::Duration;

use url::Url;

use crate::records::RecordLayout;

#[derive(Clone)]
pub struct Configuration {
    pub spreadsheet_id: String,
    pub sheets_token: String,
    pub sheets_url: Url,
    pub listen: SocketAddr,
    pub layout: RecordLayout,
    pub session_ttl: Duration,
    pub log_file: Option<String>,
}

impl Configuration {
    pub fn from_cli(cli: &crate::cli::Cli) -> Self {
        Self {
            spreadsheet_id: cli.spreadsheet_id.clone(),
            sheets_token: cli.sheets_token.clone(),
            sheets_url: cli.sheets_url.clone(),
            listen: cli.listen,
            layout: parse_layout(Some(cli.layout.clone())),
            session_ttl: Duration::from_secs(cli.session_ttl_secs),
            log_file: cli.log_file.clone(),
        }
    }
}

pub fn parse_layout<S: AsRef<str>>(s: Option<S>) -> RecordLayout {
    match s.as_ref().map(|x| x.as_ref().to_lowercase()) {
        Some(n) if n == "extended" || n == "wide" => RecordLayout::extended(),
        _ => RecordLayout::standard(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_names_resolve_with_standard_fallback() {
        assert_eq!(parse_layout(Some("extended")).range(), "Data!A2:W");
        assert_eq!(parse_layout(Some("WIDE")).range(), "Data!A2:W");
        assert_eq!(parse_layout(Some("standard")).range(), "Data!A2:F");
        assert_eq!(parse_layout(Some("unknown")).range(), "Data!A2:F");
        assert_eq!(parse_layout(None::<&str>).range(), "Data!A2:F");
    }
}
