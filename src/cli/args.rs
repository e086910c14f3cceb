use clap::Parser;
use std::env;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Serve slab inventory searches over a shared spreadsheet",
    long_about = "HTTP service that authenticates users against the User sheet of a spreadsheet and serves exact-match inventory searches over its Data sheet."
)]
pub struct Cli {
    #[arg(
        long = "spreadsheet-id",
        env = "SLABSTOCK_SPREADSHEET_ID",
        value_name = "ID",
        help = "Id of the backing spreadsheet"
    )]
    pub spreadsheet_id: String,

    #[arg(
        long = "sheets-token",
        env = "SLABSTOCK_SHEETS_TOKEN",
        value_name = "TOKEN",
        hide_env_values = true,
        help = "Bearer access token sent with every Sheets API call"
    )]
    pub sheets_token: String,

    #[arg(
        long = "sheets-url",
        env = "SLABSTOCK_SHEETS_URL",
        default_value = "https://sheets.googleapis.com",
        value_name = "URL",
        help = "Base URL of the Sheets API"
    )]
    pub sheets_url: url::Url,

    #[arg(
        long = "listen",
        env = "SLABSTOCK_LISTEN",
        default_value = "127.0.0.1:8080",
        value_name = "ADDR",
        help = "HTTP listen address (host:port)"
    )]
    pub listen: std::net::SocketAddr,

    #[arg(
        long = "layout",
        env = "SLABSTOCK_LAYOUT",
        default_value = "standard",
        value_name = "NAME",
        help = "Data sheet column layout (standard | extended)"
    )]
    pub layout: String,

    #[arg(
        long = "session-ttl-secs",
        env = "SLABSTOCK_SESSION_TTL_SECS",
        default_value_t = 86_400u64,
        value_name = "SECS",
        help = "Seconds before a login session expires"
    )]
    pub session_ttl_secs: u64,

    #[arg(
        long = "log-file",
        env = "SLABSTOCK_LOG_FILE",
        value_name = "PATH",
        help = "Write logs to PATH (in addition to stderr)"
    )]
    pub log_file: Option<String>,
}

pub fn parse() -> Cli {
    let dotenv_path = env::var("DOTENV_PATH").unwrap_or(".env".into());
    dotenvy::from_filename(&dotenv_path).ok();

    Cli::parse()
}
