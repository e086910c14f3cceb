mod wiring;

use std::path::Path;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::{cli, configuration::Configuration, rest};

pub struct App {
    pub config: Configuration,
}

impl App {
    pub fn from_cli() -> Self {
        let cli = cli::parse();
        let config = Configuration::from_cli(&cli);

        crate::tracing::init(config.log_file.as_deref().map(Path::new));
        log::info!("🚀 Starting slabstock");
        log::info!("📄 Spreadsheet: {}", config.spreadsheet_id);
        log::info!("🧭 Sheets API: {}", config.sheets_url);
        log::info!("🗂 Data range: {}", config.layout.range());

        Self { config }
    }
}

pub async fn run_daemon(app: App) -> Result<()> {
    log::info!("🌐 REST API: http://{}", app.config.listen);
    if let Some(path) = app.config.log_file.as_deref() {
        log::info!("📝 Log file: {}", path);
    }

    let shutdown = CancellationToken::new();
    let state = wiring::build_state(&app.config);
    let addr = app.config.listen;
    let rest_shutdown = shutdown.clone();

    let mut rest_handle = tokio::spawn(async move {
        if let Err(e) = rest::serve(addr, state, rest_shutdown).await {
            log::error!("REST server error: {}", e);
        }
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            log::info!("🧨 Ctrl-C received, shutting down");
            shutdown.cancel();
            rest_handle.await?;
        }
        result = &mut rest_handle => {
            result?;
        }
    }

    log::info!("✅ Shutdown complete");
    Ok(())
}

pub async fn run() -> Result<()> {
    let app = App::from_cli();
    run_daemon(app).await
}
