mod app;
mod auth;
mod cli;
mod configuration;
mod error;
mod records;
mod rest;
mod sheets;
mod tracing;
mod users;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    app::run().await
}
