use std::net::SocketAddr;
use std::sync::Arc;
use std::time::SystemTime;

use axum::{
    routing::{get, post},
    Router,
};

use crate::auth::{PasswordHasher, SessionStore};
use crate::records::RecordSource;
use crate::sheets::SheetsApi;
use crate::users::UserRepository;

mod handlers;
mod models;

use handlers::{health, login, logout, me, not_found, register, search};

pub struct AppState<S> {
    pub records: Arc<RecordSource<S>>,
    pub users: Arc<UserRepository<S>>,
    pub sessions: SessionStore,
    pub hasher: Arc<dyn PasswordHasher>,
    pub started_at: SystemTime,
}

// Manual impl: S itself need not be Clone, everything is shared.
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            records: self.records.clone(),
            users: self.users.clone(),
            sessions: self.sessions.clone(),
            hasher: self.hasher.clone(),
            started_at: self.started_at,
        }
    }
}

pub fn router<S: SheetsApi + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/api/health", get(health::<S>))
        .route("/api/register", post(register::<S>))
        .route("/api/login", post(login::<S>))
        .route("/api/logout", post(logout::<S>))
        .route("/api/user", get(me::<S>))
        .route("/api/search", get(search::<S>))
        .fallback(not_found)
        .with_state(state)
}

pub async fn serve<S: SheetsApi + 'static>(
    addr: SocketAddr,
    state: AppState<S>,
    shutdown: tokio_util::sync::CancellationToken,
) -> anyhow::Result<()> {
    log::info!("🌐 REST service on http://{}", addr);

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            log::info!("🛑 REST shutdown requested");
        })
        .await?;
    log::info!("👋 REST server exited");
    Ok(())
}
