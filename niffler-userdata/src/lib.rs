//! Niffler user data service: user profiles and the friendship graph.

pub mod config;
pub mod error;
pub mod routes;
pub mod service;
pub mod store;

use std::net::TcpListener;
use std::sync::Arc;

pub use error::{Error, Result};
pub use service::{PhotoUpdate, ProfileUpdate, UserDataService};
pub use store::{IdentityStore, MemoryStore, SledStore};

/// Serves the user data API on an already bound listener until the server fails.
pub async fn serve(listener: TcpListener, store: Arc<dyn IdentityStore>) -> anyhow::Result<()> {
    let app = routes::router(routes::State::new(UserDataService::new(store)));
    axum::Server::from_tcp(listener)?
        .serve(app.into_make_service())
        .await?;
    Ok(())
}
