use std::sync::Arc;

use passgate_core::auth::AuthService;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Register / login / refresh / validate flows over the credential store.
    pub auth: Arc<AuthService>,
}
