pub mod domain;

use axum::Router;

use crate::adapters::http::app_state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/tenants/{tenant_id}/domain", domain::router())
}
