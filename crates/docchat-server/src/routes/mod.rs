pub mod chat;
pub mod health;
pub mod pagination;

use axum::Router;

use crate::state::AppState;

pub fn configure(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .nest("/api", chat::routes(state))
}
