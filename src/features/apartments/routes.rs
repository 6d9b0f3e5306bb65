use axum::{routing::get, Router};

use crate::features::apartments::handlers::{self, ApartmentState};

/// Create routes for the apartments feature
pub fn routes(state: ApartmentState) -> Router {
    Router::new()
        .route("/", get(handlers::list_apartments))
        .with_state(state)
}
