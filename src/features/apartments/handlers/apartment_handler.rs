use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use minijinja::context;
use std::sync::Arc;

use crate::core::error::Result;
use crate::core::session::Session;
use crate::features::apartments::models::ApartmentDirectory;
use crate::shared::templates::TemplateEngine;

/// State for apartment handlers
#[derive(Clone)]
pub struct ApartmentState {
    pub apartments: Arc<ApartmentDirectory>,
    pub templates: Arc<TemplateEngine>,
}

/// Apartment picker
pub async fn list_apartments(
    session: Session,
    State(state): State<ApartmentState>,
) -> Result<Response> {
    let flashes = session.take_flashes().await;
    let page = state.templates.render(
        "index.html",
        context! {
            flashes => flashes,
            apartments => state.apartments.all(),
        },
    )?;
    Ok(page.into_response())
}
