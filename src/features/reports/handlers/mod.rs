mod dashboard_handler;
mod wizard_handler;

pub use dashboard_handler::*;
pub use wizard_handler::*;

use axum::response::{IntoResponse, Redirect, Response};
use minijinja::{context, Value};
use std::sync::Arc;

use crate::core::error::Result;
use crate::core::session::Session;
use crate::features::apartments::models::ApartmentDirectory;
use crate::features::reports::services::ReportService;
use crate::shared::constants::{MSG_DETAILS_MISSING, MSG_DRAFT_MISSING, MSG_UNKNOWN_APARTMENT};
use crate::shared::templates::TemplateEngine;
use crate::shared::types::FlashLevel;

/// State for report handlers
#[derive(Clone)]
pub struct ReportState {
    pub report_service: Arc<ReportService>,
    pub apartments: Arc<ApartmentDirectory>,
    pub templates: Arc<TemplateEngine>,
}

impl ReportState {
    /// Render a page, handing it the session's pending flash messages
    async fn render(&self, session: &Session, template: &str, ctx: Value) -> Result<Response> {
        let flashes = session.take_flashes().await;
        let page = self
            .templates
            .render(template, context! { flashes => flashes, ..ctx })?;
        Ok(page.into_response())
    }
}

pub(crate) fn dashboard_url(apartment_id: &str) -> String {
    format!("/apartment/{}", apartment_id)
}

pub(crate) fn step_url(apartment_id: &str, step: u8) -> String {
    format!("/apartment/{}/report/new/step{}", apartment_id, step)
}

/// Flash and bounce back to the apartment picker
async fn unknown_apartment(session: &Session) -> Response {
    session.flash(FlashLevel::Error, MSG_UNKNOWN_APARTMENT).await;
    Redirect::to("/").into_response()
}

/// Flash and restart the wizard
async fn missing_draft(session: &Session, apartment_id: &str) -> Response {
    session.flash(FlashLevel::Error, MSG_DRAFT_MISSING).await;
    Redirect::to(&step_url(apartment_id, 1)).into_response()
}

/// Flash and send the tenant back to the details step
async fn missing_details(session: &Session, apartment_id: &str) -> Response {
    session.flash(FlashLevel::Error, MSG_DETAILS_MISSING).await;
    Redirect::to(&step_url(apartment_id, 2)).into_response()
}
