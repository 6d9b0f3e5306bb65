use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::features::reports::handlers::{self, ReportState};

/// Create routes for the reports feature
///
/// `photo_body_limit` caps the multipart upload of the last wizard step
pub fn routes(state: ReportState, photo_body_limit: usize) -> Router {
    Router::new()
        .route("/apartment/{apt_id}", get(handlers::apartment_dashboard))
        .route(
            "/apartment/{apt_id}/report/new/step1",
            get(handlers::step1_page).post(handlers::step1_submit),
        )
        .route(
            "/apartment/{apt_id}/report/new/step2",
            get(handlers::step2_page).post(handlers::step2_submit),
        )
        .route(
            "/apartment/{apt_id}/report/new/step3",
            get(handlers::step3_page)
                .post(handlers::step3_submit)
                .layer(DefaultBodyLimit::max(photo_body_limit)),
        )
        .route(
            "/apartment/{apt_id}/report/{id}/set_status",
            post(handlers::set_status),
        )
        .route("/all_reports", get(handlers::all_reports))
        .route("/report/{id}/status", post(handlers::update_report_status))
        .with_state(state)
}
