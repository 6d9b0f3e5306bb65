use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use minijinja::context;

use super::{dashboard_url, unknown_apartment, ReportState};
use crate::core::error::Result;
use crate::core::session::Session;
use crate::features::reports::dtos::{AllReportsQuery, ReportViewDto, StatusForm};
use crate::features::reports::models::ReportStatus;
use crate::shared::constants::{MSG_STATUS_FAILED, MSG_STATUS_UPDATED};
use crate::shared::types::FlashLevel;

fn status_names() -> Vec<&'static str> {
    ReportStatus::ALL.iter().map(|s| s.as_str()).collect()
}

/// Apply a status change and queue the matching flash
async fn change_status(state: &ReportState, session: &Session, report_id: i64, status: &str) {
    if state.report_service.update_status(report_id, status).await {
        session.flash(FlashLevel::Success, MSG_STATUS_UPDATED).await;
    } else {
        session.flash(FlashLevel::Error, MSG_STATUS_FAILED).await;
    }
}

/// Reports of one apartment, newest first
pub async fn apartment_dashboard(
    session: Session,
    State(state): State<ReportState>,
    Path(apt_id): Path<String>,
) -> Result<Response> {
    let Some(apartment) = state.apartments.get(&apt_id).cloned() else {
        return Ok(unknown_apartment(&session).await);
    };

    let reports = state.report_service.list_for_apartment(&apt_id).await?;

    state
        .render(
            &session,
            "dashboard.html",
            context! {
                apartment => apartment,
                reports => reports,
                statuses => status_names(),
            },
        )
        .await
}

/// Status change submitted from an apartment dashboard
pub async fn set_status(
    session: Session,
    State(state): State<ReportState>,
    Path((apt_id, report_id)): Path<(String, i64)>,
    Form(form): Form<StatusForm>,
) -> Result<Response> {
    if !state.apartments.contains(&apt_id) {
        return Ok(unknown_apartment(&session).await);
    }

    change_status(&state, &session, report_id, form.status.trim()).await;
    Ok(Redirect::to(&dashboard_url(&apt_id)).into_response())
}

/// Every apartment's reports, optionally filtered by status
pub async fn all_reports(
    session: Session,
    State(state): State<ReportState>,
    Query(query): Query<AllReportsQuery>,
) -> Result<Response> {
    let filter = query.filter();
    let reports: Vec<ReportViewDto> = state
        .report_service
        .list_all(filter)
        .await?
        .into_iter()
        .map(|report| ReportViewDto {
            apartment_name: state.apartments.name_of(&report.apartment_id),
            report,
        })
        .collect();

    state
        .render(
            &session,
            "all_reports.html",
            context! {
                reports => reports,
                statuses => status_names(),
                filter => filter.unwrap_or_default(),
            },
        )
        .await
}

/// Status change submitted from the all-reports view; keeps the active filter
pub async fn update_report_status(
    session: Session,
    State(state): State<ReportState>,
    Path(report_id): Path<i64>,
    Form(form): Form<StatusForm>,
) -> Result<Response> {
    change_status(&state, &session, report_id, form.status.trim()).await;

    let target = match form.filter.as_deref().map(str::trim) {
        Some(filter) if !filter.is_empty() => {
            format!("/all_reports?status={}", urlencoding::encode(filter))
        }
        _ => "/all_reports".to_string(),
    };
    Ok(Redirect::to(&target).into_response())
}
