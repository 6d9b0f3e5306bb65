use axum::{
    extract::{Multipart, Path, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use minijinja::context;
use tracing::{debug, error, warn};

use super::{
    dashboard_url, missing_details, missing_draft, step_url, unknown_apartment, ReportState,
};
use crate::core::error::{AppError, Result};
use crate::core::session::Session;
use crate::features::apartments::models::Apartment;
use crate::features::reports::dtos::{Step1Form, Step2Form};
use crate::features::reports::models::{IssueType, Priority, ReportDraft};
use crate::features::reports::services::IncomingPhoto;
use crate::shared::constants::{
    MSG_FILL_ALL_FIELDS, MSG_FILL_REQUIRED_FIELDS, MSG_SUBMIT_FAILED, MSG_UPLOAD_FAILED, ROOMS,
};
use crate::shared::types::FlashLevel;

/// Multipart field carrying the optional photo
const PHOTO_FIELD: &str = "photo";

fn issue_type_names() -> Vec<&'static str> {
    IssueType::ALL.iter().map(|t| t.as_str()).collect()
}

fn priority_names() -> Vec<&'static str> {
    Priority::ALL.iter().map(|p| p.as_str()).collect()
}

async fn render_step1(
    state: &ReportState,
    session: &Session,
    apartment: &Apartment,
    form: &Step1Form,
    error: Option<&str>,
) -> Result<Response> {
    state
        .render(
            session,
            "report_step1.html",
            context! {
                apartment => apartment,
                rooms => ROOMS,
                issue_types => issue_type_names(),
                room => form.room,
                issue_type => form.issue_type,
                error => error,
            },
        )
        .await
}

async fn render_step2(
    state: &ReportState,
    session: &Session,
    apartment: &Apartment,
    draft: &ReportDraft,
    form: &Step2Form,
    error: Option<&str>,
) -> Result<Response> {
    state
        .render(
            session,
            "report_step2.html",
            context! {
                apartment => apartment,
                draft => draft,
                priorities => priority_names(),
                item => form.item,
                description => form.description,
                priority => form.priority,
                error => error,
            },
        )
        .await
}

/// Step 1: room and issue type
pub async fn step1_page(
    session: Session,
    State(state): State<ReportState>,
    Path(apt_id): Path<String>,
) -> Result<Response> {
    let Some(apartment) = state.apartments.get(&apt_id).cloned() else {
        return Ok(unknown_apartment(&session).await);
    };

    render_step1(&state, &session, &apartment, &Step1Form::default(), None).await
}

pub async fn step1_submit(
    session: Session,
    State(state): State<ReportState>,
    Path(apt_id): Path<String>,
    Form(form): Form<Step1Form>,
) -> Result<Response> {
    let Some(apartment) = state.apartments.get(&apt_id).cloned() else {
        return Ok(unknown_apartment(&session).await);
    };

    let Some((room, issue_type)) = form.parse() else {
        debug!("Step 1 rejected for apartment {}: missing fields", apt_id);
        return render_step1(&state, &session, &apartment, &form, Some(MSG_FILL_ALL_FIELDS)).await;
    };

    // A new step 1 always discards whatever draft was in progress
    session
        .set_draft(ReportDraft::start(&apt_id, &room, issue_type))
        .await;

    Ok(Redirect::to(&step_url(&apt_id, 2)).into_response())
}

/// Step 2: item, description and priority
pub async fn step2_page(
    session: Session,
    State(state): State<ReportState>,
    Path(apt_id): Path<String>,
) -> Result<Response> {
    let Some(apartment) = state.apartments.get(&apt_id).cloned() else {
        return Ok(unknown_apartment(&session).await);
    };
    let Some(draft) = session.draft().await.filter(|d| d.belongs_to(&apt_id)) else {
        return Ok(missing_draft(&session, &apt_id).await);
    };

    let form = match &draft.details {
        Some(details) => Step2Form {
            item: details.item.clone(),
            description: details.description.clone(),
            priority: details.priority.as_str().to_string(),
        },
        None => Step2Form {
            priority: Priority::default().as_str().to_string(),
            ..Step2Form::default()
        },
    };

    render_step2(&state, &session, &apartment, &draft, &form, None).await
}

pub async fn step2_submit(
    session: Session,
    State(state): State<ReportState>,
    Path(apt_id): Path<String>,
    Form(form): Form<Step2Form>,
) -> Result<Response> {
    let Some(apartment) = state.apartments.get(&apt_id).cloned() else {
        return Ok(unknown_apartment(&session).await);
    };
    let Some(mut draft) = session.draft().await.filter(|d| d.belongs_to(&apt_id)) else {
        return Ok(missing_draft(&session, &apt_id).await);
    };

    let Some(values) = form.parse() else {
        debug!("Step 2 rejected for apartment {}: missing fields", apt_id);
        return render_step2(
            &state,
            &session,
            &apartment,
            &draft,
            &form,
            Some(MSG_FILL_REQUIRED_FIELDS),
        )
        .await;
    };

    draft.set_details(&values.item, &values.description, values.priority);
    session.set_draft(draft).await;

    Ok(Redirect::to(&step_url(&apt_id, 3)).into_response())
}

/// Step 3: optional photo, then submit
pub async fn step3_page(
    session: Session,
    State(state): State<ReportState>,
    Path(apt_id): Path<String>,
) -> Result<Response> {
    let Some(apartment) = state.apartments.get(&apt_id).cloned() else {
        return Ok(unknown_apartment(&session).await);
    };
    let Some(draft) = session.draft().await.filter(|d| d.belongs_to(&apt_id)) else {
        return Ok(missing_draft(&session, &apt_id).await);
    };
    if !draft.is_complete() {
        return Ok(missing_details(&session, &apt_id).await);
    }

    state
        .render(
            &session,
            "report_step3.html",
            context! { apartment => apartment, draft => draft },
        )
        .await
}

/// Accepts multipart/form-data with an optional `photo` file part
pub async fn step3_submit(
    session: Session,
    State(state): State<ReportState>,
    Path(apt_id): Path<String>,
    multipart: Multipart,
) -> Result<Response> {
    if !state.apartments.contains(&apt_id) {
        return Ok(unknown_apartment(&session).await);
    }
    let Some(draft) = session.draft().await.filter(|d| d.belongs_to(&apt_id)) else {
        return Ok(missing_draft(&session, &apt_id).await);
    };
    if !draft.is_complete() {
        return Ok(missing_details(&session, &apt_id).await);
    }

    // An unreadable or oversized upload keeps the draft for another try
    let photo = match read_photo(multipart).await {
        Ok(photo) => photo,
        Err(e) => {
            warn!("Photo upload rejected for apartment {}: {}", apt_id, e);
            session.flash(FlashLevel::Error, MSG_UPLOAD_FAILED).await;
            return Ok(Redirect::to(&step_url(&apt_id, 3)).into_response());
        }
    };

    match state.report_service.submit(draft, photo).await {
        Ok(report) => {
            session.clear_draft().await;
            session
                .flash(
                    FlashLevel::Success,
                    format!("Report #{} submitted successfully", report.id),
                )
                .await;
            Ok(Redirect::to(&dashboard_url(&apt_id)).into_response())
        }
        Err(e) => {
            // The draft stays in the session so the tenant can retry
            error!("Failed to save report for apartment {}: {}", apt_id, e);
            session.flash(FlashLevel::Error, MSG_SUBMIT_FAILED).await;
            Ok(Redirect::to(&step_url(&apt_id, 3)).into_response())
        }
    }
}

/// Pull the photo part out of the form, ignoring parts without a filename
async fn read_photo(mut multipart: Multipart) -> Result<Option<IncomingPhoto>> {
    let mut photo = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        if field.name() != Some(PHOTO_FIELD) {
            debug!("Ignoring unknown field: {:?}", field.name());
            continue;
        }

        let original_name = field.file_name().unwrap_or_default().to_string();
        if original_name.is_empty() {
            continue;
        }
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        let data = field.bytes().await.map_err(|e| {
            debug!("Failed to read photo bytes: {}", e);
            AppError::BadRequest(format!("Failed to read photo data: {}", e))
        })?;

        photo = Some(IncomingPhoto {
            original_name,
            content_type,
            data: data.to_vec(),
        });
    }

    Ok(photo)
}
