//! Helpers for driving the full router in tests

use crate::core::middleware::session_middleware;
use crate::core::session::SessionStore;
use crate::features::apartments::{
    models::ApartmentDirectory, routes as apartment_routes, ApartmentState,
};
use crate::features::reports::{routes as report_routes, ReportService, ReportState};
use crate::modules::storage::{JsonFileStore, LocalPhotoStore, ReportStore};
use crate::shared::constants::APARTMENTS;
use crate::shared::templates::TemplateEngine;

use axum::{
    body::Body,
    http::{header, Request},
    response::Response,
    Router,
};
use std::sync::Arc;
use tower::ServiceExt;

pub const MULTIPART_BOUNDARY: &str = "apt-test-boundary";

pub fn with_sessions(router: Router, store: Arc<SessionStore>) -> Router {
    router.route_layer(axum::middleware::from_fn_with_state(store, session_middleware))
}

/// `name=value` part of a `Set-Cookie` header, if the response set one
pub fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_string())
}

pub fn location(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Build a multipart/form-data body; parts are `(name, filename, content)`
pub fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, content) in parts {
        body.extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
        match filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: image/jpeg\r\n\r\n",
                    name, filename
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
            ),
        }
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());
    body
}

/// Full application router over a file store in a temp directory, with a
/// single browser's cookie jar
pub struct TestApp {
    router: Router,
    cookie: Option<String>,
    pub store: Arc<JsonFileStore>,
    pub dir: tempfile::TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_photo_limit(16 * 1024 * 1024)
    }

    /// Same as [`TestApp::new`] with a custom cap on the step 3 upload body
    pub fn with_photo_limit(photo_body_limit: usize) -> Self {
        let dir = tempfile::TempDir::new().unwrap();
        let apartments = Arc::new(ApartmentDirectory::from_roster(APARTMENTS));
        let templates = Arc::new(TemplateEngine::new().unwrap());
        let store = Arc::new(JsonFileStore::new(
            dir.path().join("reports.json"),
            (*apartments).clone(),
        ));
        let photos = Arc::new(LocalPhotoStore::new(dir.path().join("uploads")));
        let report_service = Arc::new(ReportService::new(
            Arc::clone(&store) as Arc<dyn ReportStore>,
            photos,
        ));

        let router = Router::new()
            .merge(apartment_routes::routes(ApartmentState {
                apartments: Arc::clone(&apartments),
                templates: Arc::clone(&templates),
            }))
            .merge(report_routes::routes(
                ReportState {
                    report_service,
                    apartments,
                    templates,
                },
                photo_body_limit,
            ));
        let sessions = Arc::new(SessionStore::new(std::time::Duration::from_secs(3600), false));

        Self {
            router: with_sessions(router, sessions),
            cookie: None,
            store,
            dir,
        }
    }

    pub async fn send(&mut self, mut request: Request<Body>) -> Response {
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }
        let response = self.router.clone().oneshot(request).await.unwrap();
        if let Some(cookie) = session_cookie(&response) {
            self.cookie = Some(cookie);
        }
        response
    }

    pub async fn get(&mut self, uri: &str) -> Response {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_form(&mut self, uri: &str, form: &str) -> Response {
        self.send(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn post_multipart(&mut self, uri: &str, body: Vec<u8>) -> Response {
        self.send(
            Request::post(uri)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }
}
