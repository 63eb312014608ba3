//! HTML pages: the upload form and the upload result.
//!
//! Both extend `templates/base.html`; askama escapes every interpolated value.

use askama::Template;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use loginwall_core::{Config, PublicReference};

use super::AppState;

/// Upload form page.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    stylesheet: String,
    action: String,
    field: String,
}

impl IndexPage {
    pub fn new(config: &Config) -> Self {
        Self {
            stylesheet: stylesheet(config),
            action: config.route("/upload"),
            field: config.upload.field_name.clone(),
        }
    }
}

/// Result page linking the stored object.
#[derive(Template)]
#[template(path = "upload_result.html")]
pub struct UploadResultPage {
    stylesheet: String,
    url: String,
}

impl UploadResultPage {
    pub fn new(config: &Config, reference: &PublicReference) -> Self {
        Self {
            stylesheet: stylesheet(config),
            url: reference.as_str().to_string(),
        }
    }
}

fn stylesheet(config: &Config) -> String {
    config.route("/css/style.css")
}

/// Render a template, logging and answering 500 if rendering fails.
pub fn render_template<T: Template>(template: T) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Template rendering failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Template rendering error").into_response()
        }
    }
}

/// `GET /` and `GET {prefix}`.
pub async fn index(State(state): State<AppState>) -> Response {
    render_template(IndexPage::new(&state.config))
}
