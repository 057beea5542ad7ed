//! HTML Pages
//!
//! Dashboard, login and device-detail shells. The pages carry no device data;
//! the browser fetches everything from the JSON API.

use super::api::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use rust_embed::Embed;

/// Embedded page templates
#[derive(Embed)]
#[folder = "src/dashboard/templates/"]
struct Templates;

/// Placeholder replaced with the (escaped) device id in device.html
const DEVICE_ID_SLOT: &str = "{{device_id}}";

const NOT_FOUND_PAGE: &str =
    "<!DOCTYPE html><html><head><title>Not Found</title></head><body><h1>Not Found</h1></body></html>";

const ERROR_PAGE: &str =
    "<!DOCTYPE html><html><head><title>Error</title></head><body><h1>Internal Server Error</h1></body></html>";

/// Escape text for use inside HTML content or a quoted attribute
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn template(name: &str) -> Option<String> {
    Templates::get(name).map(|file| String::from_utf8_lossy(&file.data).into_owned())
}

fn render(name: &str) -> Response {
    match template(name) {
        Some(html) => Html(html).into_response(),
        None => {
            tracing::error!("Missing embedded template {}", name);
            (StatusCode::INTERNAL_SERVER_ERROR, Html(ERROR_PAGE)).into_response()
        }
    }
}

fn to_login() -> Response {
    Redirect::to("/login").into_response()
}

/// GET /
pub async fn index_page(State(state): State<AppState>, jar: CookieJar) -> Response {
    if state.sessions.current(&jar).is_none() {
        return to_login();
    }
    render("dashboard.html")
}

/// GET /login
pub async fn login_page() -> Response {
    render("login.html")
}

/// GET /device/{id}
pub async fn device_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Response {
    if state.sessions.current(&jar).is_none() {
        return to_login();
    }

    let topology = match state.store.load().await {
        Ok(topology) => topology,
        Err(e) => {
            tracing::error!("Failed to load topology for device page: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, Html(ERROR_PAGE)).into_response();
        }
    };

    if topology.find_device(&id).is_none() {
        return (StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE)).into_response();
    }

    match template("device.html") {
        Some(html) => Html(html.replace(DEVICE_ID_SLOT, &escape_html(&id))).into_response(),
        None => render("device.html"),
    }
}
