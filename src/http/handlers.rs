//! Request handlers.
//!
//! Each request loads the live settings snapshot once and renders from it,
//! so a reload in flight never produces a page mixing old and new values.

use std::collections::HashMap;
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use crate::config::schema::APP_VER;
use crate::http::locale;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Values every page template receives.
#[derive(Debug, Serialize)]
pub struct PageContext {
    pub app_name: String,
    pub app_ver: &'static str,
    pub app_logo: String,
    pub app_url: String,
    pub is_pro_mode: bool,
    pub langs: Vec<String>,
    /// Language chosen for this request.
    pub lang: String,
    /// Snapshot generation the page was rendered from.
    pub generation: u64,
}

/// Page data for the landing page.
///
/// A `?lang=` choice is stored in the cookie and answered with a redirect to
/// the bare path, so the query never sticks in the address bar.
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    metrics::record_request("/");
    let snapshot = state.settings.current();

    let choice = locale::resolve_lang(
        params.get("lang").map(String::as_str),
        locale::cookie(&headers, locale::LANG_COOKIE),
        headers.get(header::ACCEPT_LANGUAGE).and_then(|v| v.to_str().ok()),
        &snapshot.langs,
    );

    let mut response = if choice.redirect {
        let location = HeaderValue::from_str(uri.path())
            .unwrap_or_else(|_| HeaderValue::from_static("/"));
        (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
    } else {
        Json(PageContext {
            app_name: snapshot.app_name.clone(),
            app_ver: APP_VER,
            app_logo: snapshot.app_logo.clone(),
            app_url: snapshot.app_url.clone(),
            is_pro_mode: snapshot.is_pro_mode,
            langs: snapshot.langs.clone(),
            lang: choice.lang.clone(),
            generation: snapshot.generation,
        })
        .into_response()
    };

    if choice.set_cookie {
        if let Some(cookie) = locale::lang_cookie(&choice.lang) {
            response.headers_mut().append(header::SET_COOKIE, cookie);
        }
    }
    response
}

/// Full live snapshot; only exposed outside pro mode.
pub async fn settings(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    metrics::record_request("/settings");
    let settings = state.settings.current();
    if settings.is_pro_mode {
        return Err(StatusCode::NOT_FOUND);
    }
    serde_json::to_value(&*settings)
        .map(Json)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

pub async fn health() -> &'static str {
    "ok"
}
