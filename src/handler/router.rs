//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method validation,
//! route matching, and dispatching.

use crate::api;
use crate::config::AppState;
use crate::handler::{index, static_files};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Liveness probe path
pub const HEALTH_PATH: &str = "/healthz";

/// Request information needed for routing, detached from the body
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub if_none_match: Option<String>,
    pub content_length: Option<String>,
}

impl RequestContext {
    pub fn from_request<B>(req: &Request<B>) -> Self {
        Self {
            method: req.method().clone(),
            path: req.uri().path().to_string(),
            query: req.uri().query().map(ToString::to_string),
            if_none_match: header_string(req, "if-none-match"),
            content_length: header_string(req, "content-length"),
        }
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let ctx = RequestContext::from_request(&req);

    let response = dispatch(&ctx, &state).await;

    if state.access_log() {
        let mut entry = AccessLogEntry::new(
            peer_addr.ip().to_string(),
            ctx.method.to_string(),
            ctx.path.clone(),
        );
        entry.query.clone_from(&ctx.query);
        entry.http_version = version_label(req.version()).to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = usize::try_from(response.body().size_hint().lower()).unwrap_or(0);
        entry.referer = header_string(&req, "referer");
        entry.user_agent = header_string(&req, "user-agent");
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Route a request and stamp the common response headers
pub async fn dispatch(ctx: &RequestContext, state: &Arc<AppState>) -> Response<Full<Bytes>> {
    let http_cfg = &state.config.http;
    let response = route_request(ctx, state).await;
    http::finalize_response(
        response,
        &http_cfg.server_name,
        http_cfg.enable_cors,
        ctx.method == Method::HEAD,
    )
}

async fn route_request(ctx: &RequestContext, state: &Arc<AppState>) -> Response<Full<Bytes>> {
    // 1. Check HTTP method
    if let Some(resp) = check_http_method(&ctx.method, state.config.http.enable_cors) {
        return resp;
    }

    // 2. Check body size
    let max_body_size = state.config.http.max_body_size;
    if let Some(resp) = check_body_size(ctx.content_length.as_deref(), max_body_size) {
        return resp;
    }

    let path = ctx.path.as_str();
    let dashboard = &state.config.dashboard;

    // 3. Health check, dashboard page, API, static assets
    if path == HEALTH_PATH {
        return http::build_health_response("ok");
    }
    if path == "/" {
        return index::serve_index(&state.config).await;
    }
    if path.starts_with(api::API_PREFIX) {
        return api::handle_api(path, ctx.query.as_deref(), Arc::clone(state)).await;
    }
    if is_under_prefix(path, &dashboard.static_prefix) {
        return static_files::serve_static(ctx, &dashboard.static_dir, &dashboard.static_prefix)
            .await;
    }

    http::build_404_response()
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(
    content_length: Option<&str>,
    max_body_size: u64,
) -> Option<Response<Full<Bytes>>> {
    let size_str = content_length?;
    match size_str.trim().parse::<u64>() {
        Ok(size) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Some(http::build_413_response())
        }
        Err(_) => {
            logger::log_warning(&format!(
                "Invalid Content-Length value: '{size_str}', skipping size check"
            ));
            None
        }
        _ => None,
    }
}

/// `/static/app.js` is under `/static`; `/staticfoo` is not
fn is_under_prefix(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.starts_with('/'))
}

fn header_string<B>(req: &Request<B>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

const fn version_label(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_09 => "0.9",
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        hyper::Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{body_bytes, body_json, feed_database, test_state};
    use hyper::StatusCode;

    fn get(path_and_query: &str) -> RequestContext {
        let req = Request::builder()
            .uri(path_and_query)
            .body(())
            .unwrap();
        RequestContext::from_request(&req)
    }

    fn dashboard_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("index.html"),
            "<p data-ms=\"%REFRESH_MS%\">%DB_PATH%</p>",
        )
        .unwrap();
        std::fs::write(dir.path().join("style.css"), "body{}").unwrap();
        dir
    }

    #[test]
    fn test_context_from_request() {
        let req = Request::builder()
            .method(Method::HEAD)
            .uri("/api/rows/feed?limit=5")
            .header("If-None-Match", "\"abc\"")
            .body(())
            .unwrap();
        let ctx = RequestContext::from_request(&req);
        assert_eq!(ctx.path, "/api/rows/feed");
        assert_eq!(ctx.query.as_deref(), Some("limit=5"));
        assert_eq!(ctx.if_none_match.as_deref(), Some("\"abc\""));
    }

    #[test]
    fn test_is_under_prefix() {
        assert!(is_under_prefix("/static/app.js", "/static"));
        assert!(is_under_prefix("/static/app.js", "/static/"));
        assert!(!is_under_prefix("/staticfoo", "/static"));
        assert!(!is_under_prefix("/static", "/static"));
    }

    #[tokio::test]
    async fn test_index_page_is_rendered() {
        let (_db_dir, db_path) = feed_database("");
        let assets = dashboard_dir();
        let state = test_state(&db_path, &assets.path().to_string_lossy());

        let resp = dispatch(&get("/"), &state).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["Server"], "rowwatch");
        let body = String::from_utf8(body_bytes(resp).await.to_vec()).unwrap();
        assert!(body.starts_with("<p data-ms=\"2000\">"));
        assert!(body.contains(&db_path.to_string_lossy().into_owned()));
    }

    #[tokio::test]
    async fn test_static_asset_and_unknown_path() {
        let (_db_dir, db_path) = feed_database("");
        let assets = dashboard_dir();
        let state = test_state(&db_path, &assets.path().to_string_lossy());

        let resp = dispatch(&get("/static/style.css"), &state).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(&body_bytes(resp).await[..], b"body{}");

        let resp = dispatch(&get("/nowhere"), &state).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_api_end_to_end_with_cors() {
        let (_db_dir, db_path) = feed_database(
            "CREATE TABLE feed (id INTEGER PRIMARY KEY, content TEXT, created_at TEXT);
             INSERT INTO feed VALUES (1, 'first', NULL), (2, 'second', NULL);",
        );
        let state = test_state(&db_path, "static");

        let resp = dispatch(&get("/api/rows/feed?since_id=1"), &state).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["Access-Control-Allow-Origin"], "*");
        assert_eq!(resp.headers()["Cache-Control"], "no-store");
        let body = body_json(resp).await;
        assert_eq!(body["rows"][0]["content"], "second");
        assert_eq!(body["rows"].as_array().unwrap().len(), 1);
        assert_eq!(body["meta"]["limit"], 200);
    }

    #[tokio::test]
    async fn test_method_checks() {
        let (_db_dir, db_path) = feed_database("");
        let state = test_state(&db_path, "static");

        let mut ctx = get("/api/tables");
        ctx.method = Method::POST;
        assert_eq!(
            dispatch(&ctx, &state).await.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );

        ctx.method = Method::OPTIONS;
        assert_eq!(dispatch(&ctx, &state).await.status(), StatusCode::NO_CONTENT);

        ctx.method = Method::HEAD;
        let resp = dispatch(&ctx, &state).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_bytes(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let (_db_dir, db_path) = feed_database("");
        let state = test_state(&db_path, "static");
        let mut ctx = get("/api/tables");
        ctx.content_length = Some("2000000".to_string());
        assert_eq!(
            dispatch(&ctx, &state).await.status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[tokio::test]
    async fn test_health() {
        let (_db_dir, db_path) = feed_database("");
        let resp = dispatch(&get(HEALTH_PATH), &test_state(&db_path, "static")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(&body_bytes(resp).await[..], b"ok");
    }
}
