//! Responses the cache layer synthesizes when neither network nor cache can
//! answer.

use axum::body::Bytes;
use axum::http::{header, HeaderValue, Response, StatusCode};

/// Self-contained offline page: inline styles only, no external requests.
pub const OFFLINE_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Offline</title>
<style>
body { font-family: system-ui, sans-serif; display: flex; align-items: center; justify-content: center; min-height: 100vh; margin: 0; background: #f5f5f5; color: #333; }
main { text-align: center; padding: 2rem; }
button { margin-top: 1rem; padding: 0.6rem 1.4rem; border: 0; border-radius: 4px; background: #6c3fc5; color: #fff; font-size: 1rem; cursor: pointer; }
</style>
</head>
<body>
<main>
<h1>You are offline</h1>
<p>This demo is not available right now. Check your connection and try again.</p>
<button type="button" onclick="location.reload()">Try again</button>
</main>
</body>
</html>
"#;

/// The offline fallback for demo documents.
pub fn offline_page() -> Response<Bytes> {
    build(
        StatusCode::SERVICE_UNAVAILABLE,
        "text/html; charset=utf-8",
        Bytes::from_static(OFFLINE_PAGE.as_bytes()),
    )
}

/// Minimal answer for static or dynamic resources with nothing cached.
pub fn unavailable() -> Response<Bytes> {
    build(
        StatusCode::SERVICE_UNAVAILABLE,
        "text/plain; charset=utf-8",
        Bytes::from_static(b"Offline"),
    )
}

fn build(status: StatusCode, content_type: &'static str, body: Bytes) -> Response<Bytes> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}
