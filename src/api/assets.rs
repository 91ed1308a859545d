//! Embedded widget assets
//!
//! In development, falls back to serving from filesystem.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
};
use rust_embed::Embed;
use std::path::PathBuf;

#[derive(Embed)]
#[folder = "ui"]
struct Assets;

/// Serve embedded static files, with filesystem fallback for development
pub async fn serve_static(req: Request<Body>) -> Response {
    let path = req.uri().path().trim_start_matches('/');
    let path = path.strip_prefix("assets/").unwrap_or(path);

    match read_asset(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime.as_ref().to_string())], content).into_response()
        }
        None => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

/// Get the index.html content (embedded or from filesystem)
pub fn get_index_html() -> Option<String> {
    read_asset("index.html").and_then(|bytes| String::from_utf8(bytes).ok())
}

fn read_asset(path: &str) -> Option<Vec<u8>> {
    if path.is_empty() || path.split('/').any(|part| part == "..") {
        return None;
    }

    // Try embedded assets first
    if let Some(content) = Assets::get(path) {
        return Some(content.data.to_vec());
    }

    // Fallback to filesystem
    let fs_path = PathBuf::from("ui").join(path);
    std::fs::read(fs_path).ok()
}
