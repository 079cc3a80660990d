//! Chartview - serves a page listing the chart images found in a folder
//!
//! `GET /` renders every `.png`, `.jpg` and `.jpeg` file in the charts
//! directory; the files themselves are served under `/static/`.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use once_cell::sync::Lazy;
use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

/// Directory holding the chart images
/// Read from CHARTS_DIR environment variable
/// Default: static
pub static CHARTS_DIR: Lazy<String> = Lazy::new(|| env::var("CHARTS_DIR").unwrap_or_else(|_| "static".to_string()));

/// HTTP port for the gallery
/// Read from GALLERY_PORT environment variable
/// Default: 5001
pub static GALLERY_PORT: Lazy<u16> = Lazy::new(|| {
    env::var("GALLERY_PORT")
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(5001)
});

/// File name suffixes shown in the gallery (case-sensitive)
pub const IMAGE_EXTENSIONS: [&str; 3] = [".png", ".jpg", ".jpeg"];

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("Cannot read charts directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IntoResponse for GalleryError {
    fn into_response(self) -> Response {
        log::error!("{}", self);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html("<!DOCTYPE html><html><body><h1>Internal Server Error</h1></body></html>".to_string()),
        )
            .into_response()
    }
}

#[derive(Clone)]
struct GalleryState {
    charts_dir: Arc<PathBuf>,
}

/// Names of the chart images in `dir`, sorted.
///
/// A missing or unreadable directory is an error, not an empty gallery.
pub fn list_charts(dir: &Path) -> Result<Vec<String>, GalleryError> {
    let read_dir_error = |source: std::io::Error| GalleryError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut charts = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_dir_error)? {
        let entry = entry.map_err(read_dir_error)?;
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if IMAGE_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
            charts.push(name);
        }
    }

    charts.sort();
    Ok(charts)
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

pub fn render_index(charts: &[String]) -> String {
    let items: String = charts
        .iter()
        .map(|name| {
            format!(
                r#"<figure><img src="/static/{src}" alt="{alt}" loading="lazy"><figcaption>{alt}</figcaption></figure>
"#,
                src = urlencoding::encode(name),
                alt = html_escape(name),
            )
        })
        .collect();

    let content = if charts.is_empty() {
        "<p>No charts found.</p>".to_string()
    } else {
        items
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Charts</title>
<style>
body{{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',sans-serif;max-width:1100px;margin:24px auto;padding:0 16px}}
figure{{margin:0 0 32px}}
img{{max-width:100%;border:1px solid #ddd;border-radius:8px}}
figcaption{{color:#666;font-size:.9rem;margin-top:4px}}
</style>
</head>
<body>
<h1>Charts</h1>
{content}
</body>
</html>"#
    )
}

/// GET / — lists the charts on every request.
async fn index_handler(State(state): State<GalleryState>) -> Result<Html<String>, GalleryError> {
    let charts = list_charts(&state.charts_dir)?;
    Ok(Html(render_index(&charts)))
}

/// GET /health — simple health check.
async fn health_handler() -> &'static str {
    "ok"
}

/// Build the gallery router for `charts_dir`.
pub fn router(charts_dir: impl Into<PathBuf>) -> Router {
    let charts_dir = charts_dir.into();
    let state = GalleryState {
        charts_dir: Arc::new(charts_dir.clone()),
    };

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .nest_service("/static", ServeDir::new(charts_dir))
        .with_state(state)
}

/// Start the gallery server and run until it fails.
pub async fn start_gallery_server(port: u16, charts_dir: PathBuf) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    log::info!("Starting chart gallery on http://{}", addr);
    log::info!("  /         - Chart list from {}", charts_dir.display());
    log::info!("  /static/  - Chart files");
    log::info!("  /health   - Health check");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, router(charts_dir)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tower::ServiceExt;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"img").unwrap();
    }

    #[test]
    fn test_list_charts_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.jpeg", "c.jpg", "notes.txt", "upper.PNG", "archive.png.bak"] {
            touch(dir.path(), name);
        }

        let charts = list_charts(dir.path()).unwrap();

        assert_eq!(charts, vec!["a.jpeg", "b.png", "c.jpg"]);
    }

    #[test]
    fn test_list_charts_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        assert!(matches!(list_charts(&missing), Err(GalleryError::ReadDir { .. })));
    }

    #[test]
    fn test_render_index_escapes_and_encodes() {
        let html = render_index(&["q3 <final>.png".to_string()]);
        assert!(html.contains(r#"src="/static/q3%20%3Cfinal%3E.png""#));
        assert!(html.contains("q3 &lt;final&gt;.png"));
        assert!(render_index(&[]).contains("No charts found."));
    }

    #[test]
    fn test_render_index_keeps_plain_names() {
        let html = render_index(&["sales-2024_v2.png".to_string()]);
        assert!(html.contains(r#"src="/static/sales-2024_v2.png""#));
    }

    #[tokio::test]
    async fn test_index_lists_charts() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "revenue.png");
        touch(dir.path(), "readme.md");

        let response = router(dir.path())
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("/static/revenue.png"));
        assert!(!html.contains("readme.md"));
    }

    #[tokio::test]
    async fn test_static_files_are_served() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "revenue.png");

        let response = router(dir.path())
            .oneshot(Request::builder().uri("/static/revenue.png").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_dir_is_server_error() {
        let dir = tempfile::tempdir().unwrap();

        let response = router(dir.path().join("gone"))
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
