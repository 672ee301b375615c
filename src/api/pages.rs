use axum::{response::Html, routing::get, Router};
use std::path::Path;
use tower_http::services::ServeDir;

const LANDING_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Fleetcast Vehicle Simulation</title>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
</head>
<body>
    <script>
        window.location.href = '/static/index.html';
    </script>
</body>
</html>
"#;

/// GET / - redirects the browser to the static client
pub async fn landing_page() -> Html<&'static str> {
    Html(LANDING_PAGE)
}

/// Landing page plus static files under /static
pub fn create_page_router(static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/", get(landing_page))
        .nest_service("/static", ServeDir::new(static_dir))
}
