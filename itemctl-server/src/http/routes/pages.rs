//! Landing page and plain-text liveness probe

use std::path::Path;

use axum::{routing::get, Router};
use tower_http::services::ServeFile;

/// GET /test
async fn test() -> &'static str {
    "Server is working!"
}

/// Page routes. `/` serves `index.html` from `static_dir`.
pub fn router<S>(static_dir: &Path) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .route("/test", get(test))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_route_answers() {
        assert_eq!(test().await, "Server is working!");
    }
}
