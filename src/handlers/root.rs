//! Root endpoint handler for the landing page.

use axum::{
    extract::State,
    response::{Html, IntoResponse},
};
use tracing::{debug, instrument};

use crate::state::SharedState;

/// Handler for the root `/` endpoint.
#[instrument(skip(state))]
pub async fn root_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing / request");
    Html(render_landing_page(
        state.config.metrics_path(),
        state.config.enable_health.unwrap_or(true),
    ))
}

pub fn render_landing_page(metrics_path: &str, health: bool) -> String {
    let health_link = if health {
        r#"<p><a href="/health">Health</a></p>"#
    } else {
        ""
    };

    format!(
        r#"<html>
<head><title>jstat Exporter</title></head>
<body>
<h1>jstat Exporter</h1>
<p><a href="{metrics_path}">Metrics</a></p>
{health_link}
<p>Version {version}</p>
</body>
</html>"#,
        version = env!("CARGO_PKG_VERSION"),
    )
}
