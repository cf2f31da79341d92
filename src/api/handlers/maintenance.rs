//! Maintenance page served to requests rewritten by maintenance routes

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use tracing::{debug, instrument};

use crate::api::error::ApiError;
use crate::api::routes::ApiState;
use crate::storage::MaintenancePage;

const RETRY_AFTER_SECONDS: &str = "300";
const DEFAULT_TITLE: &str = "Under Maintenance";
const DEFAULT_MESSAGE: &str =
    "This service is temporarily unavailable for maintenance. Please check back soon.";

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out
}

fn text(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Render the maintenance page; missing fields fall back to generic text.
pub fn render_page(page: Option<&MaintenancePage>) -> String {
    let title = page.and_then(|p| text(p.title.as_ref())).unwrap_or(DEFAULT_TITLE);
    let message = page.and_then(|p| text(p.message.as_ref())).unwrap_or(DEFAULT_MESSAGE);
    let estimate = page
        .and_then(|p| text(p.estimated_time.as_ref()))
        .map(|t| format!("<p class=\"estimate\">Estimated time: {}</p>", escape_html(t)))
        .unwrap_or_default();

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n</head>\n<body>\n<main>\n<h1>{title}</h1>\n<p>{message}</p>\n\
         {estimate}\n</main>\n</body>\n</html>\n",
        title = escape_html(title),
        message = escape_html(message),
        estimate = estimate,
    )
}

fn request_host(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-host")
        .or_else(|| headers.get(header::HOST))
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim())
        .map(|v| v.split(':').next().unwrap_or(v).to_ascii_lowercase())
        .filter(|v| !v.is_empty())
}

/// Serve the maintenance page for the resource on the request's host.
#[instrument(skip(state, headers))]
pub async fn maintenance_page_handler(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let page = match request_host(&headers) {
        Some(host) => {
            let page = state.maintenance_pages.maintenance_page(&host).await?;
            debug!(host = %host, found = page.is_some(), "Rendering maintenance page");
            page
        }
        None => None,
    };

    Ok((
        StatusCode::SERVICE_UNAVAILABLE,
        [(header::RETRY_AFTER, RETRY_AFTER_SECONDS)],
        Html(render_page(page.as_ref())),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_content_is_escaped() {
        let page = MaintenancePage {
            resource_name: "app".into(),
            title: Some("<script>alert(1)</script>".into()),
            message: Some("Tom & Jerry".into()),
            estimated_time: Some("2 hours".into()),
        };
        let html = render_page(Some(&page));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("Tom &amp; Jerry"));
        assert!(html.contains("Estimated time: 2 hours"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn defaults_when_page_missing() {
        let html = render_page(None);
        assert!(html.contains(DEFAULT_TITLE));
        assert!(!html.contains("Estimated time"));
    }

    #[test]
    fn forwarded_host_wins_and_port_is_stripped() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "edgeplane:3002".parse().unwrap());
        assert_eq!(request_host(&headers).as_deref(), Some("edgeplane"));

        headers.insert("x-forwarded-host", "App.Example.com".parse().unwrap());
        assert_eq!(request_host(&headers).as_deref(), Some("app.example.com"));
    }
}
