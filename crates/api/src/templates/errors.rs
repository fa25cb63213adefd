//! Error pages.

use axum::http::StatusCode;
use super::{escape, layout};

pub fn error_page(status: StatusCode, message: &str) -> String {
    let heading = format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Error")
    );
    let content = format!(
        r#"        <h1>{heading}</h1>
        <p>{message}</p>
        <p><a href="/">Back to events</a></p>"#,
        heading = escape(&heading),
        message = escape(message)
    );
    layout(&heading, None, &content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_page_heading() {
        let page = error_page(StatusCode::FORBIDDEN, "Only the organizer can do that.");
        assert!(page.contains("<h1>403 Forbidden</h1>"));
        assert!(page.contains("Only the organizer can do that."));
    }
}
