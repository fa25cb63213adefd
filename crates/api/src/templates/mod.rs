//! Server-rendered HTML pages.
//!
//! Pages are plain `format!` strings. Every value that originates from a user
//! goes through [`escape`] before it is interpolated.

pub mod accounts;
pub mod errors;
pub mod events;

use domain::models::{FormErrors, User};

/// HTML-escapes text for element content and quoted attribute values.
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Login page URL that returns to `next` afterwards.
pub fn login_url(next: &str) -> String {
    match serde_urlencoded::to_string([("next", next)]) {
        Ok(query) => format!("/accounts/login?{}", query),
        Err(_) => "/accounts/login".to_string(),
    }
}

/// Wraps page content in the shared document shell and navigation bar.
pub fn layout(title: &str, user: Option<&User>, content: &str) -> String {
    let nav = match user {
        Some(user) => format!(
            r#"<span class="greeting">Hello, {username}</span>
            <a href="/events/create">Create event</a>
            <form method="post" action="/accounts/logout" class="inline">
                <button type="submit">Log out</button>
            </form>"#,
            username = escape(&user.username)
        ),
        None => r#"<a href="/accounts/login">Log in</a>
            <a href="/accounts/signup">Sign up</a>"#
            .to_string(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} | Event Board</title>
</head>
<body>
    <header>
        <a href="/" class="brand">Event Board</a>
        <nav>
            {nav}
        </nav>
    </header>
    <main>
{content}
    </main>
</body>
</html>"#,
        title = escape(title),
        nav = nav,
        content = content
    )
}

/// Error list for one input, empty when the field is valid.
pub(crate) fn field_errors(errors: &FormErrors, field: &str) -> String {
    error_list(errors.for_field(field))
}

pub(crate) fn non_field_errors(errors: &FormErrors) -> String {
    error_list(errors.non_field())
}

fn error_list(messages: &[String]) -> String {
    if messages.is_empty() {
        return String::new();
    }
    let items: String = messages
        .iter()
        .map(|message| format!("<li>{}</li>", escape(message)))
        .collect();
    format!(r#"<ul class="errorlist">{}</ul>"#, items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<script>alert("x" & 'y')</script>"#),
            "&lt;script&gt;alert(&quot;x&quot; &amp; &#x27;y&#x27;)&lt;/script&gt;"
        );
        assert_eq!(escape("Music Festival"), "Music Festival");
    }

    #[test]
    fn test_login_url_encodes_next() {
        assert_eq!(login_url("/events/create"), "/accounts/login?next=%2Fevents%2Fcreate");
        assert_eq!(login_url("/?q=a b"), "/accounts/login?next=%2F%3Fq%3Da+b");
    }

    #[test]
    fn test_layout_escapes_title() {
        let page = layout("<Party>", None, "<p>body</p>");
        assert!(page.contains("&lt;Party&gt; | Event Board"));
        assert!(page.contains("<p>body</p>"));
        assert!(page.contains("/accounts/login"));
    }

    #[test]
    fn test_error_list() {
        let mut errors = FormErrors::new();
        errors.add("title", "This field is required.");
        assert_eq!(
            field_errors(&errors, "title"),
            r#"<ul class="errorlist"><li>This field is required.</li></ul>"#
        );
        assert!(field_errors(&errors, "location").is_empty());
    }
}
