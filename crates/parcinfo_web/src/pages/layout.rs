//! Page shell shared by every HTML view.

use super::flash::Flash;
use axum::response::Html;

const SITE_NAME: &str = "Parcinfo";
const CONTACT_EMAIL: &str = "contact@parcinfo.fr";

/// Escapes text for use in element content and quoted attribute values.
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Wraps `body` (already escaped) in the site layout.
pub fn page(title: &str, flash: Option<Flash>, body: &str) -> Html<String> {
    let alert = flash
        .map(|flash| {
            format!(
                r#"<div class="alert alert-{}" role="alert">{}</div>"#,
                flash.kind(),
                escape(flash.message())
            )
        })
        .unwrap_or_default();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="fr">
<head>
<meta charset="utf-8">
<title>{title} - {SITE_NAME}</title>
</head>
<body>
<header>
<a class="brand" href="/">{SITE_NAME}</a>
<nav>
<ul>
<li><a>Appareils</a></li>
<li><a href="/personnes">Personnes</a></li>
<li><a href="/peripheriques">Périphériques</a></li>
<li><a>Parc</a></li>
</ul>
</nav>
</header>
<main>
{alert}
{body}
</main>
<footer>
<ul>
<li><a href="mailto:{CONTACT_EMAIL}">Contact</a></li>
</ul>
</footer>
</body>
</html>
"#,
        title = escape(title),
    ))
}

/// `<option>` with optional `selected`.
pub fn option(value: &str, label: &str, selected: bool) -> String {
    format!(
        r#"<option value="{}"{}>{}</option>"#,
        escape(value),
        if selected { " selected" } else { "" },
        escape(label)
    )
}

/// Single-button POST form.
pub fn post_button(action: &str, label: &str, hidden: &[(&str, &str)]) -> String {
    let fields = hidden
        .iter()
        .map(|(name, value)| {
            format!(
                r#"<input type="hidden" name="{}" value="{}">"#,
                escape(name),
                escape(value)
            )
        })
        .collect::<String>();
    format!(
        r#"<form method="post" action="{}">{fields}<button type="submit">{}</button></form>"#,
        escape(action),
        escape(label)
    )
}
