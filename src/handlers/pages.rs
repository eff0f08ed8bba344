use axum::{
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Extension,
};
use std::fmt::Write as _;

use crate::{
    models::capability::Capability,
    services::{navigation::NavigationShell, session_context::SessionContext},
};

/// Escapes text for inclusion in HTML content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn render_sidebar(out: &mut String, shell: &NavigationShell, user_name: &str) {
    let link = |out: &mut String, title: &str, url: &str, active: bool| {
        let class = if active { " class=\"active\"" } else { "" };
        let _ = writeln!(out, "<li><a href=\"{}\"{}>{}</a></li>", url, class, escape_html(title));
    };

    out.push_str("<aside class=\"sidebar\">\n<h1>OFSTEDPrep</h1>\n<nav>\n<ul>\n");
    for l in &shell.main {
        link(out, l.title, l.url, l.active);
    }
    out.push_str("</ul>\n");

    if shell.shows_administration() {
        out.push_str("<h2>Administration</h2>\n<ul>\n");
        for l in &shell.administration {
            link(out, l.title, l.url, l.active);
        }
        out.push_str("</ul>\n");
    }
    out.push_str("</nav>\n<footer>\n<ul>\n");
    for l in &shell.footer {
        link(out, l.title, l.url, l.active);
    }
    let _ = writeln!(
        out,
        "</ul>\n<p class=\"user\">{}</p>\n<form method=\"post\" action=\"{}\"><button type=\"submit\">Logout</button></form>\n</footer>\n</aside>",
        escape_html(user_name),
        shell.logout_url,
    );
}

/// Renders a full page, with the sidebar when a session is present.
pub fn render_document(context: &SessionContext, current_path: &str, title: &str, body: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{} | OFSTED Prep</title>\n</head>\n<body>",
        escape_html(title)
    );

    if let Some(user) = context.user() {
        let shell = NavigationShell::for_role(user.role, current_path);
        render_sidebar(&mut out, &shell, &user.name);
    }

    let _ = writeln!(out, "<main>\n{}\n</main>\n</body>\n</html>", body);
    out
}

/// Renders the shell of a protected page.
///
/// Only reached once the route guard has let the navigation through.
pub fn render_page(capability: Capability, context: &SessionContext) -> Html<String> {
    let body = format!(
        "<header>\n<h1>{}</h1>\n<p>{}</p>\n</header>\n<section data-capability=\"{}\"></section>",
        escape_html(capability.title()),
        escape_html(capability.description()),
        capability.name(),
    );

    Html(render_document(context, capability.path(), capability.title(), &body))
}

/// Renders the "not found" page for unknown routes.
pub async fn not_found(Extension(context): Extension<SessionContext>, uri: Uri) -> Response {
    tracing::debug!("Unknown route: {}", uri.path());

    let body = "<header>\n<h1>404</h1>\n<p>Oops! Page not found</p>\n</header>\n<a href=\"/\">Return to Home</a>";
    let html = render_document(&context, uri.path(), "Page not found", body);

    (StatusCode::NOT_FOUND, Html(html)).into_response()
}
