//! Page skeleton written by `create_file`.
//!
//! The skeleton is plain text, not built through the DOM, so the caller's
//! body content lands in the file exactly as supplied.

const BOOTSTRAP_CSS: &str = r#"<link href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.0/dist/css/bootstrap.min.css" rel="stylesheet">"#;
const BOOTSTRAP_JS: &str = r#"<script src="https://cdn.jsdelivr.net/npm/bootstrap@5.3.0/dist/js/bootstrap.bundle.min.js"></script>"#;

/// Values substituted into the HTML5 skeleton.
#[derive(Debug, Clone, Copy)]
pub struct PageTemplate<'a> {
    pub title: &'a str,
    pub language: &'a str,
    pub charset: &'a str,
    pub include_bootstrap: bool,
    pub content: &'a str,
}

impl PageTemplate<'_> {
    pub fn render(&self) -> String {
        let (css, js) = if self.include_bootstrap {
            (BOOTSTRAP_CSS, BOOTSTRAP_JS)
        } else {
            ("", "")
        };
        format!(
            r#"<!DOCTYPE html>
<html lang="{language}">
<head>
    <meta charset="{charset}">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    {css}
</head>
<body>
    {content}
    {js}
</body>
</html>"#,
            language = self.language,
            charset = self.charset,
            title = self.title,
            content = self.content,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(include_bootstrap: bool) -> PageTemplate<'static> {
        PageTemplate {
            title: "Home",
            language: "en",
            charset: "UTF-8",
            include_bootstrap,
            content: "<main id=\"app\"></main>",
        }
    }

    #[test]
    fn test_render_plain() {
        let html = template(false).render();
        assert!(html.starts_with("<!DOCTYPE html>\n<html lang=\"en\">"));
        assert!(html.contains("<meta charset=\"UTF-8\">"));
        assert!(html.contains("<title>Home</title>"));
        assert!(html.contains("    <main id=\"app\"></main>\n"));
        assert!(!html.contains("bootstrap"));
        assert!(html.ends_with("</html>"));
    }

    #[test]
    fn test_render_with_bootstrap() {
        let html = template(true).render();
        assert!(html.contains("bootstrap.min.css"));
        assert!(html.contains("bootstrap.bundle.min.js"));
    }
}
