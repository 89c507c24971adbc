//! Template collaborator: the single HTML page used for every view.

use minijinja::Environment;
use serde::Serialize;
use waste_core::AppError;

const PAGE_TEMPLATE: &str = "page.html";

/// Values exposed to `page.html`.
#[derive(Debug, Default, Serialize)]
pub struct PageContext<'a> {
    pub name: &'a str,
    /// Pre-rendered, trusted fragment.
    pub syntax: Option<String>,
    pub max_size: usize,
    pub syntax_list: &'a [&'a str],
    /// Language preselected in the editor.
    pub language: &'a str,
    /// Editor contents.
    pub value: String,
    pub extra: &'a str,
    pub image: Option<&'a str>,
    pub video: Option<&'a str>,
    pub iframe: Option<&'a str>,
    pub content_type: &'a str,
    pub stylesheet: &'a str,
}

/// Compiled page template.
pub struct PageTemplate {
    env: Environment<'static>,
}

impl PageTemplate {
    /// Compile the bundled page template.
    ///
    /// # Errors
    /// Returns an error when the template does not parse.
    pub fn new() -> Result<Self, AppError> {
        let mut env = Environment::new();
        env.add_template(PAGE_TEMPLATE, include_str!("../templates/page.html"))
            .map_err(template_error)?;
        Ok(Self { env })
    }

    /// Render the page for `context`.
    ///
    /// # Errors
    /// Returns an error when rendering fails.
    pub fn render(&self, context: &PageContext<'_>) -> Result<String, AppError> {
        self.env
            .get_template(PAGE_TEMPLATE)
            .and_then(|template| template.render(context))
            .map_err(template_error)
    }
}

fn template_error(err: minijinja::Error) -> AppError {
    tracing::error!("Page template failed: {:#}", err);
    AppError::Internal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_are_escaped_but_fragments_are_not() {
        let pages = PageTemplate::new().expect("template");
        let html = pages
            .render(&PageContext {
                name: "<b>name</b>",
                syntax: Some("<pre class=\"code\">ok</pre>".to_string()),
                max_size: 1024,
                ..PageContext::default()
            })
            .expect("render");
        assert!(html.contains("&lt;b&gt;name"));
        assert!(html.contains("<pre class=\"code\">ok</pre>"));
        assert!(html.contains("1024"));
    }

    #[test]
    fn editor_lists_languages_and_value() {
        let pages = PageTemplate::new().expect("template");
        let html = pages
            .render(&PageContext {
                syntax_list: &["Rust", "Zig"],
                language: "Rust",
                value: "let x = 1 < 2;".to_string(),
                extra: "Not found or expired.",
                ..PageContext::default()
            })
            .expect("render");
        assert!(html.contains("<option value=\"Rust\" selected>Rust</option>"));
        assert!(html.contains("<option value=\"Zig\">Zig</option>"));
        assert!(html.contains("let x = 1 &lt; 2;"));
        assert!(html.contains("Not found or expired."));
    }

    #[test]
    fn media_views_embed_data_urls() {
        let pages = PageTemplate::new().expect("template");
        let html = pages
            .render(&PageContext {
                image: Some("iVBORw0KGgo="),
                content_type: "image/png",
                ..PageContext::default()
            })
            .expect("render");
        assert!(html.contains("src=\"data:image/png;base64,iVBORw0KGgo=\""));

        let linked = pages
            .render(&PageContext {
                video: Some("/r/abc"),
                ..PageContext::default()
            })
            .expect("render");
        assert!(linked.contains("<video"));
        assert!(linked.contains("abc"));
        assert!(!linked.contains("data:"));
    }
}
