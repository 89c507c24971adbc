//! Render collaborator: paste bytes plus a syntax hint become an HTML fragment.

mod ansi;

use minijinja::HtmlEscape;
use waste_core::detection::ANSI_SYNTAX;
use waste_core::AppError;

#[cfg(feature = "highlight")]
use syntect::{
    highlighting::ThemeSet,
    html::{css_for_theme_with_class_style, ClassStyle, ClassedHTMLGenerator},
    parsing::{SyntaxReference, SyntaxSet},
    util::LinesWithEndings,
};

/// Languages offered by the editor's syntax picker.
pub const SYNTAX_LIST: &[&str] = &[
    "AutoHotkey",
    "Awk",
    "Bash",
    "C",
    "C++",
    "C#",
    "Clojure",
    "Common Lisp",
    "Crystal",
    "CSS",
    "D",
    "Dart",
    "Diff",
    "DNS",
    "Docker",
    "Elm",
    "EmacsLisp",
    "Erlang",
    "FSharp",
    "Go",
    "Go HTML Template",
    "Go Text Template",
    "Haskell",
    "HCL",
    "HTML",
    "INI",
    "Java",
    "JavaScript",
    "JSON",
    "Julia",
    "Kotlin",
    "Lua",
    "Makefile",
    "Markdown",
    "NASM",
    "Nim",
    "Nix",
    "Objective-C",
    "OCaml",
    "Org Mode",
    "Perl",
    "PHP",
    "PowerShell",
    "Prolog",
    "PromQL",
    "Protocol Buffer",
    "Python",
    "Python 2",
    "QBasic",
    "R",
    "Raku",
    "Ruby",
    "Rust",
    "SCSS",
    "Scala",
    "Scheme",
    "SQL",
    "Swift",
    "Tcl",
    "Tcsh",
    "Termcap",
    "TOML",
    "TypeScript",
    "VimL",
    "XML",
    "YAML",
    "Zig",
];

/// Turns content into a markup fragment for the page or an `X-Syntax` response.
pub trait Render: Send + Sync {
    /// Render `content` using the `syntax` hint.
    ///
    /// # Errors
    /// Returns an error when the highlighter fails.
    fn render(&self, content: &[u8], syntax: &str) -> Result<String, AppError>;

    /// Stylesheet matching the classes emitted by [`Render::render`].
    fn stylesheet(&self) -> &str {
        ""
    }
}

/// Class-based HTML renderer.
///
/// Terminal captures keep their SGR colours; other hints go through syntect
/// when the `highlight` feature is enabled, falling back to escaped text.
pub struct HtmlRenderer {
    #[cfg(feature = "highlight")]
    syntaxes: SyntaxSet,
    stylesheet: String,
}

#[cfg(feature = "highlight")]
const THEME_NAME: &str = "base16-ocean.dark";

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self {
            #[cfg(feature = "highlight")]
            syntaxes: SyntaxSet::load_defaults_newlines(),
            stylesheet: Self::build_stylesheet(),
        }
    }

    #[cfg(feature = "highlight")]
    fn build_stylesheet() -> String {
        let themes = ThemeSet::load_defaults();
        let Some(theme) = themes.themes.get(THEME_NAME) else {
            tracing::warn!("Highlight theme {} is missing", THEME_NAME);
            return String::new();
        };
        match css_for_theme_with_class_style(theme, ClassStyle::Spaced) {
            Ok(css) => css,
            Err(err) => {
                tracing::warn!("Failed to build highlight stylesheet: {}", err);
                String::new()
            }
        }
    }

    #[cfg(not(feature = "highlight"))]
    fn build_stylesheet() -> String {
        String::new()
    }

    #[cfg(feature = "highlight")]
    fn find_syntax(&self, text: &str, hint: &str) -> Option<&SyntaxReference> {
        let hint = hint.trim();
        if hint.is_empty() || hint.eq_ignore_ascii_case("plain") {
            return None;
        }
        if hint.eq_ignore_ascii_case("auto") {
            let first_line = text.lines().next().unwrap_or_default();
            return self.syntaxes.find_syntax_by_first_line(first_line);
        }
        self.syntaxes
            .find_syntax_by_name(hint)
            .or_else(|| self.syntaxes.find_syntax_by_token(hint))
            .or_else(|| self.syntaxes.find_syntax_by_token(&hint.to_lowercase()))
    }

    #[cfg(feature = "highlight")]
    fn highlight(&self, text: &str, hint: &str) -> Result<Option<String>, AppError> {
        let Some(syntax) = self.find_syntax(text, hint) else {
            return Ok(None);
        };
        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntaxes, ClassStyle::Spaced);
        for line in LinesWithEndings::from(text) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .map_err(|err| {
                    tracing::error!(syntax = %syntax.name, "Highlighting failed: {}", err);
                    AppError::Internal
                })?;
        }
        Ok(Some(format!(
            "<pre class=\"code\"><code>{}</code></pre>",
            generator.finalize()
        )))
    }
}

fn plain_fragment(text: &str) -> String {
    format!("<pre class=\"code\"><code>{}</code></pre>", HtmlEscape(text))
}

impl Render for HtmlRenderer {
    fn render(&self, content: &[u8], syntax: &str) -> Result<String, AppError> {
        let text = String::from_utf8_lossy(content);
        if syntax.trim().eq_ignore_ascii_case(ANSI_SYNTAX) {
            return Ok(ansi::render_ansi(&text));
        }

        #[cfg(feature = "highlight")]
        {
            if let Some(html) = self.highlight(&text, syntax)? {
                return Ok(html);
            }
        }

        Ok(plain_fragment(&text))
    }

    fn stylesheet(&self) -> &str {
        &self.stylesheet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_hint_escapes_markup() {
        let html = HtmlRenderer::new()
            .render(b"<script>alert(1)</script>", "plain")
            .expect("render");
        assert!(html.starts_with("<pre class=\"code\">"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn ansi_hint_uses_terminal_block() {
        let html = HtmlRenderer::new()
            .render(b"\x1b[31mred\x1b[0m\n", "ansi")
            .expect("render");
        assert!(html.contains("term-container"));
        assert!(html.contains("red"));
        assert!(!html.contains('\x1b'));
    }

    #[cfg(feature = "highlight")]
    #[test]
    fn known_language_is_highlighted_with_classes() {
        let renderer = HtmlRenderer::new();
        let html = renderer
            .render(b"fn main() { let x = 1; }\n", "rust")
            .expect("render");
        assert!(html.contains("<span class=\""));
        assert!(html.contains("main"));
        assert!(!renderer.stylesheet().is_empty());
    }

    #[test]
    fn unknown_language_falls_back_to_escaped_text() {
        let html = HtmlRenderer::new()
            .render(b"a < b", "no-such-language")
            .expect("render");
        assert_eq!(html, "<pre class=\"code\"><code>a &lt; b</code></pre>");
    }

    #[test]
    fn syntax_list_is_sorted_for_the_picker() {
        assert_eq!(SYNTAX_LIST.first(), Some(&"AutoHotkey"));
        assert_eq!(SYNTAX_LIST.last(), Some(&"Zig"));
        assert!(SYNTAX_LIST.contains(&"Rust"));
    }
}
