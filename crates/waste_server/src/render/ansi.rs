//! Terminal capture rendering.
//!
//! SGR colour and bold attributes become classed spans; every other escape
//! sequence is dropped. Each output line is wrapped on its own so styles are
//! re-opened after line breaks.

use minijinja::HtmlEscape;
use std::iter::Peekable;
use std::str::Chars;

const ESC: char = '\x1b';
const BEL: char = '\x07';

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Style {
    bold: bool,
    fg: Option<u16>,
    bg: Option<u16>,
}

impl Style {
    fn is_plain(&self) -> bool {
        *self == Self::default()
    }

    fn classes(&self) -> String {
        let mut classes = Vec::new();
        if self.bold {
            classes.push("term-bold".to_string());
        }
        if let Some(fg) = self.fg {
            classes.push(format!("term-fg{}", fg));
        }
        if let Some(bg) = self.bg {
            classes.push(format!("term-bg{}", bg));
        }
        classes.join(" ")
    }

    fn apply_sgr(&mut self, params: &str) {
        let mut codes = params
            .split(';')
            .map(|code| if code.is_empty() { 0 } else { code.parse::<u16>().unwrap_or(u16::MAX) });
        while let Some(code) = codes.next() {
            match code {
                0 => *self = Self::default(),
                1 => self.bold = true,
                22 => self.bold = false,
                30..=37 | 90..=97 => self.fg = Some(code),
                39 => self.fg = None,
                40..=47 | 100..=107 => self.bg = Some(code),
                49 => self.bg = None,
                38 | 48 => {
                    // Extended colours carry their own arguments; skip them.
                    match codes.next() {
                        Some(5) => {
                            codes.next();
                        }
                        Some(2) => {
                            codes.next();
                            codes.next();
                            codes.next();
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }
    }
}

struct LineWriter {
    out: String,
    text: String,
    style: Style,
    span_open: bool,
}

impl LineWriter {
    fn new() -> Self {
        Self {
            out: String::from("<pre class=\"term-container\"><code>"),
            text: String::new(),
            style: Style::default(),
            span_open: false,
        }
    }

    fn flush_text(&mut self) {
        if self.text.is_empty() {
            return;
        }
        if !self.span_open && !self.style.is_plain() {
            self.out.push_str(&format!("<span class=\"{}\">", self.style.classes()));
            self.span_open = true;
        }
        self.out.push_str(&HtmlEscape(&self.text).to_string());
        self.text.clear();
    }

    fn close_span(&mut self) {
        if self.span_open {
            self.out.push_str("</span>");
            self.span_open = false;
        }
    }

    fn set_style(&mut self, params: &str) {
        self.flush_text();
        let mut next = self.style;
        next.apply_sgr(params);
        if next != self.style {
            self.close_span();
            self.style = next;
        }
    }

    fn write_line(&mut self, line: &str) {
        self.out.push_str("<span class=\"line\">");
        let mut chars = line.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                ESC => self.escape_sequence(&mut chars),
                '\r' => {}
                _ => self.text.push(ch),
            }
        }
        self.flush_text();
        self.close_span();
        self.out.push_str("\n</span>");
    }

    fn escape_sequence(&mut self, chars: &mut Peekable<Chars<'_>>) {
        match chars.next() {
            Some('[') => {
                let mut params = String::new();
                for ch in chars.by_ref() {
                    if ('@'..='~').contains(&ch) {
                        if ch == 'm' {
                            self.set_style(&params);
                        }
                        return;
                    }
                    params.push(ch);
                }
            }
            Some(']') => {
                // Operating system commands (titles, hyperlinks) end with BEL or ST.
                while let Some(ch) = chars.next() {
                    if ch == BEL {
                        return;
                    }
                    if ch == ESC && chars.peek() == Some(&'\\') {
                        chars.next();
                        return;
                    }
                }
            }
            _ => {}
        }
    }

    fn finish(mut self) -> String {
        self.out.push_str("</code></pre>");
        self.out
    }
}

/// Render a terminal capture as a `term-container` block.
pub(crate) fn render_ansi(text: &str) -> String {
    let mut writer = LineWriter::new();
    let body = text.strip_suffix('\n').unwrap_or(text);
    for line in body.split('\n') {
        writer.write_line(line);
    }
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::render_ansi;

    #[test]
    fn colours_become_classed_spans() {
        let html = render_ansi("\x1b[1;31mfail\x1b[0m ok\n");
        assert_eq!(
            html,
            "<pre class=\"term-container\"><code>\
             <span class=\"line\"><span class=\"term-bold term-fg31\">fail</span> ok\n</span>\
             </code></pre>"
        );
    }

    #[test]
    fn styles_continue_across_lines() {
        let html = render_ansi("\x1b[32mone\ntwo\x1b[m\n");
        assert_eq!(html.matches("<span class=\"term-fg32\">").count(), 2);
        assert_eq!(html.matches("<span class=\"line\">").count(), 2);
    }

    #[test]
    fn hyperlinks_and_titles_are_stripped() {
        let html = render_ansi("\x1b]0;title\x07\x1b]8;;https://waste.st\x1b\\link\x1b]8;;\x1b\\\n");
        assert!(html.contains(">link\n"));
        assert!(!html.contains("title"));
        assert!(!html.contains("waste.st"));
    }

    #[test]
    fn text_is_escaped() {
        let html = render_ansi("<b>&</b>");
        assert!(html.contains("&lt;b&gt;&amp;&lt;"));
    }

    #[test]
    fn extended_colours_are_skipped() {
        let html = render_ansi("\x1b[38;5;208;1mx\x1b[0m");
        assert!(html.contains("<span class=\"term-bold\">x</span>"));
    }
}
