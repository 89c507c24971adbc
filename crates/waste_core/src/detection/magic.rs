//! Syntax hints from literal leading markers.
//!
//! The marker table is ordered and the first match wins. A shebang needs a
//! second look: the next line may carry a stronger marker, and otherwise the
//! interpreter named on the first line decides the language.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Language(&'static str),
    Shebang,
}

const MARKERS: &[(&[u8], Marker)] = &[
    (b"<!DOCTYPE html", Marker::Language("html")),
    (b"<html", Marker::Language("html")),
    (b"<head", Marker::Language("html")),
    (b"<body", Marker::Language("html")),
    (b"#!", Marker::Shebang),
    (b"package main\n", Marker::Language("go")),
    (b"%YAML 1.", Marker::Language("yaml")),
    (b"use v6;", Marker::Language("raku")),
];

/// Interpreter basename prefixes and the language they imply.
const INTERPRETERS: &[(&str, &str)] = &[
    ("perl", "perl"),
    ("ruby", "ruby"),
    ("python", "python"),
    ("sh", "bash"),
    ("bash", "bash"),
    ("zsh", "bash"),
    ("lua", "lua"),
];

/// Syntax tag for terminal captures.
pub const ANSI_SYNTAX: &str = "ansi";

fn leading_marker(input: &[u8]) -> Option<Marker> {
    MARKERS
        .iter()
        .find(|(prefix, _)| input.len() > prefix.len() && input.starts_with(prefix))
        .map(|(_, marker)| *marker)
}

fn path_basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Interpreter named by a `#!` first line, with any `env` indirection removed.
pub(crate) fn shebang_interpreter(content: &[u8]) -> Option<String> {
    let line_end = content
        .iter()
        .position(|&b| b == b'\n')
        .unwrap_or(content.len());
    let first_line = String::from_utf8_lossy(&content[..line_end]);
    let interpreter_line = first_line.trim().strip_prefix("#!")?.trim();

    let mut parts = interpreter_line.split_whitespace();
    let first = parts.next()?;
    let mut interpreter = first;
    if path_basename(first) == "env" {
        interpreter = parts.find(|arg| !arg.starts_with('-'))?;
    }

    let basename = path_basename(interpreter).trim();
    if basename.is_empty() {
        return None;
    }
    Some(basename.to_string())
}

fn language_for_interpreter(program: &str) -> Option<&'static str> {
    INTERPRETERS
        .iter()
        .find(|(prefix, _)| program.starts_with(prefix))
        .map(|(_, language)| *language)
}

fn contains_terminal_escapes(content: &[u8]) -> bool {
    content
        .windows(2)
        .enumerate()
        .any(|(idx, pair)| {
            pair == b"\x1B[" || (pair == b"\x1B]" && content.get(idx + 2) == Some(&b'8'))
        })
}

/// Infer a syntax hint from leading markers, shebangs, or terminal escapes.
///
/// # Returns
/// A language tag, [`ANSI_SYNTAX`] for terminal captures, or `None`.
pub fn detect_syntax(content: &[u8]) -> Option<&'static str> {
    let mut marker = leading_marker(content);

    if marker == Some(Marker::Shebang) {
        if let Some(newline) = content.iter().position(|&b| b == b'\n') {
            if newline > 0 {
                if let Some(next) = leading_marker(&content[newline + 1..]) {
                    marker = Some(next);
                }
            }
        }
    }

    let language = match marker {
        Some(Marker::Language(language)) => Some(language),
        Some(Marker::Shebang) => {
            shebang_interpreter(content).and_then(|program| language_for_interpreter(&program))
        }
        None => None,
    };

    language.or_else(|| contains_terminal_escapes(content).then_some(ANSI_SYNTAX))
}
