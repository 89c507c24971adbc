//! Detection tests for MIME sniffing and marker-based syntax hints.

use super::{detect_syntax, media_type, sniff_content_type, top_level_type};

fn assert_syntax_cases(cases: &[(&[u8], Option<&str>)]) {
    for (content, expected) in cases {
        assert_eq!(
            detect_syntax(content),
            *expected,
            "content: {:?}",
            String::from_utf8_lossy(content)
        );
    }
}

#[test]
fn leading_markers_map_to_languages() {
    let cases: [(&[u8], Option<&str>); 7] = [
        (b"<!DOCTYPE html><p>hi</p>", Some("html")),
        (b"<html><body></body></html>", Some("html")),
        (b"package main\nfunc main() {}\n", Some("go")),
        (b"%YAML 1.2\n---\nkey: value\n", Some("yaml")),
        (b"use v6;\nsay 'hi';\n", Some("raku")),
        (b"just some words", None),
        (b"", None),
    ];
    assert_syntax_cases(cases.as_slice());
}

#[test]
fn marker_must_be_followed_by_content() {
    assert_eq!(detect_syntax(b"<html"), None);
    assert_eq!(detect_syntax(b"use v6;"), None);
    assert_eq!(detect_syntax(b"use v6; "), Some("raku"));
}

#[test]
fn shebang_interpreters_resolve_by_prefix() {
    let cases: [(&[u8], Option<&str>); 8] = [
        (b"#!/usr/bin/env python3\nprint(1)\n", Some("python")),
        (b"#!/usr/bin/perl -w\nprint 1;\n", Some("perl")),
        (b"#!/bin/sh\necho hi\n", Some("bash")),
        (b"#!/usr/bin/env -S zsh -f\necho hi\n", Some("bash")),
        (b"#!/usr/bin/ruby\nputs 1\n", Some("ruby")),
        (b"#!/usr/local/bin/lua5.4\nprint(1)\n", Some("lua")),
        (b"#!/usr/bin/env node\nconsole.log(1)\n", None),
        (b"#!\n", None),
    ];
    assert_syntax_cases(cases.as_slice());
}

#[test]
fn second_line_marker_overrides_shebang() {
    assert_eq!(
        detect_syntax(b"#!/usr/bin/env raku\nuse v6;\nsay 1;\n"),
        Some("raku")
    );
    assert_eq!(
        detect_syntax(b"#!/usr/bin/env perl\n%YAML 1.1\n"),
        Some("yaml")
    );
}

#[test]
fn terminal_escapes_fall_back_to_ansi() {
    assert_eq!(detect_syntax(b"\x1b[31mred\x1b[0m\n"), Some("ansi"));
    assert_eq!(
        detect_syntax(b"see \x1b]8;;https://waste.st\x1b\\link\x1b]8;;\x1b\\"),
        Some("ansi")
    );
    assert_eq!(detect_syntax(b"\x1b]0;title\x07"), None);
    assert_eq!(
        detect_syntax(b"#!/usr/bin/env python\n\x1b[1mbold"),
        Some("python")
    );
}

#[test]
fn sniffs_common_signatures() {
    let cases: [(&[u8], &str); 12] = [
        (b"hello world", "text/plain; charset=utf-8"),
        (b"  <!doctype html><title>x</title>", "text/html; charset=utf-8"),
        (b"<p>paragraph</p>", "text/html; charset=utf-8"),
        (b"<?xml version=\"1.0\"?><a/>", "text/xml; charset=utf-8"),
        (b"%PDF-1.7\n", "application/pdf"),
        (b"\x89PNG\r\n\x1a\n\x00\x00\x00\x0dIHDR", "image/png"),
        (b"\xff\xd8\xff\xe0\x00\x10JFIF", "image/jpeg"),
        (b"GIF89a\x01\x00\x01\x00", "image/gif"),
        (b"PK\x03\x04\x14\x00\x00\x00", "application/zip"),
        (b"\x1f\x8b\x08\x00\x00\x00\x00\x00", "application/x-gzip"),
        (b"Rar!\x1a\x07\x00\xcf\x90", "application/x-rar-compressed"),
        (b"\x00\x01\x02\x03binary", "application/octet-stream"),
    ];
    for (content, expected) in cases {
        assert_eq!(sniff_content_type(content), expected);
    }
}

#[test]
fn sniffs_container_formats() {
    assert_eq!(sniff_content_type(b"RIFF\x24\x00\x00\x00WEBPVP8 "), "image/webp");
    assert_eq!(sniff_content_type(b"RIFF\x24\x00\x00\x00WAVEfmt "), "audio/wave");
    assert_eq!(sniff_content_type(b"\x1a\x45\xdf\xa3\x01\x00"), "video/webm");

    let mut mp4 = vec![0x00, 0x00, 0x00, 0x1c];
    mp4.extend_from_slice(b"ftypisom\x00\x00\x02\x00isomiso2mp41");
    assert_eq!(mp4.len(), 28);
    assert_eq!(sniff_content_type(&mp4), "video/mp4");
}

#[test]
fn sniff_only_inspects_leading_window() {
    let mut content = vec![b'a'; 600];
    content[550] = 0x00;
    assert_eq!(sniff_content_type(&content), "text/plain; charset=utf-8");
}

#[test]
fn media_type_helpers_strip_parameters() {
    assert_eq!(media_type("text/plain; charset=utf-8"), "text/plain");
    assert_eq!(media_type("image/png"), "image/png");
    assert_eq!(top_level_type("video/mp4"), "video");
    assert_eq!(top_level_type("text/html; charset=utf-8"), "text");
}
