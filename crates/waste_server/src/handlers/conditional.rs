//! `Range` and `If-Modified-Since` handling for raw responses.

/// Portion of a body selected by a `Range` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ByteRange {
    /// No usable range; send everything.
    Full,
    /// Inclusive byte span.
    Partial { start: usize, end: usize },
    /// The range starts past the end of the body.
    Unsatisfiable,
}

/// Resolve a single `bytes=` range against a body of `len` bytes.
///
/// Malformed values and multi-range requests fall back to [`ByteRange::Full`].
pub(crate) fn parse_range(value: Option<&str>, len: usize) -> ByteRange {
    let Some(spec) = value.and_then(|value| value.trim().strip_prefix("bytes=")) else {
        return ByteRange::Full;
    };
    if spec.contains(',') {
        return ByteRange::Full;
    }
    let Some((start, end)) = spec.trim().split_once('-') else {
        return ByteRange::Full;
    };
    let (start, end) = (start.trim(), end.trim());

    if start.is_empty() {
        let Ok(suffix) = end.parse::<usize>() else {
            return ByteRange::Full;
        };
        if suffix == 0 || len == 0 {
            return ByteRange::Unsatisfiable;
        }
        return ByteRange::Partial {
            start: len.saturating_sub(suffix),
            end: len - 1,
        };
    }

    let Ok(start) = start.parse::<usize>() else {
        return ByteRange::Full;
    };
    if start >= len {
        return ByteRange::Unsatisfiable;
    }
    let end = if end.is_empty() {
        len - 1
    } else {
        match end.parse::<usize>() {
            Ok(end) if end >= start => end.min(len - 1),
            _ => return ByteRange::Full,
        }
    };
    ByteRange::Partial { start, end }
}

/// Whether an `If-Modified-Since` value covers a resource last changed at
/// `modified` (Unix seconds). Unparseable dates never match.
pub(crate) fn not_modified_since(value: Option<&str>, modified: i64) -> bool {
    value
        .and_then(|value| chrono::DateTime::parse_from_rfc2822(value.trim()).ok())
        .is_some_and(|since| modified <= since.timestamp())
}

/// Format a Unix timestamp as an HTTP date.
pub(crate) fn http_date(timestamp: i64) -> Option<String> {
    let time = chrono::DateTime::from_timestamp(timestamp, 0)?;
    Some(time.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_or_malformed_ranges_serve_everything() {
        for value in [
            None,
            Some("items=0-1"),
            Some("bytes=a-b"),
            Some("bytes=5-2"),
            Some("bytes=0-1,4-5"),
        ] {
            assert_eq!(parse_range(value, 10), ByteRange::Full, "{value:?}");
        }
    }

    #[test]
    fn explicit_open_and_suffix_ranges() {
        assert_eq!(
            parse_range(Some("bytes=2-4"), 10),
            ByteRange::Partial { start: 2, end: 4 }
        );
        assert_eq!(
            parse_range(Some("bytes=7-"), 10),
            ByteRange::Partial { start: 7, end: 9 }
        );
        assert_eq!(
            parse_range(Some("bytes=5-100"), 10),
            ByteRange::Partial { start: 5, end: 9 }
        );
        assert_eq!(
            parse_range(Some("bytes=-3"), 10),
            ByteRange::Partial { start: 7, end: 9 }
        );
        assert_eq!(
            parse_range(Some("bytes=-30"), 10),
            ByteRange::Partial { start: 0, end: 9 }
        );
    }

    #[test]
    fn ranges_past_the_end_are_unsatisfiable() {
        assert_eq!(parse_range(Some("bytes=10-"), 10), ByteRange::Unsatisfiable);
        assert_eq!(parse_range(Some("bytes=-0"), 10), ByteRange::Unsatisfiable);
        assert_eq!(parse_range(Some("bytes=0-"), 0), ByteRange::Unsatisfiable);
    }

    #[test]
    fn conditional_dates_compare_at_second_precision() {
        let stamp = 1_700_000_000;
        let date = http_date(stamp).expect("date");
        assert_eq!(date, "Tue, 14 Nov 2023 22:13:20 GMT");
        assert!(not_modified_since(Some(&date), stamp));
        assert!(not_modified_since(Some(&date), stamp - 60));
        assert!(!not_modified_since(Some(&date), stamp + 1));
        assert!(!not_modified_since(Some("yesterday"), stamp));
        assert!(!not_modified_since(None, stamp));
    }
}
