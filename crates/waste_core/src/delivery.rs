//! Read-side decisions: raw or rendered, embedded or linked, served or redirected.
//!
//! Everything here is pure. The transport layer extracts [`RequestSignals`]
//! from headers and turns the returned decision into a response.

use crate::config::Config;
use crate::constants::{INLINE_EMBED_LIMIT, LANDING_ID, RENDER_SIZE_LIMIT};
use crate::detection::{media_type, sniff_content_type, top_level_type};
use crate::models::paste::Paste;
use crate::text::url_host;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Request headers that influence delivery.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestSignals<'a> {
    pub accept: Option<&'a str>,
    pub user_agent: Option<&'a str>,
    pub sec_fetch_dest: Option<&'a str>,
    pub referer: Option<&'a str>,
    /// `Host` the request was addressed to.
    pub host: Option<&'a str>,
}

impl RequestSignals<'_> {
    /// Whether the client wants bare content rather than an HTML page.
    ///
    /// The first decisive `Accept` entry wins; `*/*` ends the scan. Without a
    /// decision, command-line clients and clients sending neither an `Accept`
    /// header nor a `product/version` user agent count as plain.
    pub fn wants_plain(&self) -> bool {
        if let Some(accept) = self.accept {
            for entry in accept.split(',') {
                let media = entry.split(';').next().unwrap_or_default().trim();
                match media {
                    "text/html" => return false,
                    "text/plain" => return true,
                    "*/*" => break,
                    _ => {}
                }
            }
        }

        let user_agent = self.user_agent.unwrap_or_default();
        if user_agent.contains("curl/") || user_agent.contains("Wget/") {
            return true;
        }
        self.accept.map_or(true, str::is_empty) && !user_agent.contains('/')
    }

    /// Host of the referring page. Referers without a host are ignored.
    fn referer_host(&self) -> Option<String> {
        self.referer.and_then(url_host)
    }
}

/// Hosts and thresholds used when selecting a delivery.
#[derive(Debug, Clone)]
pub struct DeliveryPolicy {
    pub trusted_hosts: Vec<String>,
    pub landing_id: String,
    pub inline_limit: usize,
    pub render_limit: usize,
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        Self {
            trusted_hosts: Vec::new(),
            landing_id: LANDING_ID.to_string(),
            inline_limit: INLINE_EMBED_LIMIT,
            render_limit: RENDER_SIZE_LIMIT,
        }
    }
}

impl DeliveryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            trusted_hosts: config.trusted_hosts.clone(),
            ..Self::default()
        }
    }

    /// Whether `host` is one of the service's own names.
    pub fn is_trusted_host(&self, host: &str, own_host: Option<&str>) -> bool {
        own_host.is_some_and(|own| own.eq_ignore_ascii_case(host))
            || self
                .trusted_hosts
                .iter()
                .any(|trusted| trusted.eq_ignore_ascii_case(host))
    }
}

/// How a raw read is answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawDelivery {
    /// Redirect without caching.
    Redirect { location: String },
    /// Serve the bytes with this content type.
    Serve { content_type: &'static str },
}

/// Content type used when serving raw bytes.
///
/// HTML is never served as a document from the paste origin.
pub fn raw_content_type(content: &[u8]) -> &'static str {
    let sniffed = sniff_content_type(content);
    if media_type(sniffed) == "text/html" {
        "text/plain; charset=utf-8"
    } else {
        sniffed
    }
}

/// Decide how to answer a raw read of `paste`.
pub fn select_raw(
    paste: &Paste,
    signals: &RequestSignals<'_>,
    policy: &DeliveryPolicy,
) -> RawDelivery {
    let content_type = raw_content_type(&paste.content);
    let kind = top_level_type(content_type);

    if matches!(kind, "image" | "video") {
        if let Some(dest) = signals.sec_fetch_dest.filter(|dest| !dest.is_empty()) {
            if dest != kind {
                return RawDelivery::Redirect {
                    location: format!("/{}", paste.id),
                };
            }
        }
    }

    if paste.id != policy.landing_id {
        if let Some(host) = signals.referer_host() {
            if !policy.is_trusted_host(&host, signals.host) {
                return RawDelivery::Redirect {
                    location: format!("/r/{}", policy.landing_id),
                };
            }
        }
    }

    RawDelivery::Serve { content_type }
}

/// Media reference for the page template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Embedded {
    Inline {
        content_type: String,
        data_base64: String,
    },
    Url(String),
}

/// What the page view shows for a paste.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageView {
    Image(Embedded),
    Video(Embedded),
    /// Documents shown in a frame, such as PDF.
    Frame(Embedded),
    /// Text small enough for the highlighter.
    Highlighted,
    /// Everything else, shown as an escaped value.
    PlainValue,
}

fn embed(paste: &Paste, content_type: &str, policy: &DeliveryPolicy) -> Embedded {
    if paste.content.len() <= policy.inline_limit {
        Embedded::Inline {
            content_type: media_type(content_type).to_string(),
            data_base64: STANDARD.encode(&paste.content),
        }
    } else {
        Embedded::Url(format!("/r/{}", paste.id))
    }
}

/// Decide how the HTML page presents `paste`.
pub fn select_page(paste: &Paste, policy: &DeliveryPolicy) -> PageView {
    let content_type = sniff_content_type(&paste.content);
    match top_level_type(content_type) {
        "image" => PageView::Image(embed(paste, content_type, policy)),
        "video" => PageView::Video(embed(paste, content_type, policy)),
        _ if media_type(content_type) == "application/pdf" => {
            PageView::Frame(embed(paste, content_type, policy))
        }
        "application" => PageView::PlainValue,
        _ if !paste.content.is_empty() && paste.content.len() < policy.render_limit => {
            PageView::Highlighted
        }
        _ => PageView::PlainValue,
    }
}

/// Whether `content` may go through the highlighter for a fragment response.
pub fn is_renderable(content: &[u8], policy: &DeliveryPolicy) -> bool {
    content.len() < policy.render_limit
        && top_level_type(sniff_content_type(content)) != "application"
}
