//! Read endpoints: front page, paste pages and raw content.

use super::conditional::{http_date, not_modified_since, parse_range, ByteRange};
use super::request::{header_str, request_signals, X_SYNTAX};
use crate::{error::HttpError, render::SYNTAX_LIST, template::PageContext, AppState};
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};
use waste_core::delivery::{is_renderable, select_page, select_raw, Embedded, PageView, RawDelivery};
use waste_core::{AppError, Paste, MANUAL_ID};

const NOT_FOUND_MESSAGE: &str = "Not found or expired.";
const RAW_CSP: &str = "default-src 'none'; frame-ancestors 'self'";
const PAGE_VARY: &str = "Accept, Accept-Encoding, User-Agent";
const FRONT_PAGE_CACHE: &str = "s-maxage=1800, max-age=3600, stale-if-error=14400";

fn not_found_plain() -> Response {
    (StatusCode::NOT_FOUND, format!("{}\n", NOT_FOUND_MESSAGE)).into_response()
}

fn header_value(value: String) -> Result<HeaderValue, AppError> {
    HeaderValue::try_from(value).map_err(|err| {
        tracing::error!("Invalid response header value: {}", err);
        AppError::Internal
    })
}

fn serve_bytes(
    paste: &Paste,
    content_type: &'static str,
    headers: &HeaderMap,
) -> Result<Response, HttpError> {
    let last_modified = if paste.is_permanent() {
        None
    } else {
        http_date(paste.created_at)
    };
    if last_modified.is_some()
        && not_modified_since(header_str(headers, header::IF_MODIFIED_SINCE), paste.created_at)
    {
        let mut response = StatusCode::NOT_MODIFIED.into_response();
        if let Some(modified) = last_modified {
            response
                .headers_mut()
                .insert(header::LAST_MODIFIED, header_value(modified)?);
        }
        return Ok(response);
    }

    let len = paste.content.len();
    let mut response = match parse_range(header_str(headers, header::RANGE), len) {
        ByteRange::Full => paste.content.clone().into_response(),
        ByteRange::Partial { start, end } => {
            let mut response = (
                StatusCode::PARTIAL_CONTENT,
                paste.content[start..=end].to_vec(),
            )
                .into_response();
            response.headers_mut().insert(
                header::CONTENT_RANGE,
                header_value(format!("bytes {}-{}/{}", start, end, len))?,
            );
            response
        }
        ByteRange::Unsatisfiable => {
            let mut response = StatusCode::RANGE_NOT_SATISFIABLE.into_response();
            response.headers_mut().insert(
                header::CONTENT_RANGE,
                header_value(format!("bytes */{}", len))?,
            );
            return Ok(response);
        }
    };

    let response_headers = response.headers_mut();
    response_headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    response_headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    response_headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    if let Some(modified) = last_modified {
        response_headers.insert(header::LAST_MODIFIED, header_value(modified)?);
    }
    Ok(response)
}

fn raw_response(
    state: &AppState,
    paste: &Paste,
    headers: &HeaderMap,
) -> Result<Response, HttpError> {
    let signals = request_signals(headers);
    let mut response = match select_raw(paste, &signals, &state.delivery) {
        RawDelivery::Redirect { location } => {
            let location = HeaderValue::from_str(&location).map_err(|err| {
                tracing::error!(id = %paste.id, "Invalid redirect target: {}", err);
                AppError::Internal
            })?;
            let mut response = StatusCode::FOUND.into_response();
            let headers = response.headers_mut();
            headers.insert(header::LOCATION, location);
            headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
            response
        }
        RawDelivery::Serve { content_type } => serve_bytes(paste, content_type, headers)?,
    };
    response.headers_mut().insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(RAW_CSP),
    );
    Ok(response)
}

fn page_response(body: String, status: StatusCode, cacheable: bool) -> Response {
    let mut response = (status, Html(body)).into_response();
    let headers = response.headers_mut();
    headers.insert(header::VARY, HeaderValue::from_static(PAGE_VARY));
    if cacheable {
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static(FRONT_PAGE_CACHE),
        );
    }
    response
}

fn editor_page(state: &AppState, extra: &str, status: StatusCode) -> Result<Response, HttpError> {
    let body = state.pages.render(&PageContext {
        max_size: state.config.max_paste_size,
        syntax_list: SYNTAX_LIST,
        language: "auto",
        extra,
        stylesheet: state.renderer.stylesheet(),
        ..PageContext::default()
    })?;
    Ok(page_response(body, status, status == StatusCode::OK))
}

fn embedded_parts(embedded: &Embedded) -> (&str, &str) {
    match embedded {
        Embedded::Inline {
            content_type,
            data_base64,
        } => (content_type.as_str(), data_base64.as_str()),
        Embedded::Url(url) => ("", url.as_str()),
    }
}

fn paste_page(state: &AppState, paste: &Paste) -> Result<Response, HttpError> {
    let view = select_page(paste, &state.delivery);
    let mut context = PageContext {
        name: &paste.name,
        max_size: state.config.max_paste_size,
        stylesheet: state.renderer.stylesheet(),
        ..PageContext::default()
    };

    match &view {
        PageView::Image(embedded) => {
            let (content_type, src) = embedded_parts(embedded);
            context.content_type = content_type;
            context.image = Some(src);
        }
        PageView::Video(embedded) => {
            let (content_type, src) = embedded_parts(embedded);
            context.content_type = content_type;
            context.video = Some(src);
        }
        PageView::Frame(embedded) => {
            let (content_type, src) = embedded_parts(embedded);
            context.content_type = content_type;
            context.iframe = Some(src);
        }
        PageView::Highlighted => {
            context.syntax = Some(state.renderer.render(&paste.content, &paste.syntax)?);
            context.syntax_list = SYNTAX_LIST;
            context.language = &paste.syntax;
        }
        PageView::PlainValue => {
            context.syntax_list = SYNTAX_LIST;
            context.language = "plain";
            context.value = paste.text().into_owned();
        }
    }

    let cacheable = view == PageView::PlainValue;
    let body = state.pages.render(&context)?;
    Ok(page_response(body, StatusCode::OK, cacheable))
}

fn syntax_fragment(state: &AppState, paste: &Paste, syntax: &str) -> Result<Response, HttpError> {
    if !is_renderable(&paste.content, &state.delivery) {
        return Ok(StatusCode::OK.into_response());
    }
    let fragment = state.renderer.render(&paste.content, syntax)?;
    let mut response = Html(fragment).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    Ok(response)
}

/// Front page: the editor for browsers, the manual for plain clients.
pub async fn front_page(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, HttpError> {
    let signals = request_signals(&headers);
    if signals.wants_plain() {
        return match state.db.pastes.get(MANUAL_ID)? {
            Some(manual) => raw_response(&state, &manual, &headers),
            None => Ok(not_found_plain()),
        };
    }
    editor_page(&state, "", StatusCode::OK)
}

/// Empty editor.
pub async fn new_page(State(state): State<AppState>) -> Result<Response, HttpError> {
    editor_page(&state, "", StatusCode::OK)
}

/// Paste page, raw content for plain clients, or a rendered fragment when
/// `X-Syntax` is sent.
pub async fn view_paste(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, HttpError> {
    let signals = request_signals(&headers);
    let plain = signals.wants_plain();

    let Some(paste) = state.db.pastes.get(&id.to_lowercase())? else {
        if plain {
            return Ok(not_found_plain());
        }
        return editor_page(&state, NOT_FOUND_MESSAGE, StatusCode::NOT_FOUND);
    };

    if plain {
        return raw_response(&state, &paste, &headers);
    }
    if let Some(syntax) = header_str(&headers, X_SYNTAX).filter(|value| !value.trim().is_empty()) {
        return syntax_fragment(&state, &paste, syntax.trim());
    }
    paste_page(&state, &paste)
}

/// Raw content, subject to the hotlink and referer guards. Single byte
/// ranges and `If-Modified-Since` are honoured.
pub async fn raw_paste(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, HttpError> {
    match state.db.pastes.get(&id.to_lowercase())? {
        Some(paste) => raw_response(&state, &paste, &headers),
        None => Ok(not_found_plain()),
    }
}
