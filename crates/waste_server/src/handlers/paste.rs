//! Paste mutation endpoints (`POST`, `PUT`, `DELETE` on `/` and `/{id}`).

use super::request::{
    content_length, disposition_filename, owner_token, paste_url, requested_syntax,
};
use crate::{error::HttpError, AppState};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, Method},
    response::{Html, IntoResponse, Response},
};
use futures::StreamExt;
use waste_core::delivery::is_renderable;
use waste_core::gate::ContentGate;
use waste_core::mutation::{PasteMutator, WriteMethod, WriteOutcome, WriteRequest, WriteStep};
use waste_core::AppError;

fn write_method(method: &Method) -> Result<WriteMethod, AppError> {
    match *method {
        Method::POST => Ok(WriteMethod::Post),
        Method::PUT => Ok(WriteMethod::Put),
        Method::DELETE => Ok(WriteMethod::Delete),
        _ => Err(AppError::BadRequest(format!("Unsupported method {}", method))),
    }
}

/// Stream the request body, refusing it as soon as it grows past the limit.
async fn read_body(gate: &ContentGate, body: Body) -> Result<Vec<u8>, AppError> {
    let mut capped = gate.capped_body();
    let mut stream = body.into_data_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk
            .map_err(|err| AppError::BadRequest(format!("Failed to read request body: {}", err)))?;
        capped.push(&chunk)?;
    }
    Ok(capped.finish())
}

fn outcome_response(
    state: &AppState,
    headers: &HeaderMap,
    outcome: WriteOutcome,
    render_fragment: bool,
) -> Result<Response, HttpError> {
    let paste = match outcome {
        WriteOutcome::Deleted(_) => return Ok("Deleted\n".into_response()),
        WriteOutcome::Created(paste) | WriteOutcome::Updated(paste) | WriteOutcome::Renamed(paste) => {
            paste
        }
    };

    let mut response = if render_fragment && is_renderable(&paste.content, &state.delivery) {
        Html(state.renderer.render(&paste.content, &paste.syntax)?).into_response()
    } else {
        format!("{}\n", paste_url(headers, &state.config, &paste.id)).into_response()
    };

    let location = HeaderValue::from_str(&format!("/{}", paste.id)).map_err(|err| {
        tracing::error!(id = %paste.id, "Invalid content location: {}", err);
        AppError::Internal
    })?;
    response
        .headers_mut()
        .insert(header::CONTENT_LOCATION, location);
    Ok(response)
}

async fn write(
    state: AppState,
    method: Method,
    target: String,
    headers: HeaderMap,
    body: Body,
) -> Result<Response, HttpError> {
    let syntax = requested_syntax(&headers);
    let render_fragment = syntax.is_some();
    let request = WriteRequest::new(write_method(&method)?, target)
        .with_token(owner_token(&headers))
        .with_name(disposition_filename(&headers).unwrap_or_default())
        .with_declared_len(content_length(&headers))
        .with_syntax(syntax);

    let mutator = PasteMutator::from_config(&state.db, &state.config);
    let pending = match mutator.begin(request)? {
        WriteStep::Done(outcome) => {
            return outcome_response(&state, &headers, outcome, render_fragment)
        }
        WriteStep::NeedBody(pending) => pending,
    };

    let body = read_body(mutator.gate(), body).await?;
    let outcome = mutator.finish(pending, body)?;
    outcome_response(&state, &headers, outcome, render_fragment)
}

/// Create a paste under a freshly allocated id.
pub async fn write_root(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Body,
) -> Result<Response, HttpError> {
    write(state, method, String::new(), headers, body).await
}

/// Update, rename or delete `/{id}`; a PUT to an unknown id creates a paste
/// named after the path.
pub async fn write_paste(
    State(state): State<AppState>,
    method: Method,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Body,
) -> Result<Response, HttpError> {
    write(state, method, id, headers, body).await
}
