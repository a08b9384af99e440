use axum::{
    extract::{
        rejection::{FormRejection, PathRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Form,
};
use chrono::{Local, NaiveDateTime};
use serde_json::json;

use crate::{
    error::{json_line, AppError},
    models::notice::{
        is_truthy, parse_timestamp, CreateNoticeForm, NewNotice, NoticeKind, NoticePatch,
        NoticeRecord, ReadNoticeQuery, UpdateNoticeForm,
    },
    services::{notices::NoticeService, status::format_status},
    AppState,
};

fn require(value: Option<String>, field: &'static str) -> Result<String, AppError> {
    value.ok_or(AppError::MissingField(field))
}

/// Bodies that are not url-encoded forms read as empty forms, so the
/// missing-field check answers them.
fn form_or_default<T: Default>(form: Result<Form<T>, FormRejection>) -> T {
    form.map(|Form(form)| form).unwrap_or_default()
}

/// Ids are integers; anything else is an unknown route.
fn notice_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, AppError> {
    path.map(|Path(id)| id).map_err(|_| AppError::UnknownNotice)
}

/// `tweet` is set by any non-empty value.
fn wants_repost(flag: Option<&str>) -> bool {
    flag.is_some_and(|v| !v.is_empty())
}

fn check_api_key(state: &AppState, key: &str) -> Result<(), AppError> {
    if key != state.config.api_key {
        return Err(AppError::InvalidApiKey);
    }
    Ok(())
}

fn parse_kind(raw: &str) -> Result<NoticeKind, AppError> {
    raw.parse().map_err(|_| AppError::InvalidField("type"))
}

fn parse_time(raw: &str, field: &'static str) -> Result<NaiveDateTime, AppError> {
    parse_timestamp(raw).ok_or(AppError::InvalidField(field))
}

/// An empty `end` means "no end yet".
fn parse_end(raw: Option<&str>) -> Result<Option<NaiveDateTime>, AppError> {
    match raw {
        Some(raw) if !raw.trim().is_empty() => parse_time(raw, "end").map(Some),
        _ => Ok(None),
    }
}

fn status_of(state: &AppState, record: &NoticeRecord) -> String {
    format_status(
        record,
        Local::now().naive_local(),
        &state.config.base_uri,
        state.config.concluded_rule,
    )
}

fn record_or_empty(record: Option<NoticeRecord>) -> Response {
    match record {
        Some(record) => json_line(StatusCode::OK, &record),
        None => json_line(StatusCode::OK, &json!({})),
    }
}

/// POST / — store a notice, then post its status.
pub async fn create_notice(
    State(state): State<AppState>,
    form: Result<Form<CreateNoticeForm>, FormRejection>,
) -> Result<Response, AppError> {
    let form = form_or_default(form);
    let kind = require(form.kind, "type")?;
    let service = require(form.service, "service")?;
    let begin = require(form.begin, "begin")?;
    let apikey = require(form.apikey, "apikey")?;
    check_api_key(&state, &apikey)?;

    let notice = NewNotice {
        kind: parse_kind(&kind)?,
        service,
        begin: parse_time(&begin, "begin")?,
        end: parse_end(form.end.as_deref())?,
        detail: form.detail.unwrap_or_default(),
    };

    let id = NoticeService::insert(&state.db, &notice).await?;
    tracing::info!(id, "notice stored");

    let record = NoticeService::fetch_by_id(&state.db, id)
        .await?
        .unwrap_or_else(|| notice.into_record(id));

    // The row stays saved even if posting fails.
    state.notifier.post_status(&status_of(&state, &record)).await?;

    Ok(json_line(StatusCode::OK, &json!({ "message": "Success" })))
}

/// GET /?all=1 | /?issue={id} | / — all notices, one notice, or the latest one.
pub async fn read_notices(
    State(state): State<AppState>,
    Query(query): Query<ReadNoticeQuery>,
) -> Result<Response, AppError> {
    if is_truthy(query.all.as_deref()) {
        let rows = NoticeService::fetch_all(&state.db).await?;
        return Ok(json_line(StatusCode::OK, &rows));
    }

    let row = match query.issue {
        Some(issue) => match issue.trim().parse::<i64>() {
            Ok(id) => NoticeService::fetch_by_id(&state.db, id).await?,
            Err(_) => None,
        },
        None => NoticeService::fetch_latest(&state.db).await?,
    };
    Ok(record_or_empty(row))
}

/// PUT /{id} — partial update, optionally re-posting the status.
pub async fn update_notice(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    form: Result<Form<UpdateNoticeForm>, FormRejection>,
) -> Result<Response, AppError> {
    let id = notice_id(path)?;
    let form = form_or_default(form);
    let apikey = require(form.apikey, "apikey")?;
    check_api_key(&state, &apikey)?;

    let patch = NoticePatch {
        kind: form.kind.as_deref().map(parse_kind).transpose()?,
        service: form.service,
        begin: form
            .begin
            .as_deref()
            .map(|raw| parse_time(raw, "begin"))
            .transpose()?,
        end: parse_end(form.end.as_deref())?,
        detail: form.detail,
    };

    let updated = NoticeService::update(&state.db, id, &patch).await?;
    let record = NoticeService::fetch_by_id(&state.db, id).await?;

    if updated && wants_repost(form.tweet.as_deref()) {
        if let Some(record) = &record {
            if let Err(e) = state.notifier.post_status(&status_of(&state, record)).await {
                tracing::warn!(id, "status post after update failed: {}", e);
            }
        }
    }

    Ok(record_or_empty(record))
}

/// DELETE /{id} — no key check.
pub async fn delete_notice(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Response, AppError> {
    let id = notice_id(path)?;
    NoticeService::delete(&state.db, id).await?;
    Ok(StatusCode::OK.into_response())
}
