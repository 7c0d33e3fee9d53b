//! Route handlers and JSON error mapping.

use super::AppState;
use crate::domain::RecordId;
use crate::error::{DataError, MessagingError, RequestError, SearchApiError};
use crate::models::{LeadResult, SearchRequest, SearchSubmission};
use crate::services::{CategoryInput, LeadInput, ListInput, SmsRequest};
use crate::stream::ChannelSink;
use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::header::{AUTHORIZATION, CACHE_CONTROL, CONNECTION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use futures::StreamExt;
use serde::Deserialize;
use serde_json::json;
use std::convert::Infallible;

/// Error returned by any handler, rendered as `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized,
    NotFound(String),
    Upstream(String),
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Unauthorized => "Unauthorized".to_string(),
            Self::BadRequest(m) | Self::NotFound(m) | Self::Upstream(m) | Self::Internal(m) => {
                m.clone()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self.message(), "Request failed");
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<RequestError> for ApiError {
    fn from(err: RequestError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<DataError> for ApiError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::NotFound(_) => Self::NotFound(err.to_string()),
            DataError::InvalidInput(m) => Self::BadRequest(m),
            DataError::Unauthorized => Self::Unauthorized,
            DataError::Storage(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<SearchApiError> for ApiError {
    fn from(err: SearchApiError) -> Self {
        Self::Upstream(err.to_string())
    }
}

impl From<MessagingError> for ApiError {
    fn from(err: MessagingError) -> Self {
        match err {
            MessagingError::InvalidDestination(_)
            | MessagingError::EmptyBody
            | MessagingError::NoAccount => Self::BadRequest(err.to_string()),
            MessagingError::Data(data) => data.into(),
            MessagingError::HttpError(_)
            | MessagingError::ApiError { .. }
            | MessagingError::JsonError(_)
            | MessagingError::Unauthorized => Self::Upstream(err.to_string()),
        }
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// `?id=` on delete and single-record reads.
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    #[serde(default)]
    id: Option<String>,
}

impl IdQuery {
    fn optional(&self) -> ApiResult<Option<RecordId>> {
        self.id
            .as_deref()
            .map(|id| RecordId::new(id).map_err(|e| ApiError::BadRequest(e.to_string())))
            .transpose()
    }

    fn required(&self, kind: &str) -> ApiResult<RecordId> {
        self.optional()?
            .ok_or_else(|| ApiError::BadRequest(format!("{} ID is required", kind)))
    }
}

/// Body of `POST /api/leads`: a streamed result to save, or manual fields.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum NewLeadBody {
    FromResult { result: LeadResult },
    Manual(LeadInput),
}

async fn current_user(state: &AppState, headers: &HeaderMap) -> ApiResult<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    state
        .identity
        .current_user(bearer)
        .await
        .ok_or(ApiError::Unauthorized)
}

/// `GET /health`
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// `GET /metrics`
pub async fn metrics(State(state): State<AppState>) -> Json<crate::metrics::MetricsSummary> {
    Json(state.metrics.summary())
}

/// `POST /api/search`: validate, then stream events as they are produced.
pub async fn search_stream(
    State(state): State<AppState>,
    payload: Result<Json<SearchSubmission>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(submission) = payload?;
    let request = SearchRequest::from_submission(submission, &state.config)?;

    let (mut sink, frames) = ChannelSink::stream(state.config.stream_buffer);
    let controller = state.controller.clone();
    tokio::spawn(async move {
        controller.run(&request, &mut sink).await;
    });

    let body = Body::from_stream(frames.map(Ok::<_, Infallible>));
    Ok((
        [
            (CONTENT_TYPE, "text/event-stream"),
            (CACHE_CONTROL, "no-cache, no-transform"),
            (CONNECTION, "keep-alive"),
        ],
        body,
    )
        .into_response())
}

/// `POST /api/search/results`: every hit, collected, without extraction.
pub async fn search_results(
    State(state): State<AppState>,
    payload: Result<Json<SearchSubmission>, JsonRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let Json(submission) = payload?;
    let request = SearchRequest::from_submission(submission, &state.config)?;
    let results = state.controller.source().collect(&request).await?;
    Ok(Json(json!({ "results": results })))
}

/// `GET /api/leads`
pub async fn list_leads(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<serde_json::Value>> {
    let user = current_user(&state, &headers).await?;
    let leads = state.leads.list_leads(&user).await?;
    Ok(Json(json!({ "leads": leads })))
}

/// `POST /api/leads`
pub async fn create_lead(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<NewLeadBody>, JsonRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let user = current_user(&state, &headers).await?;
    let Json(body) = payload?;
    let lead = match body {
        NewLeadBody::FromResult { result } => state.leads.save_result(&user, &result).await?,
        NewLeadBody::Manual(input) => state.leads.create_lead(&user, input).await?,
    };
    Ok(Json(json!({ "lead": lead })))
}

/// `GET /api/leads/categories`
pub async fn list_categories(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<serde_json::Value>> {
    let user = current_user(&state, &headers).await?;
    let categories = state.leads.list_categories(&user).await?;
    Ok(Json(json!({ "categories": categories })))
}

/// `POST /api/leads/categories`
pub async fn create_category(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CategoryInput>, JsonRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let user = current_user(&state, &headers).await?;
    let Json(input) = payload?;
    let category = state.leads.create_category(&user, input).await?;
    Ok(Json(json!({ "category": category })))
}

/// `PUT /api/leads/categories`
pub async fn update_category(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CategoryInput>, JsonRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let user = current_user(&state, &headers).await?;
    let Json(input) = payload?;
    let category = state.leads.update_category(&user, input).await?;
    Ok(Json(json!({ "category": category })))
}

/// `DELETE /api/leads/categories?id=`
pub async fn delete_category(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<IdQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let user = current_user(&state, &headers).await?;
    let id = query.required("Category")?;
    state.leads.delete_category(&user, &id).await?;
    Ok(Json(json!({ "success": true })))
}

/// `GET /api/leads/lists[?id=]`: all lists, or one list with its leads.
pub async fn get_lists(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<IdQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let user = current_user(&state, &headers).await?;
    match query.optional()? {
        Some(id) => {
            let list = state.leads.resolve_list(&user, &id).await?;
            Ok(Json(json!({ "list": list })))
        }
        None => {
            let lists = state.leads.list_lists(&user).await?;
            Ok(Json(json!({ "lists": lists })))
        }
    }
}

/// `POST /api/leads/lists`
pub async fn create_list(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ListInput>, JsonRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let user = current_user(&state, &headers).await?;
    let Json(input) = payload?;
    let list = state.leads.create_list(&user, input).await?;
    Ok(Json(json!({ "list": list })))
}

/// `PUT /api/leads/lists`
pub async fn update_list(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ListInput>, JsonRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let user = current_user(&state, &headers).await?;
    let Json(input) = payload?;
    let list = state.leads.update_list(&user, input).await?;
    Ok(Json(json!({ "list": list })))
}

/// `DELETE /api/leads/lists?id=`
pub async fn delete_list(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<IdQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let user = current_user(&state, &headers).await?;
    let id = query.required("List")?;
    state.leads.delete_list(&user, &id).await?;
    Ok(Json(json!({ "success": true })))
}

/// `POST /api/sms`
pub async fn send_sms(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<SmsRequest>, JsonRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let user = current_user(&state, &headers).await?;
    let Json(request) = payload?;

    if request.phone_number.trim().is_empty() || request.message.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Phone number and message are required".to_string(),
        ));
    }

    let receipt = state.sms.send(&user, request).await?;
    Ok(Json(json!({
        "success": true,
        "messageId": receipt.sid,
        "status": receipt.status,
    })))
}
