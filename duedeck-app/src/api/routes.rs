use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;

use duedeck_core::{service, CoreError, DeckService, UserId};

use crate::api::dto::{DeckOut, ErrorOut};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<DeckService>,
}

#[derive(Deserialize)]
pub struct DeckQuery {
    user: Option<String>,
    /// Evaluate due dates as of this day instead of the server's today.
    today: Option<NaiveDate>,
}

impl DeckQuery {
    fn resolve(self) -> Result<(UserId, NaiveDate), ApiError> {
        let user = self
            .user
            .filter(|u| !u.trim().is_empty())
            .ok_or(ApiError::BadRequest("missing `user` query parameter"))?;
        Ok((UserId::new(user), self.today.unwrap_or_else(service::today)))
    }
}

pub enum ApiError {
    BadRequest(&'static str),
    Core(CoreError),
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        ApiError::Core(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.to_string()),
            ApiError::Core(e) => {
                let status = match &e {
                    CoreError::Fetch { .. } => StatusCode::BAD_GATEWAY,
                    CoreError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                    CoreError::Invalid(_) => StatusCode::BAD_REQUEST,
                    CoreError::DataFormat { .. } | CoreError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                tracing::warn!(error = %e, %status, "deck request failed");
                (status, e.to_string())
            }
        };
        (status, Json(ErrorOut { error: msg })).into_response()
    }
}

pub async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}

pub async fn all_decks(
    State(st): State<Arc<AppState>>,
    Query(q): Query<DeckQuery>,
) -> Result<Json<Vec<DeckOut>>, ApiError> {
    let (user, today) = q.resolve()?;
    let decks = st.service.all_decks(&user, today).await?;
    Ok(Json(decks.iter().map(DeckOut::from).collect()))
}

pub async fn due_decks(
    State(st): State<Arc<AppState>>,
    Query(q): Query<DeckQuery>,
) -> Result<Json<Vec<DeckOut>>, ApiError> {
    let (user, today) = q.resolve()?;
    let decks = st.service.due_decks(&user, today).await?;
    Ok(Json(decks.iter().map(DeckOut::from).collect()))
}
