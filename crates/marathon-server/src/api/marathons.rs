use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::NaiveDateTime;
use marathon_core::{korea_now, month_bounds, Region};
use marathon_db::{MarathonFilters, MarathonRow};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct MarathonItem {
    id: i64,
    title: String,
    race_date: NaiveDateTime,
    location: String,
    homepage: String,
    organization_name: String,
    /// Course distances in kilometres.
    courses: Vec<f64>,
    registration_start_date: NaiveDateTime,
    registration_end_date: NaiveDateTime,
}

impl From<MarathonRow> for MarathonItem {
    fn from(row: MarathonRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            race_date: row.race_date,
            location: row.location,
            homepage: row.homepage,
            organization_name: row.organization_name,
            courses: row.course_distances,
            registration_start_date: row.registration_start_date,
            registration_end_date: row.registration_end_date,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct MarathonQuery {
    pub registration_status: Option<bool>,
    pub region: Option<String>,
    pub course: Option<f64>,
    pub race_search_start_date: Option<NaiveDateTime>,
    pub race_search_end_date: Option<NaiveDateTime>,
}

type MarathonListResponse = Result<Json<ApiResponse<Vec<MarathonItem>>>, ApiError>;

pub(super) async fn list_marathons(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<MarathonQuery>,
) -> MarathonListResponse {
    let region = query
        .region
        .as_deref()
        .map(str::parse::<Region>)
        .transpose()
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;

    // A half-open range is ignored rather than applied one-sided.
    let (race_from, race_to) = match (query.race_search_start_date, query.race_search_end_date) {
        (Some(from), Some(to)) => (Some(from), Some(to)),
        _ => (None, None),
    };

    let filters = MarathonFilters {
        open_at: query
            .registration_status
            .unwrap_or(false)
            .then(korea_now),
        region: region.map(|r| r.as_str().to_string()),
        course: query.course,
        race_from,
        race_to,
    };

    query_marathons(&state, req_id, &filters).await
}

pub(super) async fn list_open_registration(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> MarathonListResponse {
    let filters = MarathonFilters {
        open_at: Some(korea_now()),
        ..MarathonFilters::default()
    };
    query_marathons(&state, req_id, &filters).await
}

pub(super) async fn list_this_month(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> MarathonListResponse {
    let (month_start, month_end) = month_bounds(korea_now());
    let filters = MarathonFilters {
        race_from: Some(month_start),
        race_to: Some(month_end),
        ..MarathonFilters::default()
    };
    query_marathons(&state, req_id, &filters).await
}

async fn query_marathons(
    state: &AppState,
    req_id: RequestId,
    filters: &MarathonFilters,
) -> MarathonListResponse {
    let rows = marathon_db::list_marathons(&state.pool, filters)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(MarathonItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}
