use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use contactgate_tenant::TenantHeaders;

use crate::domain::types::{BouncePage, BounceQuery, Lane, MessageStream, StatsQuery};
use crate::error::EmailServiceError;
use crate::handlers::send::parse_lane;
use crate::state::AppState;
use crate::usecase::reporting::ReportingUseCase;

fn reporting(
    state: &AppState,
) -> ReportingUseCase<
    crate::infra::db::DbSettingsRepository,
    crate::infra::db::DbSharedConfigRepository,
    crate::infra::postmark::PostmarkClient,
> {
    ReportingUseCase {
        settings: state.settings_repo(),
        shared: state.shared_config_repo(),
        provider: state.provider.clone(),
        defaults: state.defaults.clone(),
    }
}

// ── GET /email/bounces ───────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct BounceListQuery {
    pub server_type: Option<String>,
    pub count: Option<i64>,
    pub offset: Option<i64>,
    #[serde(rename = "type")]
    pub bounce_type: Option<String>,
    pub inactive: Option<bool>,
    #[serde(rename = "emailFilter")]
    pub email_filter: Option<String>,
    #[serde(rename = "messagestream")]
    pub message_stream: Option<String>,
    #[serde(rename = "fromdate")]
    pub from_date: Option<String>,
    #[serde(rename = "todate")]
    pub to_date: Option<String>,
}

pub async fn get_bounces(
    identity: TenantHeaders,
    State(state): State<AppState>,
    Query(params): Query<BounceListQuery>,
) -> Result<Json<BouncePage>, EmailServiceError> {
    let lane = parse_lane(params.server_type.as_deref(), Lane::Transactional)?;
    let query = BounceQuery {
        count: params.count,
        offset: params.offset,
        bounce_type: params.bounce_type,
        inactive: params.inactive,
        email_filter: params.email_filter,
        message_stream: params.message_stream,
        from_date: params.from_date,
        to_date: params.to_date,
    };
    let page = reporting(&state)
        .list_bounces(identity.tenant_id, lane, query)
        .await?;
    Ok(Json(page))
}

// ── PUT /email/bounces/{id}/activate ─────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct LaneQuery {
    pub server_type: Option<String>,
}

pub async fn reactivate_bounce(
    identity: TenantHeaders,
    State(state): State<AppState>,
    Path(bounce_id): Path<i64>,
    Query(params): Query<LaneQuery>,
) -> Result<StatusCode, EmailServiceError> {
    let lane = parse_lane(params.server_type.as_deref(), Lane::Transactional)?;
    reporting(&state)
        .reactivate_bounce(identity.tenant_id, lane, bounce_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /email/stats ─────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct StatsListQuery {
    pub server_type: Option<String>,
    #[serde(rename = "fromdate")]
    pub from_date: Option<String>,
    #[serde(rename = "todate")]
    pub to_date: Option<String>,
    #[serde(rename = "messagestream")]
    pub message_stream: Option<String>,
    pub tag: Option<String>,
}

pub async fn get_stats(
    identity: TenantHeaders,
    State(state): State<AppState>,
    Query(params): Query<StatsListQuery>,
) -> Result<Json<serde_json::Value>, EmailServiceError> {
    let lane = parse_lane(params.server_type.as_deref(), Lane::Transactional)?;
    let query = StatsQuery {
        from_date: params.from_date,
        to_date: params.to_date,
        message_stream: params.message_stream,
        tag: params.tag,
    };
    let stats = reporting(&state)
        .outbound_stats(identity.tenant_id, lane, query)
        .await?;
    Ok(Json(stats))
}

// ── GET /email/streams ───────────────────────────────────────────────────────

pub async fn list_streams(
    identity: TenantHeaders,
    State(state): State<AppState>,
    Query(params): Query<LaneQuery>,
) -> Result<Json<Vec<MessageStream>>, EmailServiceError> {
    let lane = parse_lane(params.server_type.as_deref(), Lane::Transactional)?;
    let streams = reporting(&state)
        .list_message_streams(identity.tenant_id, lane)
        .await?;
    Ok(Json(streams))
}
