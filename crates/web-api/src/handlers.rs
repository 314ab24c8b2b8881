//! REST handlers over the compliance engine.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use drivewise_core::{SensorEvent, SpendRequest};
use drivewise_data::RewardTokenRecord;
use drivewise_engine::{
    ComplianceEngine, ComplianceHistory, ComplianceResult, DashboardStats, LeaderboardView,
    SpendReceipt, SyncSummary, VehicleRanking,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ApiError;

const DEFAULT_LEADERBOARD_LIMIT: i64 = 10;

#[derive(Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<i64>,
}

#[derive(Serialize)]
pub struct BlockchainSyncResponse {
    pub status: String,
    pub message: String,
    pub blockchain_status: String,
    pub sync_results: SyncSummary,
}

#[derive(Serialize)]
pub struct BlockchainLeaderboardResponse {
    pub status: String,
    pub message: String,
    pub blockchain_status: String,
}

/// Processes one sensor event into a scored compliance record.
///
/// # Errors
/// Returns 400 for malformed events and 500 when the persistence unit fails.
pub async fn process_sensor_data(
    State(engine): State<Arc<ComplianceEngine>>,
    Json(event): Json<SensorEvent>,
) -> Result<(StatusCode, Json<ComplianceResult>), ApiError> {
    let result = engine.process_sensor_event(&event).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// The ranked leaderboard, freshly recomputed.
///
/// # Errors
/// Returns 500 when the recompute or read fails.
pub async fn get_leaderboard(
    State(engine): State<Arc<ComplianceEngine>>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardView>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT).max(0);
    let view = engine.leaderboard(limit).await?;
    Ok(Json(view))
}

/// A single vehicle's rank.
///
/// # Errors
/// Returns 400 below the qualification threshold, 404 when unknown or not
/// yet ranked.
pub async fn get_vehicle_ranking(
    State(engine): State<Arc<ComplianceEngine>>,
    Path(vehicle_id): Path<String>,
) -> Result<Json<VehicleRanking>, ApiError> {
    let ranking = engine.vehicle_ranking(&vehicle_id).await?;
    Ok(Json(ranking))
}

/// A vehicle's compliance history, newest first.
///
/// # Errors
/// Returns 404 for an unknown vehicle.
pub async fn get_vehicle_compliance(
    State(engine): State<Arc<ComplianceEngine>>,
    Path(vehicle_id): Path<String>,
) -> Result<Json<ComplianceHistory>, ApiError> {
    let history = engine.vehicle_compliance(&vehicle_id).await?;
    Ok(Json(history))
}

/// A vehicle's token ledger.
///
/// # Errors
/// Returns 404 for an unknown vehicle.
pub async fn get_reward_tokens(
    State(engine): State<Arc<ComplianceEngine>>,
    Path(vehicle_id): Path<String>,
) -> Result<Json<RewardTokenRecord>, ApiError> {
    let ledger = engine.vehicle_tokens(&vehicle_id).await?;
    Ok(Json(ledger))
}

/// Spends tokens for a reward.
///
/// # Errors
/// Returns 400 when the balance is insufficient, 404 for an unknown
/// vehicle.
pub async fn spend_tokens(
    State(engine): State<Arc<ComplianceEngine>>,
    Path(vehicle_id): Path<String>,
    Json(request): Json<SpendRequest>,
) -> Result<Json<SpendReceipt>, ApiError> {
    let receipt = engine.spend_tokens(&vehicle_id, &request).await?;
    Ok(Json(receipt))
}

/// Dashboard statistics for one vehicle.
///
/// # Errors
/// Returns 404 for an unknown vehicle.
pub async fn get_dashboard_stats(
    State(engine): State<Arc<ComplianceEngine>>,
    Path(vehicle_id): Path<String>,
) -> Result<Json<DashboardStats>, ApiError> {
    let stats = engine.dashboard_stats(&vehicle_id).await?;
    Ok(Json(stats))
}

/// Pushes all vehicles and records to the chain.
///
/// # Errors
/// Returns 503 when blockchain sync is not configured.
pub async fn sync_to_blockchain(
    State(engine): State<Arc<ComplianceEngine>>,
) -> Result<Json<BlockchainSyncResponse>, ApiError> {
    let summary = engine.sync_all_to_blockchain().await?;
    Ok(Json(BlockchainSyncResponse {
        status: "success".to_string(),
        message: "Data synced to blockchain".to_string(),
        blockchain_status: "connected".to_string(),
        sync_results: summary,
    }))
}

/// Pushes the current leaderboard to the chain.
///
/// # Errors
/// Returns 503 when blockchain sync is not configured.
pub async fn update_blockchain_leaderboard(
    State(engine): State<Arc<ComplianceEngine>>,
) -> Result<Json<BlockchainLeaderboardResponse>, ApiError> {
    engine.update_blockchain_leaderboard().await?;
    Ok(Json(BlockchainLeaderboardResponse {
        status: "success".to_string(),
        message: "Blockchain leaderboard updated".to_string(),
        blockchain_status: "connected".to_string(),
    }))
}
