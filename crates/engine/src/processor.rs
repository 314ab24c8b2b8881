//! The event-processing unit.
//!
//! `ComplianceEngine` turns validated sensor events into scored records,
//! token awards, and fresh rankings. Record insert and token award share
//! one transaction; blockchain sync is best-effort and never fails the
//! operation.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use drivewise_core::{
    BlockchainSync, EngineError, SensorEvent, SignObservation, SignValue, SpendRequest,
    TokenPolicy, VehicleAggregate, VehicleType, ViolationType, MIN_LEADERBOARD_TRIPS,
};
use drivewise_data::{
    ComplianceRecord, Repositories, RewardTokenRecord, TrafficSignRecord, VehicleRecord,
};

use crate::ranker::LeaderboardRanker;
use crate::views::{
    qualification_status, ranking_criteria, ComplianceHistory, ComplianceResult, DashboardStats,
    LeaderboardEntryView, LeaderboardView, SpendReceipt, SyncSummary, VehicleRanking,
};

/// How many records the dashboard shows.
const DASHBOARD_RECENT_RECORDS: usize = 10;

/// Vehicles created implicitly by an ingest default to this type.
const DEFAULT_VEHICLE_TYPE: VehicleType = VehicleType::FourWheeler;

/// Scoring, awarding, and ranking over a shared store.
pub struct ComplianceEngine {
    repos: Repositories,
    blockchain: Arc<dyn BlockchainSync>,
    token_policy: TokenPolicy,
    ranker: Arc<LeaderboardRanker>,
}

impl ComplianceEngine {
    /// Creates the engine with its collaborators.
    #[must_use]
    pub fn new(
        repos: Repositories,
        blockchain: Arc<dyn BlockchainSync>,
        token_policy: TokenPolicy,
    ) -> Self {
        let ranker = Arc::new(LeaderboardRanker::new(repos.clone()));
        Self {
            repos,
            blockchain,
            token_policy,
            ranker,
        }
    }

    /// The shared ranker, for on-demand recomputes.
    #[must_use]
    pub fn ranker(&self) -> Arc<LeaderboardRanker> {
        Arc::clone(&self.ranker)
    }

    /// Processes one inbound sensor event end to end: validate, score,
    /// persist record and token award atomically, sync best-effort, rerank.
    ///
    /// # Errors
    /// Returns [`EngineError::Validation`] for malformed events and
    /// [`EngineError::Storage`] when the persistence unit fails; a partial
    /// failure leaves no state behind.
    pub async fn process_sensor_event(
        &self,
        event: &SensorEvent,
    ) -> Result<ComplianceResult, EngineError> {
        event.validate()?;
        let sign_value = SignValue::resolve(event.sign_type, event.sign_value.as_ref())?;

        let vehicle_id = event.vehicle_id.trim().to_string();
        let vehicle = self
            .repos
            .vehicles
            .get_or_create(&VehicleRecord::new(
                vehicle_id,
                DEFAULT_VEHICLE_TYPE,
                Some("Unknown".to_string()),
                Utc::now(),
            ))
            .await?;
        let vehicle_type = vehicle.parsed_type().unwrap_or(DEFAULT_VEHICLE_TYPE);

        let sign = TrafficSignRecord::new(
            event.sign_type,
            sign_value,
            event.location.clone(),
            Utc::now(),
        );
        let sign_id = self.repos.traffic_signs.insert(&sign).await?;

        let observation = SignObservation::from_event(event, sign_value, vehicle_type);
        let mut record = ComplianceRecord::from_observation(
            vehicle.vehicle_id.clone(),
            sign_id,
            event.session_id.clone(),
            &observation,
            Utc::now(),
        );
        // The score is derived, never trusted: recompute right before the
        // record is persisted.
        let outcome = record.rescore();
        let tokens_awarded = self.token_policy.award(outcome.compliance_score);

        self.persist_event_unit(&record, tokens_awarded).await?;

        if let Err(err) = self
            .blockchain
            .sync_vehicle(&vehicle.vehicle_id, vehicle_type, vehicle.owner_display())
            .await
        {
            tracing::warn!(vehicle_id = %vehicle.vehicle_id, error = %err, "vehicle sync failed");
        }
        if let Err(err) = self
            .blockchain
            .sync_record(
                &vehicle.vehicle_id,
                outcome.violation_type,
                outcome.severity,
                outcome.compliance_score,
            )
            .await
        {
            tracing::warn!(vehicle_id = %vehicle.vehicle_id, error = %err, "record sync failed");
        }

        self.ranker.update_all_rankings().await?;

        let total_trips = self
            .repos
            .compliance
            .count_by_vehicle(&vehicle.vehicle_id)
            .await?;
        let current_rank = self.current_rank(&vehicle.vehicle_id).await?;

        tracing::info!(
            vehicle_id = %vehicle.vehicle_id,
            compliance_score = outcome.compliance_score,
            violation_type = outcome.violation_type.as_str(),
            tokens_awarded,
            "sensor event processed"
        );

        Ok(ComplianceResult::from_outcome(
            &outcome,
            tokens_awarded,
            total_trips,
            current_rank,
        ))
    }

    /// Spends tokens from a vehicle's ledger.
    ///
    /// # Errors
    /// Returns [`EngineError::NotFound`] for an unknown vehicle and
    /// [`EngineError::InsufficientBalance`] when the balance cannot cover
    /// the amount; the ledger is untouched in that case.
    pub async fn spend_tokens(
        &self,
        vehicle_id: &str,
        request: &SpendRequest,
    ) -> Result<SpendReceipt, EngineError> {
        request.validate()?;
        let vehicle = self.require_vehicle(vehicle_id).await?;

        // Make sure the ledger row exists so a zero spend on a fresh
        // vehicle succeeds instead of reporting insufficient funds.
        let ledger = self.repos.tokens.get_or_create(&vehicle.vehicle_id).await?;

        match self
            .repos
            .tokens
            .try_spend(&vehicle.vehicle_id, request.amount)
            .await?
        {
            Some(updated) => {
                if let Err(err) = self
                    .blockchain
                    .claim_reward(&vehicle.vehicle_id, &request.reward_type, request.amount)
                    .await
                {
                    tracing::warn!(vehicle_id = %vehicle.vehicle_id, error = %err, "reward claim sync failed");
                }
                Ok(SpendReceipt {
                    status: "success".to_string(),
                    message: format!(
                        "Successfully spent {} tokens for {}",
                        request.amount, request.reward_type
                    ),
                    tokens_available: updated.tokens_available(),
                })
            }
            None => Err(EngineError::InsufficientBalance {
                available: ledger.tokens_available(),
                requested: request.amount,
            }),
        }
    }

    /// A vehicle's full compliance history with aggregate stats.
    ///
    /// # Errors
    /// Returns [`EngineError::NotFound`] for an unknown vehicle.
    pub async fn vehicle_compliance(
        &self,
        vehicle_id: &str,
    ) -> Result<ComplianceHistory, EngineError> {
        let vehicle = self.require_vehicle(vehicle_id).await?;
        let records = self
            .repos
            .compliance
            .query_by_vehicle(&vehicle.vehicle_id)
            .await?;
        let aggregate = aggregate_of(&records);

        Ok(ComplianceHistory {
            vehicle_id: vehicle.vehicle_id,
            total_records: aggregate.total_trips,
            compliance_rate: aggregate.compliance_rate,
            total_violations: aggregate.total_violations,
            records,
        })
    }

    /// A vehicle's token ledger, created empty when absent.
    ///
    /// # Errors
    /// Returns [`EngineError::NotFound`] for an unknown vehicle.
    pub async fn vehicle_tokens(&self, vehicle_id: &str) -> Result<RewardTokenRecord, EngineError> {
        let vehicle = self.require_vehicle(vehicle_id).await?;
        let ledger = self.repos.tokens.get_or_create(&vehicle.vehicle_id).await?;
        Ok(ledger)
    }

    /// Dashboard statistics for one vehicle.
    ///
    /// # Errors
    /// Returns [`EngineError::NotFound`] for an unknown vehicle.
    pub async fn dashboard_stats(&self, vehicle_id: &str) -> Result<DashboardStats, EngineError> {
        let vehicle = self.require_vehicle(vehicle_id).await?;
        let records = self
            .repos
            .compliance
            .query_by_vehicle(&vehicle.vehicle_id)
            .await?;
        let aggregate = aggregate_of(&records);
        let ledger = self.repos.tokens.get_or_create(&vehicle.vehicle_id).await?;
        let current_rank = self.current_rank(&vehicle.vehicle_id).await?;

        let recent_records: Vec<ComplianceRecord> = records
            .into_iter()
            .take(DASHBOARD_RECENT_RECORDS)
            .collect();

        Ok(DashboardStats {
            vehicle_id: vehicle.vehicle_id,
            total_trips: aggregate.total_trips,
            total_violations: aggregate.total_violations,
            compliance_rate: aggregate.compliance_rate,
            average_compliance_score: aggregate.average_compliance_score,
            qualification_status: qualification_status(aggregate.total_trips, current_rank),
            current_rank,
            tokens_earned: ledger.tokens_earned,
            tokens_available: ledger.tokens_available(),
            recent_records,
        })
    }

    /// A single vehicle's ranking.
    ///
    /// # Errors
    /// Returns [`EngineError::NotQualified`] below the trip threshold and
    /// [`EngineError::NotFound`] when the vehicle is qualified but the
    /// ranker has not assigned it a rank yet.
    pub async fn vehicle_ranking(&self, vehicle_id: &str) -> Result<VehicleRanking, EngineError> {
        let vehicle = self.require_vehicle(vehicle_id).await?;
        let total_trips = self
            .repos
            .compliance
            .count_by_vehicle(&vehicle.vehicle_id)
            .await?;
        if total_trips < MIN_LEADERBOARD_TRIPS {
            return Err(EngineError::NotQualified {
                total_trips,
                needed: MIN_LEADERBOARD_TRIPS - total_trips,
            });
        }

        let entry = self
            .repos
            .leaderboard
            .get_by_vehicle(&vehicle.vehicle_id)
            .await?
            .filter(|entry| entry.rank > 0)
            .ok_or_else(|| {
                EngineError::NotFound(format!("ranking for vehicle {}", vehicle.vehicle_id))
            })?;

        Ok(VehicleRanking {
            vehicle_id: entry.vehicle_id,
            rank: entry.rank,
            total_trips: entry.total_trips,
            total_violations: entry.total_violations,
            compliance_rate: entry.compliance_rate,
            average_compliance_score: entry.average_compliance_score,
            total_tokens_earned: entry.total_tokens_earned,
        })
    }

    /// The ranked leaderboard, recomputed before the read.
    ///
    /// # Errors
    /// Returns [`EngineError::Storage`] when the recompute or read fails.
    pub async fn leaderboard(&self, limit: i64) -> Result<LeaderboardView, EngineError> {
        self.ranker.update_all_rankings().await?;

        let rows = self.repos.leaderboard.list_ranked(limit.max(0)).await?;
        let total_qualified = self
            .repos
            .vehicles
            .count_qualifying(MIN_LEADERBOARD_TRIPS)
            .await?;

        Ok(LeaderboardView {
            leaderboard: rows.into_iter().map(LeaderboardEntryView::from).collect(),
            total_qualified_vehicles: total_qualified,
            minimum_entries_required: MIN_LEADERBOARD_TRIPS,
            ranking_criteria: ranking_criteria(),
            blockchain_connected: self.blockchain.is_connected(),
            last_updated: Utc::now(),
        })
    }

    /// Pushes every vehicle and its records to the chain.
    ///
    /// # Errors
    /// Returns [`EngineError::BlockchainUnavailable`] when sync is not
    /// configured. Individual sync failures are logged and skipped.
    pub async fn sync_all_to_blockchain(&self) -> Result<SyncSummary, EngineError> {
        if !self.blockchain.is_connected() {
            return Err(EngineError::BlockchainUnavailable);
        }

        let mut summary = SyncSummary {
            vehicles_synced: 0,
            records_synced: 0,
        };
        for vehicle in self.repos.vehicles.list_all().await? {
            let vehicle_type = vehicle.parsed_type().unwrap_or(DEFAULT_VEHICLE_TYPE);
            match self
                .blockchain
                .sync_vehicle(&vehicle.vehicle_id, vehicle_type, vehicle.owner_display())
                .await
            {
                Ok(()) => summary.vehicles_synced += 1,
                Err(err) => {
                    tracing::warn!(vehicle_id = %vehicle.vehicle_id, error = %err, "vehicle sync failed");
                    continue;
                }
            }

            for record in self
                .repos
                .compliance
                .query_by_vehicle(&vehicle.vehicle_id)
                .await?
            {
                let violation_type = record
                    .parsed_violation_type()
                    .unwrap_or(ViolationType::NoViolation);
                let severity = record
                    .parsed_severity()
                    .unwrap_or(drivewise_core::Severity::Low);
                match self
                    .blockchain
                    .sync_record(
                        &record.vehicle_id,
                        violation_type,
                        severity,
                        record.compliance_score,
                    )
                    .await
                {
                    Ok(()) => summary.records_synced += 1,
                    Err(err) => {
                        tracing::warn!(record_id = record.id, error = %err, "record sync failed");
                    }
                }
            }
        }

        Ok(summary)
    }

    /// Pushes the current leaderboard to the chain.
    ///
    /// # Errors
    /// Returns [`EngineError::BlockchainUnavailable`] when sync is not
    /// configured, or the sync error itself for this explicit operation.
    pub async fn update_blockchain_leaderboard(&self) -> Result<(), EngineError> {
        if !self.blockchain.is_connected() {
            return Err(EngineError::BlockchainUnavailable);
        }
        self.blockchain.update_leaderboard().await?;
        Ok(())
    }

    async fn require_vehicle(&self, vehicle_id: &str) -> Result<VehicleRecord, EngineError> {
        self.repos
            .vehicles
            .get(vehicle_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("vehicle {vehicle_id}")))
    }

    async fn current_rank(&self, vehicle_id: &str) -> Result<Option<i32>, EngineError> {
        let rank = self
            .repos
            .leaderboard
            .get_by_vehicle(vehicle_id)
            .await?
            .map(|entry| entry.rank)
            .filter(|rank| *rank > 0);
        Ok(rank)
    }

    /// Record insert and token award as one unit: both commit or neither.
    async fn persist_event_unit(&self, record: &ComplianceRecord, delta: i64) -> Result<i32> {
        let mut tx = self.repos.pool().begin().await?;
        let record_id = self.repos.compliance.insert_in_tx(&mut tx, record).await?;
        self.repos
            .tokens
            .award_in_tx(&mut tx, &record.vehicle_id, delta)
            .await?;
        tx.commit().await?;
        Ok(record_id)
    }
}

fn aggregate_of(records: &[ComplianceRecord]) -> VehicleAggregate {
    VehicleAggregate::from_history(records.iter().map(|record| {
        (
            record
                .parsed_violation_type()
                .unwrap_or(ViolationType::NoViolation),
            record.compliance_score,
        )
    }))
}
