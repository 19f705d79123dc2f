use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};

use super::domain::Obligation;
use super::resolution::{ObligationsSummary, Resolution};
use super::snapshot::{BaselinePolicy, CatalogSnapshot};
use super::source::{BundledSource, CatalogError, CatalogSource};

/// What happens to the published snapshot when a reload fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReloadPolicy {
    /// Keep serving the previous snapshot.
    #[default]
    KeepLastGood,
    /// Stop serving until a reload succeeds.
    FailClosed,
}

impl ReloadPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "keep-last-good" | "keep_last_good" | "last-good" => Some(Self::KeepLastGood),
            "fail-closed" | "fail_closed" | "closed" => Some(Self::FailClosed),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::KeepLastGood => "keep-last-good",
            Self::FailClosed => "fail-closed",
        }
    }
}

#[derive(Debug)]
enum SnapshotState {
    Ready(Arc<CatalogSnapshot>),
    Closed { reason: String },
}

/// Externally visible state of the published catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CatalogStatus {
    Ready {
        origin: String,
        loaded_at: DateTime<Utc>,
        obligations: usize,
        rules: usize,
    },
    Closed {
        reason: String,
    },
}

/// Entry point for resolving CPV codes into obligations.
///
/// Holds one published [`CatalogSnapshot`]; readers clone the `Arc` and resolve
/// without holding the lock, reloads build off-lock and swap in whole.
#[derive(Debug)]
pub struct ObligationService {
    state: RwLock<SnapshotState>,
    baseline: BaselinePolicy,
    policy: ReloadPolicy,
}

impl ObligationService {
    pub fn new(snapshot: CatalogSnapshot, policy: ReloadPolicy) -> Self {
        let baseline = snapshot.baseline().clone();
        Self {
            state: RwLock::new(SnapshotState::Ready(Arc::new(snapshot))),
            baseline,
            policy,
        }
    }

    /// Initial load. There is no previous snapshot to fall back on, so failure is returned.
    pub fn load(
        source: &dyn CatalogSource,
        baseline: BaselinePolicy,
        policy: ReloadPolicy,
    ) -> Result<Self, CatalogError> {
        let snapshot = build_snapshot(source, &baseline)?;
        Ok(Self::new(snapshot, policy))
    }

    /// Bundled data, no baseline, keep-last-good.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::load(
            &BundledSource,
            BaselinePolicy::disabled(),
            ReloadPolicy::default(),
        )
    }

    pub fn policy(&self) -> ReloadPolicy {
        self.policy
    }

    pub fn snapshot(&self) -> Result<Arc<CatalogSnapshot>, ServiceError> {
        let guard = self.state.read().unwrap_or_else(PoisonError::into_inner);
        match &*guard {
            SnapshotState::Ready(snapshot) => Ok(Arc::clone(snapshot)),
            SnapshotState::Closed { reason } => Err(ServiceError::CatalogUnavailable {
                reason: reason.clone(),
            }),
        }
    }

    pub fn resolve(&self, cpv: &str) -> Result<Resolution, ServiceError> {
        Ok(self.snapshot()?.resolve(cpv))
    }

    /// Ordered obligations for a CPV code; empty for unknown or malformed codes.
    pub fn obligations_by_cpv(&self, cpv: &str) -> Result<Vec<Arc<Obligation>>, ServiceError> {
        Ok(self.resolve(cpv)?.into_obligations())
    }

    pub fn obligation_by_id(&self, id: &str) -> Result<Option<Arc<Obligation>>, ServiceError> {
        Ok(self.snapshot()?.catalog().obligation_by_id(id))
    }

    pub fn load_obligation(&self, id: &str) -> Result<Option<Arc<Obligation>>, ServiceError> {
        self.obligation_by_id(id)
    }

    pub fn has_obligations(&self, cpv: &str) -> Result<bool, ServiceError> {
        Ok(!self.obligations_by_cpv(cpv)?.is_empty())
    }

    pub fn obligations_summary(&self, cpv: &str) -> Result<ObligationsSummary, ServiceError> {
        let obligations = self.obligations_by_cpv(cpv)?;
        Ok(ObligationsSummary::from_obligations(&obligations))
    }

    /// Load a fresh snapshot and publish it. On failure the reload policy decides
    /// whether the previous snapshot keeps serving.
    pub fn reload(&self, source: &dyn CatalogSource) -> Result<Arc<CatalogSnapshot>, CatalogError> {
        match build_snapshot(source, &self.baseline) {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
                *guard = SnapshotState::Ready(Arc::clone(&snapshot));
                Ok(snapshot)
            }
            Err(err) => {
                match self.policy {
                    ReloadPolicy::KeepLastGood => {
                        tracing::error!(
                            source = %source.describe(),
                            error = %err,
                            "catalog reload failed; keeping last good snapshot"
                        );
                    }
                    ReloadPolicy::FailClosed => {
                        tracing::error!(
                            source = %source.describe(),
                            error = %err,
                            "catalog reload failed; closing until the next successful reload"
                        );
                        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
                        *guard = SnapshotState::Closed {
                            reason: err.to_string(),
                        };
                    }
                }
                Err(err)
            }
        }
    }

    pub fn status(&self) -> CatalogStatus {
        match self.snapshot() {
            Ok(snapshot) => CatalogStatus::Ready {
                origin: snapshot.origin().to_string(),
                loaded_at: snapshot.loaded_at(),
                obligations: snapshot.catalog().len(),
                rules: snapshot.rules().len(),
            },
            Err(ServiceError::CatalogUnavailable { reason }) => CatalogStatus::Closed { reason },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.snapshot().is_ok()
    }
}

fn build_snapshot(
    source: &dyn CatalogSource,
    baseline: &BaselinePolicy,
) -> Result<CatalogSnapshot, CatalogError> {
    let origin = source.describe();
    let data = source.load()?;
    let snapshot = CatalogSnapshot::new(data.catalog, data.rules, baseline.clone(), origin);

    let report = snapshot.integrity_report();
    report.log();
    tracing::info!(
        origin = %snapshot.origin(),
        obligations = report.obligations,
        override_rules = report.override_rules,
        generic_rules = report.generic_rules,
        dangling = report.dangling.len(),
        baseline = snapshot.baseline().is_enabled(),
        "obligation catalog loaded"
    );

    Ok(snapshot)
}

/// Raised only when no snapshot is being served.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("obligation catalog unavailable: {reason}")]
    CatalogUnavailable { reason: String },
}
