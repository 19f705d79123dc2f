use std::sync::atomic::{AtomicBool, Ordering};

use axum::response::Response;
use serde_json::Value;

use crate::obligations::catalog::fixtures::obligation;
use crate::obligations::catalog::ObligationCatalog;
use crate::obligations::rules::{RuleClass, RuleTable};
use crate::obligations::snapshot::{BaselinePolicy, CatalogSnapshot};
use crate::obligations::source::{CatalogData, CatalogError, CatalogSource};
use crate::obligations::{ObligationService, ReloadPolicy};

pub(super) fn catalog() -> ObligationCatalog {
    ObligationCatalog::from_records(vec![
        obligation("energy_label", &["EED"]),
        obligation("ecodesign_products", &["EED"]),
        obligation("tyres", &["EED"]),
        obligation("gpp-computers", &["GPP"]),
        obligation("gpp-food-catering", &["GPP"]),
        obligation("gpp-furniture", &["GPP"]),
        obligation("buildings", &["EED"]),
        obligation("algemene_eed", &["EED"]),
        obligation("standard_obligations", &[]),
    ])
    .expect("fixture catalog builds")
}

pub(super) fn rules() -> RuleTable {
    let mut builder = RuleTable::builder();
    builder
        .rule(RuleClass::Override, "39130000-2", &["gpp-furniture"])
        .expect("rule")
        .exclusive_override("45000000-7", &["buildings"])
        .expect("rule")
        .rule(RuleClass::Generic, "03000000-1", &["gpp-food-catering"])
        .expect("rule")
        .rule(RuleClass::Generic, "39100000-3", &["gpp-furniture"])
        .expect("rule")
        .rule(RuleClass::Generic, "39130000-2", &["gpp-furniture"])
        .expect("rule")
        .rule(
            RuleClass::Generic,
            "30213000-5",
            &["ecodesign_products", "energy_label", "gpp-computers"],
        )
        .expect("rule")
        .rule(RuleClass::Generic, "45000000-7", &["gpp-furniture"])
        .expect("rule");
    builder.build()
}

pub(super) fn snapshot(baseline: BaselinePolicy) -> CatalogSnapshot {
    CatalogSnapshot::new(catalog(), rules(), baseline, "fixture")
}

pub(super) fn build_service(policy: ReloadPolicy) -> ObligationService {
    ObligationService::new(snapshot(BaselinePolicy::disabled()), policy)
}

pub(super) fn ids(service: &ObligationService, cpv: &str) -> Vec<String> {
    service
        .obligations_by_cpv(cpv)
        .expect("service is serving")
        .iter()
        .map(|obligation| obligation.obligation_id.0.clone())
        .collect()
}

/// Serves the fixture catalog with a single extra rule, or fails on demand.
#[derive(Default)]
pub(super) struct SwitchableSource {
    failing: AtomicBool,
}

impl SwitchableSource {
    pub(super) fn failing() -> Self {
        Self {
            failing: AtomicBool::new(true),
        }
    }

    pub(super) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl CatalogSource for SwitchableSource {
    fn describe(&self) -> String {
        "switchable".to_string()
    }

    fn load(&self) -> Result<CatalogData, CatalogError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CatalogError::NoObligations {
                path: "switchable/obligations".into(),
            });
        }

        let mut builder = RuleTable::builder();
        builder
            .rule(RuleClass::Generic, "34350000-5", &["tyres"])
            .expect("rule");
        Ok(CatalogData {
            catalog: catalog(),
            rules: builder.build(),
        })
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
