use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;

use super::catalog::ObligationCatalog;
use super::cpv::CpvCode;
use super::domain::ObligationId;
use super::matcher::match_code;
use super::resolution::Resolution;
use super::rules::{RuleClass, RuleTable};

pub(crate) const INTEGRITY_TARGET: &str = "tenderforce::integrity";

/// Optional defaults layered around the rule matches for well-formed codes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaselinePolicy {
    /// Used when no rule matches the code.
    pub fallback: Option<ObligationId>,
    /// Appended last to every well-formed code.
    pub trailing: Option<ObligationId>,
}

impl BaselinePolicy {
    pub fn disabled() -> Self {
        Self::default()
    }

    /// General EED duty for unmatched codes, standard obligations closing every list.
    pub fn standard() -> Self {
        Self {
            fallback: Some(ObligationId::from("algemene_eed")),
            trailing: Some(ObligationId::from("standard_obligations")),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.fallback.is_some() || self.trailing.is_some()
    }

    fn apply(&self, ids: &mut Vec<ObligationId>) {
        if ids.is_empty() {
            if let Some(fallback) = &self.fallback {
                ids.push(fallback.clone());
            }
        }

        if let Some(trailing) = &self.trailing {
            ids.retain(|id| id != trailing);
            ids.push(trailing.clone());
        }
    }

    fn ids(&self) -> impl Iterator<Item = &ObligationId> {
        self.fallback.iter().chain(self.trailing.iter())
    }
}

/// Catalog, rules, and baseline loaded together and published as one unit.
#[derive(Debug)]
pub struct CatalogSnapshot {
    catalog: ObligationCatalog,
    rules: RuleTable,
    baseline: BaselinePolicy,
    origin: String,
    loaded_at: DateTime<Utc>,
}

impl CatalogSnapshot {
    pub fn new(
        catalog: ObligationCatalog,
        rules: RuleTable,
        baseline: BaselinePolicy,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            rules,
            baseline,
            origin: origin.into(),
            loaded_at: Utc::now(),
        }
    }

    pub fn catalog(&self) -> &ObligationCatalog {
        &self.catalog
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn baseline(&self) -> &BaselinePolicy {
        &self.baseline
    }

    /// Where the data came from, e.g. `bundled` or a directory path.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// The single resolution path: match, apply the baseline, hydrate.
    ///
    /// Ids missing from the catalog are dropped and reported on the integrity target.
    pub fn resolve(&self, raw: &str) -> Resolution {
        let Some(code) = CpvCode::parse(raw) else {
            return Resolution::default();
        };

        let mut ids = match_code(&code, &self.rules).obligation_ids;
        self.baseline.apply(&mut ids);

        let mut resolution = Resolution {
            cpv: Some(code),
            obligations: Vec::with_capacity(ids.len()),
            dangling: Vec::new(),
        };

        for id in ids {
            match self.catalog.obligation_by_id(id.as_str()) {
                Some(obligation) => resolution.obligations.push(obligation),
                None => {
                    tracing::warn!(
                        target: INTEGRITY_TARGET,
                        cpv = %code,
                        obligation_id = %id,
                        origin = %self.origin,
                        "rule references an obligation missing from the catalog"
                    );
                    resolution.dangling.push(id);
                }
            }
        }

        resolution
    }

    /// Cross-check rules against the catalog.
    pub fn integrity_report(&self) -> IntegrityReport {
        let mut dangling = Vec::new();
        let mut referenced: HashSet<&ObligationId> = HashSet::new();

        for rule in self.rules.iter() {
            for id in &rule.obligation_ids {
                referenced.insert(id);
                if !self.catalog.contains(id) {
                    dangling.push(DanglingReference {
                        class: rule.class,
                        pattern: rule.pattern.to_string(),
                        obligation_id: id.clone(),
                    });
                }
            }
        }

        for id in self.baseline.ids() {
            referenced.insert(id);
            if !self.catalog.contains(id) {
                dangling.push(DanglingReference {
                    class: RuleClass::Override,
                    pattern: "baseline".to_string(),
                    obligation_id: id.clone(),
                });
            }
        }

        let unreferenced = self
            .catalog
            .ids()
            .filter(|id| !referenced.contains(id))
            .cloned()
            .collect();

        IntegrityReport {
            origin: self.origin.clone(),
            obligations: self.catalog.len(),
            override_rules: self.rules.rules(RuleClass::Override).len(),
            generic_rules: self.rules.rules(RuleClass::Generic).len(),
            dangling,
            unreferenced,
        }
    }
}

/// A rule pointing at an obligation the catalog does not define.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingReference {
    pub class: RuleClass,
    pub pattern: String,
    pub obligation_id: ObligationId,
}

/// Dataset health summary for maintainers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub origin: String,
    pub obligations: usize,
    pub override_rules: usize,
    pub generic_rules: usize,
    pub dangling: Vec<DanglingReference>,
    /// Catalog entries no rule can ever return.
    pub unreferenced: Vec<ObligationId>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.dangling.is_empty()
    }

    pub(crate) fn log(&self) {
        for reference in &self.dangling {
            tracing::warn!(
                target: INTEGRITY_TARGET,
                class = reference.class.label(),
                pattern = %reference.pattern,
                obligation_id = %reference.obligation_id,
                "rule references an obligation missing from the catalog"
            );
        }
        for id in &self.unreferenced {
            tracing::debug!(
                target: INTEGRITY_TARGET,
                obligation_id = %id,
                "obligation is not reachable from any rule"
            );
        }
    }
}
