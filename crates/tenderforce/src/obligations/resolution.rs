use serde::Serialize;
use std::sync::Arc;

use super::cpv::CpvCode;
use super::domain::{Obligation, ObligationId, BADGE_EED, BADGE_GPP};

/// Outcome of resolving one CPV code against a snapshot.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// `None` when the input was not a well-formed code.
    pub cpv: Option<CpvCode>,
    pub obligations: Vec<Arc<Obligation>>,
    /// Ids a rule referenced that the catalog does not contain.
    pub dangling: Vec<ObligationId>,
}

impl Resolution {
    pub fn is_empty(&self) -> bool {
        self.obligations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.obligations.len()
    }

    pub fn obligation_ids(&self) -> Vec<ObligationId> {
        self.obligations
            .iter()
            .map(|obligation| obligation.obligation_id.clone())
            .collect()
    }

    pub fn summary(&self) -> ObligationsSummary {
        ObligationsSummary::from_obligations(&self.obligations)
    }

    pub fn into_obligations(self) -> Vec<Arc<Obligation>> {
        self.obligations
    }
}

/// Read-only classification of a resolved obligation list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ObligationsSummary {
    pub count: usize,
    #[serde(rename = "hasEED")]
    pub has_eed: bool,
    #[serde(rename = "hasGPP")]
    pub has_gpp: bool,
    #[serde(rename = "obligationIds")]
    pub obligation_ids: Vec<ObligationId>,
}

impl ObligationsSummary {
    pub fn from_obligations(obligations: &[Arc<Obligation>]) -> Self {
        Self {
            count: obligations.len(),
            has_eed: obligations.iter().any(|o| o.has_badge(BADGE_EED)),
            has_gpp: obligations.iter().any(|o| o.has_badge(BADGE_GPP)),
            obligation_ids: obligations
                .iter()
                .map(|o| o.obligation_id.clone())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::catalog::fixtures::obligation;
    use super::*;
    use serde_json::json;

    #[test]
    fn summary_flags_badges_and_keeps_order() {
        let obligations = vec![
            Arc::new(obligation("ecodesign_products", &["EED"])),
            Arc::new(obligation("gpp-computers", &["GPP", "Aanbevolen"])),
        ];
        let summary = ObligationsSummary::from_obligations(&obligations);

        assert_eq!(summary.count, 2);
        assert!(summary.has_eed);
        assert!(summary.has_gpp);
        assert_eq!(
            summary.obligation_ids,
            vec![
                ObligationId::from("ecodesign_products"),
                ObligationId::from("gpp-computers")
            ]
        );
    }

    #[test]
    fn badges_match_literally() {
        let obligations = vec![Arc::new(obligation("algemene_eed", &["eed", "EED-light"]))];
        let summary = ObligationsSummary::from_obligations(&obligations);
        assert!(!summary.has_eed);
        assert!(!summary.has_gpp);
    }

    #[test]
    fn summary_serializes_with_public_field_names() {
        let summary = ObligationsSummary::from_obligations(&[Arc::new(obligation(
            "tyres",
            &["EED"],
        ))]);
        let value = serde_json::to_value(&summary).expect("summary serializes");
        assert_eq!(
            value,
            json!({
                "count": 1,
                "hasEED": true,
                "hasGPP": false,
                "obligationIds": ["tyres"],
            })
        );
    }
}
