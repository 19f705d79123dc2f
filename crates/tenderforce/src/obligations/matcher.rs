use super::cpv::CpvCode;
use super::domain::ObligationId;
use super::rules::{MappingRule, RuleClass, RuleTable};

/// Every rule that applied to one code, in evaluation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpvMatch<'a> {
    pub code: CpvCode,
    pub rules: Vec<&'a MappingRule>,
    pub obligation_ids: Vec<ObligationId>,
}

/// Resolve a raw CPV string to the ordered, deduplicated obligation ids whose rules apply.
///
/// Malformed codes resolve to an empty list.
pub fn match_cpv(raw: &str, table: &RuleTable) -> Vec<ObligationId> {
    CpvCode::parse(raw)
        .map(|code| match_code(&code, table).obligation_ids)
        .unwrap_or_default()
}

/// Same as [`match_cpv`] for an already parsed code, keeping the rules that fired.
pub fn match_code<'a>(code: &CpvCode, table: &'a RuleTable) -> CpvMatch<'a> {
    let mut fired: Vec<&'a MappingRule> = Vec::new();
    let mut exclusive = false;

    for class in RuleClass::ordered() {
        if class == RuleClass::Generic && exclusive {
            break;
        }

        for rule in table.rules(class) {
            if rule.pattern.matches(code) {
                exclusive |= rule.exclusive;
                fired.push(rule);
            }
        }
    }

    let mut obligation_ids: Vec<ObligationId> = Vec::new();
    for id in fired.iter().flat_map(|rule| rule.obligation_ids.iter()) {
        if !obligation_ids.contains(id) {
            obligation_ids.push(id.clone());
        }
    }

    CpvMatch {
        code: *code,
        rules: fired,
        obligation_ids,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RuleTable {
        let mut builder = RuleTable::builder();
        builder
            .rule(RuleClass::Generic, "39100000", &["gpp-furniture"])
            .expect("rule")
            .rule(RuleClass::Generic, "39130000", &["gpp-furniture"])
            .expect("rule")
            .rule(RuleClass::Generic, "39711100", &["energy_label", "ecodesign_products"])
            .expect("rule")
            .rule(RuleClass::Generic, "39710000", &["ecodesign_products"])
            .expect("rule")
            .rule(RuleClass::Generic, "45000000", &["gpp-office-buildings"])
            .expect("rule")
            .rule(RuleClass::Override, "39130000-2", &["gpp-furniture"])
            .expect("rule")
            .rule(RuleClass::Override, "45000000-7", &["buildings"])
            .expect("rule")
            .exclusive_override("90510000", &["algemene_eed"])
            .expect("rule")
            .rule(RuleClass::Generic, "90500000", &["services_new_products"])
            .expect("rule");
        builder.build()
    }

    fn ids(raw: &str) -> Vec<String> {
        match_cpv(raw, &table()).into_iter().map(|id| id.0).collect()
    }

    #[test]
    fn malformed_codes_match_nothing() {
        for raw in ["", "abc", "450000007", "45000000", "39130000-22"] {
            assert!(ids(raw).is_empty(), "{raw:?} should not match");
        }
    }

    #[test]
    fn check_digit_does_not_affect_matching() {
        assert_eq!(ids("39130000-2"), ids("39130000-9"));
    }

    #[test]
    fn override_and_generic_matches_are_unioned_once() {
        assert_eq!(ids("39130000-2"), ["gpp-furniture"]);

        let table = table();
        let code = CpvCode::parse("39130000-2").expect("valid code");
        let detail = match_code(&code, &table);
        assert_eq!(detail.rules.len(), 3, "override plus two generic rules fire");
        assert_eq!(detail.rules[0].class, RuleClass::Override);
    }

    #[test]
    fn overrides_come_before_generic_results() {
        assert_eq!(ids("45210000-2"), ["buildings", "gpp-office-buildings"]);
    }

    #[test]
    fn descendants_inherit_broader_rules_most_specific_first() {
        assert_eq!(ids("39711100-5"), ["energy_label", "ecodesign_products"]);
        assert_eq!(ids("39713000-1"), ["ecodesign_products"]);
    }

    #[test]
    fn exclusive_override_suppresses_generic_rules() {
        assert_eq!(ids("90510000-5"), ["algemene_eed"]);
        assert_eq!(ids("90520000-8"), ["services_new_products"]);
    }

    #[test]
    fn unmatched_codes_resolve_to_nothing() {
        assert!(ids("18000000-9").is_empty());
    }

    #[test]
    fn repeated_calls_are_identical() {
        let table = table();
        let first = match_cpv("39711100-5", &table);
        for _ in 0..5 {
            assert_eq!(match_cpv("39711100-5", &table), first);
        }
    }
}
