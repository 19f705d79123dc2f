use std::collections::HashMap;
use std::sync::OnceLock;

use super::super::domain::ObligationId;

static MODULE_RANK: OnceLock<HashMap<&'static str, usize>> = OnceLock::new();

/// Position of an obligation in the canonical module order. Unknown ids rank last.
pub(crate) fn module_rank(id: &ObligationId) -> usize {
    let ranks = module_ranks();
    ranks.get(id.as_str()).copied().unwrap_or(ranks.len())
}

/// Stable sort into canonical order; unknown ids keep their authored order at the end.
pub(crate) fn sort_canonically(ids: &mut [ObligationId]) {
    ids.sort_by_key(module_rank);
}

fn module_ranks() -> &'static HashMap<&'static str, usize> {
    MODULE_RANK.get_or_init(|| {
        const MODULE_ORDER: &[&str] = &[
            // Product regulation first
            "energy_label",
            "ecodesign_products",
            "tyres",
            // GPP criteria sets, alphabetical
            "gpp-cleaning",
            "gpp-computers",
            "gpp-data-centres",
            "gpp-electricity",
            "gpp-food-catering",
            "gpp-furniture",
            "gpp-imaging-equipment",
            "gpp-office-buildings",
            "gpp-paints",
            "gpp-public-space",
            "gpp-road-design",
            "gpp-road-lighting",
            "gpp-road-transport",
            "gpp-textiles",
            // Services, works, then the general EED duty
            "services_new_products",
            "buildings",
            "algemene_eed",
        ];

        MODULE_ORDER
            .iter()
            .enumerate()
            .map(|(rank, id)| (*id, rank))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<ObligationId> {
        raw.iter().map(|id| ObligationId::from(*id)).collect()
    }

    #[test]
    fn sorts_known_modules_into_canonical_order() {
        let mut modules = ids(&["buildings", "gpp-furniture", "energy_label", "ecodesign_products"]);
        sort_canonically(&mut modules);
        assert_eq!(
            modules,
            ids(&["energy_label", "ecodesign_products", "gpp-furniture", "buildings"])
        );
    }

    #[test]
    fn unknown_modules_trail_in_authored_order() {
        let mut modules = ids(&["zeta", "tyres", "alpha", "algemene_eed"]);
        sort_canonically(&mut modules);
        assert_eq!(modules, ids(&["tyres", "algemene_eed", "zeta", "alpha"]));
    }
}
