use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::domain::{Obligation, ObligationId, SectionKey};

/// Immutable set of obligation records with O(1) lookup by id.
///
/// Records keep the order in which they were loaded so listings stay stable.
#[derive(Debug, Default)]
pub struct ObligationCatalog {
    records: Vec<Arc<Obligation>>,
    index: HashMap<ObligationId, usize>,
}

impl ObligationCatalog {
    /// Build a catalog, rejecting duplicate ids and duplicate section keys.
    pub fn from_records<I>(records: I) -> Result<Self, CatalogIntegrityError>
    where
        I: IntoIterator<Item = Obligation>,
    {
        let mut catalog = Self::default();

        for obligation in records {
            let mut seen_sections: HashSet<SectionKey> = HashSet::new();
            for section in &obligation.sections {
                if !seen_sections.insert(section.key) {
                    return Err(CatalogIntegrityError::DuplicateSection {
                        obligation_id: obligation.obligation_id.clone(),
                        key: section.key,
                    });
                }
            }

            if obligation.obligation_id.as_str().trim().is_empty() {
                return Err(CatalogIntegrityError::EmptyId {
                    title: obligation.title.clone(),
                });
            }

            if catalog.index.contains_key(&obligation.obligation_id) {
                return Err(CatalogIntegrityError::DuplicateObligation(
                    obligation.obligation_id.clone(),
                ));
            }

            catalog
                .index
                .insert(obligation.obligation_id.clone(), catalog.records.len());
            catalog.records.push(Arc::new(obligation));
        }

        Ok(catalog)
    }

    /// Look up one record. Blank ids are simply not found.
    pub fn obligation_by_id(&self, id: &str) -> Option<Arc<Obligation>> {
        let id = id.trim();
        if id.is_empty() {
            return None;
        }

        self.index
            .get(&ObligationId::from(id))
            .map(|position| Arc::clone(&self.records[*position]))
    }

    pub fn contains(&self, id: &ObligationId) -> bool {
        self.index.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &ObligationId> {
        self.records.iter().map(|record| &record.obligation_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Obligation>> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogIntegrityError {
    #[error("obligation '{0}' is defined more than once")]
    DuplicateObligation(ObligationId),
    #[error("obligation '{obligation_id}' repeats section '{}'", .key.label())]
    DuplicateSection {
        obligation_id: ObligationId,
        key: SectionKey,
    },
    #[error("obligation titled '{title}' has an empty obligation_id")]
    EmptyId { title: String },
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::super::domain::{
        Obligation, ObligationId, ObligationSection, RequirementLevel, SectionKey,
    };

    pub(crate) fn obligation(id: &str, badges: &[&str]) -> Obligation {
        Obligation {
            obligation_id: ObligationId::from(id),
            archetype: "fixture".to_string(),
            title: format!("{id} title"),
            summary: format!("{id} summary"),
            badges: badges.iter().map(|badge| badge.to_string()).collect(),
            warnings: None,
            footer_warnings: None,
            legal_references: Vec::new(),
            sections: vec![section(SectionKey::Scope)],
        }
    }

    pub(crate) fn section(key: SectionKey) -> ObligationSection {
        ObligationSection {
            key,
            title: key.label().to_string(),
            requirement_level: RequirementLevel::Mandatory,
            intro: String::new(),
            badges: None,
            warnings: None,
            steps_title: None,
            steps: None,
            steps_ordered: None,
            example_texts: None,
            tabbed_examples: None,
            gunningscriteria_tabs: None,
            contractual_conditions_tabs: None,
            specs: None,
            contractual_conditions: None,
            product_links: None,
            additional_steps: None,
            footer_note: None,
            content_order: None,
        }
    }
}
