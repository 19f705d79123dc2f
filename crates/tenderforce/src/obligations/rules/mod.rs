//! CPV mapping rules: the generic range table and the manual overrides pinned on top.

mod ordering;
mod parser;

use serde::Serialize;
use std::collections::HashMap;
use std::io::Read;

use super::cpv::{CpvPattern, InvalidPattern};
use super::domain::ObligationId;

use ordering::sort_canonically;

/// Which table a rule came from. Overrides are always evaluated first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleClass {
    Override,
    Generic,
}

impl RuleClass {
    pub const fn ordered() -> [Self; 2] {
        [Self::Override, Self::Generic]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Override => "Manual override",
            Self::Generic => "Generic",
        }
    }
}

/// A CPV pattern and the obligations it pulls in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRule {
    pub class: RuleClass,
    pub pattern: CpvPattern,
    pub obligation_ids: Vec<ObligationId>,
    pub description: Option<String>,
    /// When a matching override is exclusive, generic rules are skipped for that code.
    pub exclusive: bool,
}

/// Both rule classes, each ordered most-specific first and then by authoring order.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    overrides: Vec<MappingRule>,
    generic: Vec<MappingRule>,
}

impl RuleTable {
    pub fn builder() -> RuleTableBuilder {
        RuleTableBuilder::default()
    }

    /// Parse the two CSV tables.
    pub fn from_csv<O: Read, G: Read>(overrides: O, generic: G) -> Result<Self, RuleError> {
        let mut builder = Self::builder();
        builder.extend_from_csv(RuleClass::Override, overrides)?;
        builder.extend_from_csv(RuleClass::Generic, generic)?;
        Ok(builder.build())
    }

    pub fn rules(&self, class: RuleClass) -> &[MappingRule] {
        match class {
            RuleClass::Override => &self.overrides,
            RuleClass::Generic => &self.generic,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &MappingRule> {
        self.overrides.iter().chain(self.generic.iter())
    }

    pub fn len(&self) -> usize {
        self.overrides.len() + self.generic.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty() && self.generic.is_empty()
    }
}

/// Accumulates rule rows, merging rows of the same class that share a pattern.
#[derive(Debug, Default)]
pub struct RuleTableBuilder {
    rules: Vec<MappingRule>,
    positions: HashMap<(RuleClass, CpvPattern), usize>,
}

impl RuleTableBuilder {
    /// Add one rule. Rows repeating a pattern within a class are merged, with
    /// their ids deduplicated and put into canonical module order.
    pub fn rule(
        &mut self,
        class: RuleClass,
        pattern: &str,
        obligation_ids: &[&str],
    ) -> Result<&mut Self, RuleError> {
        let ids = obligation_ids
            .iter()
            .map(|id| ObligationId::from(*id))
            .collect();
        self.push(class, CpvPattern::parse(pattern)?, ids, None, false);
        Ok(self)
    }

    /// Add one override that suppresses generic rules for the codes it matches.
    pub fn exclusive_override(
        &mut self,
        pattern: &str,
        obligation_ids: &[&str],
    ) -> Result<&mut Self, RuleError> {
        let ids = obligation_ids
            .iter()
            .map(|id| ObligationId::from(*id))
            .collect();
        self.push(RuleClass::Override, CpvPattern::parse(pattern)?, ids, None, true);
        Ok(self)
    }

    pub fn extend_from_csv<R: Read>(
        &mut self,
        class: RuleClass,
        reader: R,
    ) -> Result<&mut Self, RuleError> {
        let records =
            parser::parse_records(reader).map_err(|source| RuleError::Csv { class, source })?;

        for record in records {
            let pattern = CpvPattern::parse(&record.cpv).map_err(|source| RuleError::Pattern {
                class,
                row: record.row,
                source,
            })?;
            if record.exclusive && class == RuleClass::Generic {
                return Err(RuleError::ExclusiveGeneric { row: record.row });
            }
            self.push(
                class,
                pattern,
                record.obligation_ids,
                record.description,
                record.exclusive,
            );
        }

        Ok(self)
    }

    pub fn build(&mut self) -> RuleTable {
        let rules = std::mem::take(&mut self.rules);
        self.positions.clear();

        let (mut overrides, mut generic): (Vec<_>, Vec<_>) = rules
            .into_iter()
            .partition(|rule| rule.class == RuleClass::Override);

        // stable: equal specificity keeps authoring order
        overrides.sort_by_key(|rule| std::cmp::Reverse(rule.pattern.specificity()));
        generic.sort_by_key(|rule| std::cmp::Reverse(rule.pattern.specificity()));

        RuleTable { overrides, generic }
    }

    fn push(
        &mut self,
        class: RuleClass,
        pattern: CpvPattern,
        obligation_ids: Vec<ObligationId>,
        description: Option<String>,
        exclusive: bool,
    ) {
        if obligation_ids.is_empty() {
            return;
        }

        if let Some(position) = self.positions.get(&(class, pattern.clone())) {
            let existing = &mut self.rules[*position];
            for id in obligation_ids {
                if !existing.obligation_ids.contains(&id) {
                    existing.obligation_ids.push(id);
                }
            }
            sort_canonically(&mut existing.obligation_ids);
            existing.exclusive |= exclusive;
            if existing.description.is_none() {
                existing.description = description;
            }
            return;
        }

        let mut ids: Vec<ObligationId> = Vec::with_capacity(obligation_ids.len());
        for id in obligation_ids {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        sort_canonically(&mut ids);

        self.positions.insert((class, pattern.clone()), self.rules.len());
        self.rules.push(MappingRule {
            class,
            pattern,
            obligation_ids: ids,
            description,
            exclusive,
        });
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("invalid {} rule table: {source}", .class.label())]
    Csv {
        class: RuleClass,
        #[source]
        source: csv::Error,
    },
    #[error("{} rule on row {row}: {source}", .class.label())]
    Pattern {
        class: RuleClass,
        row: usize,
        #[source]
        source: InvalidPattern,
    },
    #[error("generic rule on row {row} cannot be exclusive")]
    ExclusiveGeneric { row: usize },
    #[error(transparent)]
    InvalidPattern(#[from] InvalidPattern),
}
