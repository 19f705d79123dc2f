//! Resolution of CPV codes into EED and GPP procurement obligations.
//!
//! A [`CatalogSnapshot`] bundles the obligation records with the override and
//! generic rule tables. [`ObligationService`] publishes one snapshot at a time
//! and answers every lookup through [`CatalogSnapshot::resolve`].

pub mod catalog;
pub mod cpv;
pub mod domain;
pub mod matcher;
pub mod resolution;
pub mod router;
pub mod rules;
pub mod service;
pub mod snapshot;
pub mod source;

#[cfg(test)]
mod tests;

pub use catalog::{CatalogIntegrityError, ObligationCatalog};
pub use cpv::{CpvCode, CpvPattern, InvalidPattern};
pub use domain::{
    ContentBlockType, LegalReference, Obligation, ObligationId, ObligationSection,
    RequirementLevel, SectionKey, Warning, WarningSeverity, BADGE_EED, BADGE_GPP,
};
pub use matcher::{match_code, match_cpv, CpvMatch};
pub use resolution::{ObligationsSummary, Resolution};
pub use router::obligation_router;
pub use rules::{MappingRule, RuleClass, RuleError, RuleTable, RuleTableBuilder};
pub use service::{CatalogStatus, ObligationService, ReloadPolicy, ServiceError};
pub use snapshot::{BaselinePolicy, CatalogSnapshot, DanglingReference, IntegrityReport};
pub use source::{BundledSource, CatalogData, CatalogError, CatalogSource, DirectorySource};
