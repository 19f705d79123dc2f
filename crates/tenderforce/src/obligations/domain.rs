use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable, human-readable slug identifying one obligation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObligationId(pub String);

impl ObligationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObligationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObligationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Classification labels carried by obligations. Never consulted while matching.
pub const BADGE_EED: &str = "EED";
pub const BADGE_GPP: &str = "GPP";

/// A structured legal requirement record attached to one or more CPV codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obligation {
    pub obligation_id: ObligationId,
    pub archetype: String,
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub badges: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<Warning>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer_warnings: Option<Vec<Warning>>,
    #[serde(default)]
    pub legal_references: Vec<LegalReference>,
    #[serde(default)]
    pub sections: Vec<ObligationSection>,
}

impl Obligation {
    pub fn has_badge(&self, badge: &str) -> bool {
        self.badges.iter().any(|candidate| candidate == badge)
    }

    pub fn section(&self, key: SectionKey) -> Option<&ObligationSection> {
        self.sections.iter().find(|section| section.key == key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalReference {
    pub label: String,
    pub citation: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningSeverity {
    Red,
    Yellow,
    Positive,
}

impl WarningSeverity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Red => "Red",
            Self::Yellow => "Yellow",
            Self::Positive => "Positive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub severity: WarningSeverity,
    pub text: String,
}

/// Closed set of section kinds an obligation may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKey {
    Scope,
    TechnicalSpecs,
    Gunningscriteria,
    ExecutionConditions,
}

impl SectionKey {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Scope,
            Self::TechnicalSpecs,
            Self::Gunningscriteria,
            Self::ExecutionConditions,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Scope => "Scope",
            Self::TechnicalSpecs => "Technical specifications",
            Self::Gunningscriteria => "Award criteria",
            Self::ExecutionConditions => "Contract performance conditions",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequirementLevel {
    #[serde(rename = "verplicht")]
    Mandatory,
    #[serde(rename = "voorwaardelijk_verplicht")]
    ConditionallyMandatory,
    #[serde(rename = "aanbevolen")]
    Recommended,
    #[serde(rename = "optioneel")]
    Optional,
}

impl RequirementLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Mandatory => "Mandatory",
            Self::ConditionallyMandatory => "Conditionally mandatory",
            Self::Recommended => "Recommended",
            Self::Optional => "Optional",
        }
    }
}

/// Named content blocks a renderer may lay out in `content_order`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentBlockType {
    Intro,
    Warnings,
    Steps,
    ExampleTexts,
    TabbedExamples,
    Specs,
    GunningscriteriaTabs,
    ContractualConditions,
    ContractualConditionsTabs,
    ProductLinks,
    AdditionalSteps,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObligationSection {
    pub key: SectionKey,
    pub title: String,
    pub requirement_level: RequirementLevel,
    #[serde(default)]
    pub intro: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badges: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<Warning>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps_ordered: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_texts: Option<Vec<ExampleText>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tabbed_examples: Option<TabbedExamples>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gunningscriteria_tabs: Option<GunningscriteriaTabs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contractual_conditions_tabs: Option<ContractualConditionTabs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specs: Option<Vec<Spec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contractual_conditions: Option<Vec<ContractualCondition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_links: Option<Vec<ProductLink>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_steps: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer_note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_order: Option<Vec<ContentBlockType>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleText {
    pub label: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabbedExample {
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabbedExamples {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basis: Option<Vec<TabbedExample>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ambitieus: Option<Vec<TabbedExample>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spec {
    pub code: String,
    pub text: String,
    pub legal_basis: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirement_level: Option<RequirementLevel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractualCondition {
    pub code: String,
    pub text: String,
    pub legal_basis: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GunningscriteriumItem {
    pub code: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<String>>,
    pub legal_basis: String,
}

/// Award criteria grouped by theme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GunningscriteriaTabs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circulariteit: Option<Vec<GunningscriteriumItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milieu_impact: Option<Vec<GunningscriteriumItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sociaal: Option<Vec<GunningscriteriumItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kwaliteit_levensduur: Option<Vec<GunningscriteriumItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificering_labels: Option<Vec<GunningscriteriumItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logistiek_transport: Option<Vec<GunningscriteriumItem>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractualConditionTabs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arbeidsomstandigheden: Option<Vec<ContractualCondition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sociale_normen: Option<Vec<ContractualCondition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milieunormen: Option<Vec<ContractualCondition>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductLink {
    pub label: String,
    pub url: String,
}
