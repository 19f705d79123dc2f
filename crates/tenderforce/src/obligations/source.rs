use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use super::catalog::{CatalogIntegrityError, ObligationCatalog};
use super::domain::Obligation;
use super::rules::{RuleError, RuleTable};

const OBLIGATIONS_DIR: &str = "obligations";
const RULES_DIR: &str = "rules";
const OVERRIDES_FILE: &str = "overrides.csv";
const GENERIC_FILE: &str = "generic.csv";

/// Catalog records and rule tables as read from a source, before publication.
#[derive(Debug)]
pub struct CatalogData {
    pub catalog: ObligationCatalog,
    pub rules: RuleTable,
}

/// Anything able to produce a complete catalog in one go.
pub trait CatalogSource: Send + Sync {
    /// Short label used in logs and snapshot metadata.
    fn describe(&self) -> String;

    fn load(&self) -> Result<CatalogData, CatalogError>;
}

/// Data compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledSource;

macro_rules! bundled_obligations {
    ($($file:literal),* $(,)?) => {
        &[$(($file, include_str!(concat!("../../data/obligations/", $file)))),*]
    };
}

const BUNDLED_OBLIGATIONS: &[(&str, &str)] = bundled_obligations![
    "algemene_eed.json",
    "buildings.json",
    "ecodesign_products.json",
    "energy_label.json",
    "gpp-cleaning.json",
    "gpp-computers.json",
    "gpp-data-centres.json",
    "gpp-electricity.json",
    "gpp-food-catering.json",
    "gpp-furniture.json",
    "gpp-imaging-equipment.json",
    "gpp-office-buildings.json",
    "gpp-paints.json",
    "gpp-public-space.json",
    "gpp-road-design.json",
    "gpp-road-lighting.json",
    "gpp-road-transport.json",
    "gpp-textiles.json",
    "services_new_products.json",
    "standard_obligations.json",
    "tyres.json",
];

const BUNDLED_OVERRIDES: &str = include_str!("../../data/rules/overrides.csv");
const BUNDLED_GENERIC: &str = include_str!("../../data/rules/generic.csv");

impl CatalogSource for BundledSource {
    fn describe(&self) -> String {
        "bundled".to_string()
    }

    fn load(&self) -> Result<CatalogData, CatalogError> {
        let mut records = Vec::with_capacity(BUNDLED_OBLIGATIONS.len());
        for (file, contents) in BUNDLED_OBLIGATIONS {
            records.push(parse_obligation(Path::new(file), contents)?);
        }

        assemble(
            records,
            Cursor::new(BUNDLED_OVERRIDES),
            Cursor::new(BUNDLED_GENERIC),
        )
    }
}

/// Same layout as the bundled data, read from disk:
/// `obligations/*.json`, `rules/overrides.csv`, `rules/generic.csv`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn obligation_files(&self) -> Result<Vec<PathBuf>, CatalogError> {
        let dir = self.root.join(OBLIGATIONS_DIR);
        let entries = fs::read_dir(&dir).map_err(|source| CatalogError::Io {
            path: dir.clone(),
            source,
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|source| CatalogError::Io {
                    path: dir.clone(),
                    source,
                })?
                .path();
            if path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        files.sort();

        if files.is_empty() {
            return Err(CatalogError::NoObligations { path: dir });
        }
        Ok(files)
    }

    fn open_rules(&self, file: &str) -> Result<fs::File, CatalogError> {
        let path = self.root.join(RULES_DIR).join(file);
        fs::File::open(&path).map_err(|source| CatalogError::Io { path, source })
    }
}

impl CatalogSource for DirectorySource {
    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    fn load(&self) -> Result<CatalogData, CatalogError> {
        let mut records = Vec::new();
        for path in self.obligation_files()? {
            let contents = fs::read_to_string(&path).map_err(|source| CatalogError::Io {
                path: path.clone(),
                source,
            })?;
            records.push(parse_obligation(&path, &contents)?);
        }

        assemble(
            records,
            self.open_rules(OVERRIDES_FILE)?,
            self.open_rules(GENERIC_FILE)?,
        )
    }
}

fn parse_obligation(path: &Path, contents: &str) -> Result<Obligation, CatalogError> {
    serde_json::from_str(contents).map_err(|source| CatalogError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn assemble<O, G>(
    records: Vec<Obligation>,
    overrides: O,
    generic: G,
) -> Result<CatalogData, CatalogError>
where
    O: std::io::Read,
    G: std::io::Read,
{
    Ok(CatalogData {
        catalog: ObligationCatalog::from_records(records)?,
        rules: RuleTable::from_csv(overrides, generic)?,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid obligation record {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no obligation records found in {}", .path.display())]
    NoObligations { path: PathBuf },
    #[error(transparent)]
    Rules(#[from] RuleError),
    #[error(transparent)]
    Integrity(#[from] CatalogIntegrityError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obligations::domain::SectionKey;
    use crate::obligations::rules::RuleClass;

    #[test]
    fn bundled_data_loads() {
        let data = BundledSource.load().expect("bundled catalog loads");
        assert_eq!(data.catalog.len(), BUNDLED_OBLIGATIONS.len());
        assert!(!data.rules.rules(RuleClass::Override).is_empty());
        assert!(!data.rules.rules(RuleClass::Generic).is_empty());
    }

    #[test]
    fn bundled_file_names_match_their_ids() {
        let data = BundledSource.load().expect("bundled catalog loads");
        for (file, _) in BUNDLED_OBLIGATIONS {
            let id = file.trim_end_matches(".json");
            assert!(
                data.catalog.obligation_by_id(id).is_some(),
                "{file} should define obligation '{id}'"
            );
        }
    }

    #[test]
    fn bundled_records_carry_a_scope_section() {
        let data = BundledSource.load().expect("bundled catalog loads");
        for obligation in data.catalog.iter() {
            assert!(
                obligation.section(SectionKey::Scope).is_some(),
                "{} lacks a scope section",
                obligation.obligation_id
            );
            assert!(!obligation.legal_references.is_empty());
        }
    }
}
