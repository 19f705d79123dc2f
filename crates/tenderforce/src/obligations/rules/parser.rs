use serde::{Deserialize, Deserializer};
use std::io::Read;

use super::super::domain::ObligationId;

/// One row of a rule CSV after trimming and splitting the id list.
#[derive(Debug)]
pub(crate) struct RuleRecord {
    /// 1-based data row, for error messages.
    pub(crate) row: usize,
    pub(crate) cpv: String,
    pub(crate) obligation_ids: Vec<ObligationId>,
    pub(crate) description: Option<String>,
    pub(crate) exclusive: bool,
}

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<RuleRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .comment(Some(b'#'))
        .from_reader(reader);
    let mut records = Vec::new();

    for (index, result) in csv_reader.deserialize::<RuleRow>().enumerate() {
        let row = result?;
        let obligation_ids = row.obligation_ids();
        if obligation_ids.is_empty() {
            continue;
        }

        records.push(RuleRecord {
            row: index + 1,
            cpv: row.cpv,
            obligation_ids,
            description: row.description,
            exclusive: row.exclusive,
        });
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct RuleRow {
    cpv: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    obligations: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    description: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    exclusive: bool,
}

impl RuleRow {
    fn obligation_ids(&self) -> Vec<ObligationId> {
        let mut ids: Vec<ObligationId> = Vec::new();
        for raw in self.obligations.as_deref().unwrap_or_default().split(';') {
            let id = raw.trim();
            if id.is_empty() || ids.iter().any(|existing| existing.as_str() == id) {
                continue;
            }
            ids.push(ObligationId::from(id));
        }
        ids
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(false),
        Some(value) if value.eq_ignore_ascii_case("true") || value == "1" => Ok(true),
        Some(value) if value.eq_ignore_ascii_case("false") || value == "0" => Ok(false),
        Some(value) => Err(serde::de::Error::custom(format!(
            "expected true/false, found '{value}'"
        ))),
    }
}
