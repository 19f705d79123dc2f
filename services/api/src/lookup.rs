use crate::infra::{catalog_source, load_service, CatalogArgs};
use clap::Args;
use std::process::ExitCode;
use tenderforce::config::AppConfig;
use tenderforce::error::AppError;
use tenderforce::obligations::{
    CpvCode, IntegrityReport, Obligation, ObligationService, Resolution, SectionKey,
};

#[derive(Args, Debug)]
pub(crate) struct LookupArgs {
    /// CPV code in NNNNNNNN-C form
    pub(crate) cpv: String,
    /// Print the full obligation records as JSON
    #[arg(long)]
    pub(crate) json: bool,
    #[command(flatten)]
    pub(crate) catalog: CatalogArgs,
}

#[derive(Args, Debug)]
pub(crate) struct SummaryArgs {
    /// CPV code in NNNNNNNN-C form
    pub(crate) cpv: String,
    #[command(flatten)]
    pub(crate) catalog: CatalogArgs,
}

#[derive(Args, Debug)]
pub(crate) struct ShowArgs {
    /// Obligation id, e.g. `energy_label`
    pub(crate) id: String,
    /// Print the record as JSON
    #[arg(long)]
    pub(crate) json: bool,
    #[command(flatten)]
    pub(crate) catalog: CatalogArgs,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CheckArgs {
    #[command(flatten)]
    pub(crate) catalog: CatalogArgs,
}

fn service(catalog: CatalogArgs) -> Result<ObligationService, AppError> {
    let mut config = AppConfig::load()?;
    catalog.apply(&mut config.catalog);
    let source = catalog_source(&config.catalog);
    load_service(&config.catalog, source.as_ref())
}

pub(crate) fn run_lookup(args: LookupArgs) -> Result<ExitCode, AppError> {
    let service = service(args.catalog)?;
    let resolution = service.resolve(&args.cpv)?;

    if args.json {
        let records: Vec<&Obligation> = resolution
            .obligations
            .iter()
            .map(AsRef::as_ref)
            .collect();
        println!("{}", to_json(&records)?);
        return Ok(ExitCode::SUCCESS);
    }

    let Some(code) = resolution.cpv else {
        println!(
            "'{}' is not a CPV code (expected NNNNNNNN-C); no obligations apply",
            args.cpv.trim()
        );
        return Ok(ExitCode::SUCCESS);
    };

    println!("{}", render_lookup(&code, &resolution));
    Ok(ExitCode::SUCCESS)
}

pub(crate) fn run_summary(args: SummaryArgs) -> Result<ExitCode, AppError> {
    let service = service(args.catalog)?;
    let summary = service.obligations_summary(&args.cpv)?;
    println!("{}", to_json(&summary)?);
    Ok(ExitCode::SUCCESS)
}

pub(crate) fn run_show(args: ShowArgs) -> Result<ExitCode, AppError> {
    let service = service(args.catalog)?;
    let Some(obligation) = service.obligation_by_id(&args.id)? else {
        eprintln!("no obligation with id '{}'", args.id.trim());
        return Ok(ExitCode::FAILURE);
    };

    if args.json {
        println!("{}", to_json(obligation.as_ref())?);
    } else {
        println!("{}", render_obligation(&obligation));
    }
    Ok(ExitCode::SUCCESS)
}

pub(crate) fn run_check(args: CheckArgs) -> Result<ExitCode, AppError> {
    let service = service(args.catalog)?;
    let snapshot = service.snapshot()?;
    let report = snapshot.integrity_report();

    println!("{}", render_report(&report, snapshot.baseline().is_enabled()));
    if report.is_clean() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value).map_err(|err| AppError::Io(err.into()))
}

fn render_lookup(code: &CpvCode, resolution: &Resolution) -> String {
    let obligations = &resolution.obligations;
    let summary = resolution.summary();
    if obligations.is_empty() {
        return format!("CPV {code}: no obligations apply");
    }

    let mut flags = Vec::new();
    if summary.has_eed {
        flags.push("EED");
    }
    if summary.has_gpp {
        flags.push("GPP");
    }

    let mut lines = vec![format!(
        "CPV {code}: {} obligation{}{}",
        summary.count,
        if summary.count == 1 { "" } else { "s" },
        if flags.is_empty() {
            String::new()
        } else {
            format!(" ({})", flags.join(", "))
        }
    )];

    for (index, obligation) in obligations.iter().enumerate() {
        lines.push(format!(
            "  {}. {:<24} {}",
            index + 1,
            obligation.obligation_id.as_str(),
            obligation.title
        ));
        if !obligation.badges.is_empty() {
            lines.push(format!("     [{}]", obligation.badges.join(", ")));
        }
    }

    lines.join("\n")
}

fn render_obligation(obligation: &Obligation) -> String {
    let mut lines = vec![
        format!("{} ({})", obligation.title, obligation.obligation_id),
        obligation.summary.clone(),
    ];

    if !obligation.badges.is_empty() {
        lines.push(format!("Badges: {}", obligation.badges.join(", ")));
    }

    for warning in obligation.warnings.iter().flatten() {
        lines.push(format!("! {}: {}", warning.severity.label(), warning.text));
    }

    if !obligation.legal_references.is_empty() {
        lines.push("\nLegal references".to_string());
        for reference in &obligation.legal_references {
            lines.push(format!(
                "- {}: {} <{}>",
                reference.label, reference.citation, reference.url
            ));
        }
    }

    for key in SectionKey::ordered() {
        let Some(section) = obligation.section(key) else {
            continue;
        };
        lines.push(format!(
            "\n{} [{}]",
            section.title,
            section.requirement_level.label()
        ));
        if !section.intro.is_empty() {
            lines.push(section.intro.clone());
        }
        for (index, step) in section.steps.iter().flatten().enumerate() {
            lines.push(format!("  {}. {}", index + 1, step));
        }
        for spec in section.specs.iter().flatten() {
            lines.push(format!("  {} {} ({})", spec.code, spec.text, spec.legal_basis));
        }
        for condition in section.contractual_conditions.iter().flatten() {
            lines.push(format!(
                "  {} {} ({})",
                condition.code, condition.text, condition.legal_basis
            ));
        }
    }

    for warning in obligation.footer_warnings.iter().flatten() {
        lines.push(format!("\n! {}: {}", warning.severity.label(), warning.text));
    }

    lines.join("\n")
}

fn render_report(report: &IntegrityReport, baseline: bool) -> String {
    let mut lines = vec![
        format!("Catalog: {}", report.origin),
        format!("- {} obligations", report.obligations),
        format!(
            "- {} override rules | {} generic rules",
            report.override_rules, report.generic_rules
        ),
        format!(
            "- baseline policy {}",
            if baseline { "enabled" } else { "disabled" }
        ),
    ];

    if report.dangling.is_empty() {
        lines.push("No dangling references".to_string());
    } else {
        lines.push(format!("Dangling references ({}):", report.dangling.len()));
        for reference in &report.dangling {
            lines.push(format!(
                "  - {} rule {} -> '{}'",
                reference.class.label(),
                reference.pattern,
                reference.obligation_id
            ));
        }
    }

    if !report.unreferenced.is_empty() {
        lines.push(format!(
            "Unreachable obligations ({}):",
            report.unreferenced.len()
        ));
        for id in &report.unreferenced {
            lines.push(format!("  - {id}"));
        }
    }

    lines.join("\n")
}
