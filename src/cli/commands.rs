use crate::check::{registry, run_checks, Finding};
use crate::config::ExportConfig;
use crate::error::{ExportError, ExportResult};
use crate::export::{DirectoryTarget, ExportPass, PassReport};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Path overrides given on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub output_dir: Option<PathBuf>,
    pub source_root: Option<PathBuf>,
    pub asset_root: Option<PathBuf>,
    pub scope: Option<String>,
}

/// Load the config directory and apply command line overrides
pub fn load_config(config_dir: &Path, overrides: &Overrides) -> ExportResult<ExportConfig> {
    let mut config = ExportConfig::load(config_dir)?;
    if let Some(dir) = &overrides.output_dir {
        config.settings.output_dir = dir.clone();
    }
    if let Some(dir) = &overrides.source_root {
        config.settings.source_root = dir.clone();
    }
    if let Some(dir) = &overrides.asset_root {
        config.settings.asset_root = dir.clone();
    }
    if let Some(scope) = &overrides.scope {
        config.restrict_scope(scope)?;
    }
    Ok(config)
}

/// Execute the export command: every pass over every workbook, then checks
pub fn export(
    config_dir: PathBuf,
    overrides: Overrides,
    skip_checks: bool,
    verbose: bool,
) -> ExportResult<()> {
    println!("{}", "📤 SheetForge - Export".bold().green());
    println!("   Config: {}", config_dir.display());

    let config = load_config(&config_dir, &overrides)?;
    let output_dir = config.output_dir();
    println!("   Output: {}", output_dir.display());
    println!("   Workbooks: {}\n", config.files.len());

    let localized = config.load_localized_text()?;
    if let Some(text) = &localized {
        if verbose {
            println!(
                "   Localized text: {} entries, languages {:?}\n",
                text.len(),
                config.languages
            );
        }
    }

    let workbooks = config.workbooks();
    let mut target = DirectoryTarget::new(&output_dir);
    let mut reports: Vec<PassReport> = Vec::new();

    for options in config.pass_options(localized.as_ref()) {
        println!(
            "{}",
            format!("▶ Export pass '{}'", options.scope).bold().cyan()
        );
        let report = ExportPass::new(&options).run(&workbooks, &mut target);
        print_pass(&report, verbose);
        reports.push(report);
    }

    if !skip_checks {
        print_findings(&run_checks(&registry(&config)));
    }

    let failures: usize = reports.iter().map(|r| r.failures.len()).sum();
    if failures > 0 {
        println!(
            "{}",
            format!("❌ Export finished with {} failure(s)", failures)
                .bold()
                .red()
        );
        return Err(ExportError::Failed(format!(
            "{} sheet(s) or workbook(s) failed to export",
            failures
        )));
    }

    println!("{}", "✅ Export complete".bold().green());
    Ok(())
}

/// Execute the check command: post-export checks only
pub fn check(config_dir: PathBuf, overrides: Overrides) -> ExportResult<()> {
    println!("{}", "🔍 SheetForge - Post-export checks".bold().green());
    println!("   Config: {}\n", config_dir.display());

    let config = load_config(&config_dir, &overrides)?;
    let checks = registry(&config);
    if checks.is_empty() {
        println!("{}", "⚠️  No checks configured".yellow());
        return Ok(());
    }

    print_findings(&run_checks(&checks));
    Ok(())
}

fn print_pass(report: &PassReport, verbose: bool) {
    for sheet in &report.sheets {
        if verbose {
            println!(
                "   📊 {} ({} columns, {} rows, {} translations)",
                sheet.sheet.bright_blue(),
                sheet.columns,
                sheet.rows,
                sheet.translations
            );
        } else {
            println!("   📊 {} ({} rows)", sheet.sheet.bright_blue(), sheet.rows);
        }
    }
    for failure in &report.failures {
        println!(
            "   {} {}: {}",
            "❌".red(),
            failure.workbook.display(),
            failure.error.to_string().red()
        );
    }
    println!();
}

fn print_findings(findings: &[Finding]) {
    if findings.is_empty() {
        println!("{}", "✅ Post-export checks passed\n".green());
        return;
    }
    println!(
        "{}",
        format!("⚠️  {} post-export finding(s):", findings.len())
            .bold()
            .yellow()
    );
    for finding in findings {
        println!("   {}", finding.to_string().red());
    }
    println!();
}
