//! Output formatting for plans and analyses (JSON, CSV, console).

use crate::matcher::AnnotatedUnit;
use crate::models::{
    FuriganaAction, FuriganaEntry, ReconcileAction, ReconcileEntry, ReconcileReport, VocabEntry,
};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Write any serializable value as pretty JSON.
pub fn write_json<T: Serialize + ?Sized, W: Write>(
    value: &T,
    writer: &mut W,
) -> Result<(), OutputError> {
    let json = serde_json::to_string_pretty(value)?;
    writer.write_all(json.as_bytes())?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Write any serializable value as pretty JSON to a file.
pub fn write_json_file<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), OutputError> {
    let mut file = std::fs::File::create(path)?;
    write_json(value, &mut file)
}

/// Quote a CSV field when it holds a separator, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn opt_field(value: Option<&str>) -> String {
    csv_field(value.unwrap_or_default())
}

/// Proposed word, furigana and detail columns for a plan entry.
fn plan_columns(planned: &ReconcileEntry) -> (String, String, String) {
    match &planned.action {
        ReconcileAction::Update { word, furigana } => {
            (word.clone(), furigana.clone(), String::new())
        }
        ReconcileAction::SkipCompound { parts } => (String::new(), String::new(), parts.join(" ")),
        ReconcileAction::SkipDuplicate { word, duplicate_id } => {
            (word.clone(), String::new(), format!("duplicate of {}", duplicate_id))
        }
        ReconcileAction::SkipUnknown | ReconcileAction::SkipAlreadyCanonical => {
            (String::new(), String::new(), planned.error.clone().unwrap_or_default())
        }
    }
}

/// Write a dictionary-form plan as CSV.
pub fn write_plan_csv<W: Write>(entries: &[ReconcileEntry], writer: &mut W) -> Result<(), OutputError> {
    writeln!(
        writer,
        "id,word,furigana,action,proposed_word,proposed_furigana,detail"
    )?;

    for planned in entries {
        let (word, furigana, detail) = plan_columns(planned);
        writeln!(
            writer,
            "{},{},{},{},{},{},{}",
            planned.entry.id,
            csv_field(&planned.entry.word),
            opt_field(planned.entry.furigana.as_deref()),
            planned.action.label(),
            csv_field(&word),
            csv_field(&furigana),
            csv_field(&detail),
        )?;
    }

    Ok(())
}

/// Write a dictionary-form plan as CSV to a file.
pub fn write_plan_csv_file(entries: &[ReconcileEntry], path: &Path) -> Result<(), OutputError> {
    let mut file = std::fs::File::create(path)?;
    write_plan_csv(entries, &mut file)
}

fn furigana_label(action: &FuriganaAction) -> &'static str {
    match action {
        FuriganaAction::Update { .. } => "update",
        FuriganaAction::SkipMissing => "skip_missing",
        FuriganaAction::SkipAlreadyHiragana => "skip_already_hiragana",
    }
}

/// Write a furigana plan as CSV.
pub fn write_furigana_csv<W: Write>(plan: &[FuriganaEntry], writer: &mut W) -> Result<(), OutputError> {
    writeln!(writer, "id,word,furigana,action,proposed_furigana")?;

    for planned in plan {
        let proposed = match &planned.action {
            FuriganaAction::Update { furigana } => furigana.as_str(),
            _ => "",
        };
        writeln!(
            writer,
            "{},{},{},{},{}",
            planned.entry.id,
            csv_field(&planned.entry.word),
            opt_field(planned.entry.furigana.as_deref()),
            furigana_label(&planned.action),
            csv_field(proposed),
        )?;
    }

    Ok(())
}

/// Write a furigana plan as CSV to a file.
pub fn write_furigana_csv_file(plan: &[FuriganaEntry], path: &Path) -> Result<(), OutputError> {
    let mut file = std::fs::File::create(path)?;
    write_furigana_csv(plan, &mut file)
}

/// Write a summary report to stdout.
pub fn print_summary(report: &ReconcileReport) {
    println!("\n=== Reconciliation Summary ===");
    println!("Version: {}", report.version);
    println!();
    println!("Parameters:");
    println!("  Parallel: {}", report.parameters.parallel);
    println!("  Hiragana furigana: {}", report.parameters.hiragana_furigana);
    println!();
    println!("Results:");
    println!("  Entries: {}", report.summary.total);
    println!("  Updates: {}", report.summary.updates);
    println!("  Skipped (unknown): {}", report.summary.skipped_unknown);
    println!("  Skipped (compound): {}", report.summary.skipped_compound);
    println!("  Skipped (duplicate): {}", report.summary.skipped_duplicate);
    println!("  Already canonical: {}", report.summary.already_canonical);
    if report.summary.failed_calls > 0 {
        println!("  Failed analyzer calls: {}", report.summary.failed_calls);
    }
}

pub fn print_furigana_summary(plan: &[FuriganaEntry]) {
    let updates = plan
        .iter()
        .filter(|e| matches!(e.action, FuriganaAction::Update { .. }))
        .count();
    let missing = plan
        .iter()
        .filter(|e| e.action == FuriganaAction::SkipMissing)
        .count();

    println!("\n=== Furigana Summary ===");
    println!("  Entries: {}", plan.len());
    println!("  Updates: {}", updates);
    println!("  Skipped (no furigana): {}", missing);
    println!("  Already hiragana: {}", plan.len() - updates - missing);
}

/// Format a plan entry as a human-readable line.
pub fn format_plan_entry(planned: &ReconcileEntry) -> String {
    let entry = &planned.entry;
    match &planned.action {
        ReconcileAction::Update { word, furigana } => format!(
            "#{} {} → {} [{}]",
            entry.id, entry.word, word, furigana
        ),
        ReconcileAction::SkipCompound { parts } => {
            format!("#{} {}: compound ({})", entry.id, entry.word, parts.join(" + "))
        }
        ReconcileAction::SkipDuplicate { word, duplicate_id } => format!(
            "#{} {}: {} already stored as #{}",
            entry.id, entry.word, word, duplicate_id
        ),
        ReconcileAction::SkipUnknown => match &planned.error {
            Some(error) => format!("#{} {}: unknown ({})", entry.id, entry.word, error),
            None => format!("#{} {}: unknown", entry.id, entry.word),
        },
        ReconcileAction::SkipAlreadyCanonical => {
            format!("#{} {}: already canonical", entry.id, entry.word)
        }
    }
}

/// Print plan entries, skipping already-canonical ones.
pub fn print_plan(entries: &[ReconcileEntry], limit: Option<usize>) {
    let notable: Vec<&ReconcileEntry> = entries
        .iter()
        .filter(|e| e.action != ReconcileAction::SkipAlreadyCanonical)
        .collect();

    let to_print = match limit {
        Some(n) => &notable[..n.min(notable.len())],
        None => &notable[..],
    };

    for planned in to_print {
        println!("{}", format_plan_entry(planned));
    }

    if let Some(n) = limit {
        if notable.len() > n {
            println!("... and {} more entries", notable.len() - n);
        }
    }
}

/// How a plan is written out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanFormat {
    Json,
    Csv,
    /// One line per entry that needs attention
    Plain,
}

/// Write a dictionary-form plan in the requested format.
pub fn write_plan<W: Write>(
    report: &ReconcileReport,
    format: PlanFormat,
    writer: &mut W,
) -> Result<(), OutputError> {
    match format {
        PlanFormat::Json => write_json(report, writer),
        PlanFormat::Csv => write_plan_csv(&report.entries, writer),
        PlanFormat::Plain => {
            for planned in &report.entries {
                if planned.action != ReconcileAction::SkipAlreadyCanonical {
                    writeln!(writer, "{}", format_plan_entry(planned))?;
                }
            }
            Ok(())
        }
    }
}

/// Write a dictionary-form plan to a file in the requested format.
pub fn write_plan_file(
    report: &ReconcileReport,
    format: PlanFormat,
    path: &Path,
) -> Result<(), OutputError> {
    let mut file = std::fs::File::create(path)?;
    write_plan(report, format, &mut file)
}

/// Format a furigana plan entry as a human-readable line.
pub fn format_furigana_entry(planned: &FuriganaEntry) -> String {
    let entry = &planned.entry;
    let current = entry.furigana.as_deref().unwrap_or("");
    match &planned.action {
        FuriganaAction::Update { furigana } => {
            format!("#{} {}: {} → {}", entry.id, entry.word, current, furigana)
        }
        FuriganaAction::SkipMissing => format!("#{} {}: no furigana", entry.id, entry.word),
        FuriganaAction::SkipAlreadyHiragana => {
            format!("#{} {}: already hiragana ({})", entry.id, entry.word, current)
        }
    }
}

/// Write a furigana plan in the requested format.
pub fn write_furigana_plan<W: Write>(
    plan: &[FuriganaEntry],
    format: PlanFormat,
    writer: &mut W,
) -> Result<(), OutputError> {
    match format {
        PlanFormat::Json => write_json(plan, writer),
        PlanFormat::Csv => write_furigana_csv(plan, writer),
        PlanFormat::Plain => {
            for planned in plan {
                if matches!(planned.action, FuriganaAction::Update { .. }) {
                    writeln!(writer, "{}", format_furigana_entry(planned))?;
                }
            }
            Ok(())
        }
    }
}

/// Write a furigana plan to a file in the requested format.
pub fn write_furigana_plan_file(
    plan: &[FuriganaEntry],
    format: PlanFormat,
    path: &Path,
) -> Result<(), OutputError> {
    let mut file = std::fs::File::create(path)?;
    write_furigana_plan(plan, format, &mut file)
}

/// Format an annotated unit as a tab-separated line.
pub fn format_unit(annotated: &AnnotatedUnit<'_>) -> String {
    let unit = annotated.unit;
    if unit.is_line_break() {
        return format!("{}\t⏎", annotated.index);
    }

    let mut line = format!(
        "{}\t{}\t{}\t{}\t{}",
        annotated.index,
        unit.surface,
        unit.basic_form.as_str(),
        unit.reading,
        unit.pos
    );
    if let Some(entry) = annotated.entry {
        line.push_str(&format!("\t✓ {}", entry.meaning.as_deref().unwrap_or("")));
    }
    line
}

/// Print annotated units, one per line.
pub fn print_units(units: &[AnnotatedUnit<'_>]) {
    for annotated in units {
        println!("{}", format_unit(annotated));
    }
}

/// Print search hits, one per line.
pub fn print_vocab(entries: &[&VocabEntry]) {
    for entry in entries {
        println!(
            "#{}\t{}\t{}\t{}",
            entry.id,
            entry.word,
            entry.furigana.as_deref().unwrap_or(""),
            entry.meaning.as_deref().unwrap_or("")
        );
    }
}
