//! Report rendering
//!
//! The report is free-form JSON, so sections are rendered generically:
//! objects become labelled lines, arrays become bullet lists.

use anyhow::Result;
use colored::*;
use serde::Serialize;
use serde_json::Value as JsonValue;
use vidlens_core::domain::result::{AnalysisResult, SECTIONS, Section};
use vidlens_tracker::LoadingFailure;

/// Sections shown in the terminal report; the rest is available through `--json`
const HIDDEN_SECTIONS: [Section; 2] = [Section::Metadata, Section::Transcription];

#[derive(Serialize)]
struct ReportOutput<'a> {
    job_id: Option<&'a str>,
    recovered: bool,
    placeholder: bool,
    result: &'a AnalysisResult,
}

/// Print a result as a report, or as JSON
pub fn print_result(
    result: &AnalysisResult,
    job_id: Option<&str>,
    recovered: bool,
    json: bool,
) -> Result<()> {
    if json {
        let output = ReportOutput {
            job_id,
            recovered,
            placeholder: result.is_placeholder(),
            result,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", render_report(result, job_id, recovered));
    }
    Ok(())
}

/// Print the failure panel of a loading session
pub fn print_failure(failure: &LoadingFailure) {
    println!();
    if failure.captcha {
        println!("{} {}", "✗ CAPTCHA required:".red().bold(), failure.message);
    } else {
        println!("{} {}", "✗ Analysis failed:".red().bold(), failure.message);
    }
    println!("  {}", failure.guidance.yellow());
}

fn render_report(result: &AnalysisResult, job_id: Option<&str>, recovered: bool) -> String {
    let mut out = String::new();
    let id = result.id().or(job_id).unwrap_or("unknown");

    out.push('\n');
    if result.is_placeholder() {
        out.push_str(&format!("{} {}\n", "Analysis unavailable".red().bold(), id.dimmed()));
        if let Some(message) = result.error_message() {
            out.push_str(&format!("  {}\n", message.red()));
        }
        out.push_str(&format!(
            "  {}\n",
            format!("Try again later with: vidlens show {}", id).dimmed()
        ));
        return out;
    }

    out.push_str(&format!("{} {}\n", report_title(result).bold(), id.dimmed()));
    if recovered {
        out.push_str(&format!(
            "  {}\n",
            "Recovered from the completed analyses listing".yellow()
        ));
    }

    let mut rendered = 0;
    for section in SECTIONS {
        if HIDDEN_SECTIONS.contains(&section) {
            continue;
        }
        let Some(value) = result.section(section) else {
            continue;
        };

        out.push('\n');
        out.push_str(&format!("{}\n", section.title().bold().underline()));
        write_value(&mut out, value, 2);
        rendered += 1;
    }

    if rendered == 0 {
        out.push_str(&format!("\n  {}\n", "The report has no sections to show.".yellow()));
    }
    out
}

fn report_title(result: &AnalysisResult) -> String {
    let Some(metadata) = result.section(Section::Metadata) else {
        return "Analysis report".to_string();
    };
    ["title", "video_title", "name"]
        .iter()
        .filter_map(|key| metadata.get(*key).and_then(JsonValue::as_str))
        .find(|title| !title.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "Analysis report".to_string())
}

fn write_value(out: &mut String, value: &JsonValue, indent: usize) {
    let pad = " ".repeat(indent);

    match value {
        JsonValue::Object(map) => {
            for (key, value) in map {
                match value {
                    JsonValue::Null => {}
                    JsonValue::Object(_) | JsonValue::Array(_) => {
                        out.push_str(&format!("{}{}:\n", pad, humanize(key).cyan()));
                        write_value(out, value, indent + 2);
                    }
                    scalar => {
                        out.push_str(&format!(
                            "{}{}: {}\n",
                            pad,
                            humanize(key).cyan(),
                            format_scalar(scalar)
                        ));
                    }
                }
            }
        }
        JsonValue::Array(items) => {
            for item in items {
                let mut nested = String::new();
                write_value(&mut nested, item, indent + 2);
                // Swap the nested padding of the first line for a bullet
                if let Some(rest) = nested.get(indent + 2..) {
                    out.push_str(&format!("{}• {}", pad, rest));
                }
            }
        }
        JsonValue::Null => {}
        scalar => out.push_str(&format!("{}{}\n", pad, format_scalar(scalar))),
    }
}

/// `engagement_rate` becomes `Engagement rate`
fn humanize(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => spaced,
    }
}

fn format_scalar(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Bool(true) => "yes".to_string(),
        JsonValue::Bool(false) => "no".to_string(),
        JsonValue::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) if f.fract() != 0.0 => format!("{:.2}", f),
            Some(f) => format!("{}", f as i64),
            None => n.to_string(),
        },
        other => other.to_string(),
    }
}
