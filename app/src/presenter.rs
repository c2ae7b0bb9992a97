//! Plain-text renderings of the form and the report.

use std::fmt::Write;

use healthcheck_core::{
    Evaluation, HealthCheckInputs, HealthCheckReport, InputField, LoginFrequency, Section,
};

/// Recommendations beyond this many are kept in the data but not shown.
pub const SHOWN_RECOMMENDATIONS: usize = 4;

fn evaluation_mark(evaluation: Evaluation) -> &'static str {
    match evaluation {
        Evaluation::Eccellente => "✔✔",
        Evaluation::Buono => "✔",
        Evaluation::Attenzione => "⚠",
        Evaluation::Critico => "✖",
    }
}

/// Table cells cannot hold pipes or line breaks.
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

/// Render a report as a Markdown document, keeping every list in the
/// order the report gives it.
pub fn render_markdown(report: &HealthCheckReport) -> String {
    let mut out = String::with_capacity(4096);

    out.push_str("# mainsim CMMS HealthCheck\n\n");

    out.push_str("## Executive Summary\n\n");
    let _ = writeln!(out, "**Livello Maturità:** {}  ", report.overall_maturity_level);
    let _ = writeln!(out, "**Score:** {}/100\n", report.overall_score);
    out.push_str(report.executive_summary.trim());
    out.push_str("\n\n");

    out.push_str("## Analisi KPI & Benchmark\n\n");
    out.push_str("| Indicatore | Valore | Valutazione | Rating | Note |\n");
    out.push_str("|---|---|---|---|---|\n");
    for item in &report.kpi_analyses {
        let _ = writeln!(
            out,
            "| {} | {} | {} {} | {}/5 | {} |",
            cell(&item.kpi),
            cell(&item.value),
            evaluation_mark(item.evaluation),
            item.evaluation,
            item.score,
            cell(&item.notes),
        );
    }
    out.push('\n');

    out.push_str("## Quick Wins (30 gg)\n\n");
    for win in &report.quick_wins {
        let _ = writeln!(out, "- {win}");
    }
    out.push('\n');

    out.push_str("## Raccomandazioni Operative\n\n");
    for rec in report.recommendations.iter().take(SHOWN_RECOMMENDATIONS) {
        let _ = writeln!(out, "**{}**  ", rec.category.to_uppercase());
        let _ = writeln!(out, "{}\n", rec.suggestion);
    }

    out.push_str("## Strategia di 90 Giorni\n\n");
    for (idx, step) in report.strategy_90_days.iter().enumerate() {
        let _ = writeln!(out, "### {}. {}\n", idx + 1, step.phase);
        let _ = writeln!(out, "_{}_\n", step.action);
        let _ = writeln!(out, "{}\n", step.details);
    }

    // trailing blank line from the last section
    while out.ends_with("\n\n") {
        out.pop();
    }
    out
}

/// The form grouped by section, with units and unset markers.
pub fn render_form(inputs: &HealthCheckInputs) -> String {
    let mut out = String::new();
    for section in Section::ALL {
        let _ = writeln!(out, "{}", section.title());
        for field in InputField::ALL.iter().filter(|f| f.section() == section) {
            let value = inputs.get(*field);
            let shown = if value.is_set() {
                match field.unit() {
                    Some(unit) => format!("{value} {unit}"),
                    None => value.to_string(),
                }
            } else {
                "(non impostato)".to_string()
            };
            let _ = writeln!(out, "  {:<26} {:<22} {}", field.label(), field.key(), shown);
        }
    }
    out
}

/// Field reference: key, label, unit, description and an example.
pub fn render_fields() -> String {
    let mut out = String::new();
    for section in Section::ALL {
        let _ = writeln!(out, "{}", section.title());
        for field in InputField::ALL.iter().filter(|f| f.section() == section) {
            let unit = field.unit().map(|u| format!(" [{u}]")).unwrap_or_default();
            let _ = writeln!(out, "  {}{} - {}", field.key(), unit, field.label());
            let _ = writeln!(out, "      {}", field.description());
            match field.placeholder() {
                Some(example) => {
                    let _ = writeln!(out, "      es. {example}");
                }
                None => {
                    let options: Vec<&str> = LoginFrequency::ALL.iter().map(|f| f.label()).collect();
                    let _ = writeln!(out, "      valori: {}", options.join(", "));
                }
            }
        }
    }
    out
}
