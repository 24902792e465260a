//! Plain-text prediction reports.
//!
//! Pure formatting: the caller decides where the artifact goes.

use std::fmt::Write;

use chrono::{DateTime, Local, NaiveDate};
use serde::Serialize;

use chempredict_core::types::{HazardLevel, PredictionResult};

pub const REPORT_MIME_TYPE: &str = "text/plain";

const LOW_HAZARD_ADVISORY: &str = "Low hazard. Standard laboratory precautions are sufficient: \
wear safety glasses, gloves and a lab coat, and keep the work area clean.";

const MEDIUM_HAZARD_ADVISORY: &str = "Moderate hazard. Work in a well-ventilated area or fume \
hood, wear chemical-resistant gloves and eye protection, and keep spill containment materials \
within reach. Review the safety data sheets of all reactants before starting.";

const HIGH_HAZARD_ADVISORY: &str = "High hazard. Perform this reaction only in a fume hood with \
full personal protective equipment. Review the safety data sheets of all reactants and \
products, never work alone, and make sure an eyewash station, safety shower and fire \
extinguisher are accessible.";

const DISCLAIMER: &str = "This report was generated automatically from a computational \
prediction. Predicted products, yields and hazard levels may be inaccurate and must be \
verified by a qualified chemist before any laboratory work is carried out.";

/// A rendered report ready to be saved or downloaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportArtifact {
    pub content: String,
    pub suggested_file_name: String,
    pub mime_type: &'static str,
}

/// Renders a completed prediction as a fixed-section text document.
pub struct ReportGenerator;

impl ReportGenerator {
    /// Render a report stamped with the current local time.
    pub fn generate(result: &PredictionResult, reactant1: &str, reactant2: &str) -> ReportArtifact {
        Self::generate_at(result, reactant1, reactant2, Local::now())
    }

    /// Render a report stamped with `generated_at`. Deterministic.
    pub fn generate_at(
        result: &PredictionResult,
        reactant1: &str,
        reactant2: &str,
        generated_at: DateTime<Local>,
    ) -> ReportArtifact {
        ReportArtifact {
            content: render(result, reactant1, reactant2, generated_at),
            suggested_file_name: Self::suggested_file_name(
                reactant1,
                reactant2,
                generated_at.date_naive(),
            ),
            mime_type: REPORT_MIME_TYPE,
        }
    }

    /// `ChemPredict_Report_<reactant1>_<reactant2>_<YYYY-MM-DD>.txt`
    pub fn suggested_file_name(reactant1: &str, reactant2: &str, date: NaiveDate) -> String {
        format!(
            "ChemPredict_Report_{}_{}_{}.txt",
            reactant1,
            reactant2,
            date.format("%Y-%m-%d")
        )
    }

    /// Advisory paragraph for a hazard level. `High` and `Unknown` share the
    /// strictest text.
    pub fn safety_advisory(level: HazardLevel) -> &'static str {
        match level {
            HazardLevel::Low => LOW_HAZARD_ADVISORY,
            HazardLevel::Medium => MEDIUM_HAZARD_ADVISORY,
            _ => HIGH_HAZARD_ADVISORY,
        }
    }
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}", "-".repeat(title.len()));
}

fn render(
    result: &PredictionResult,
    reactant1: &str,
    reactant2: &str,
    generated_at: DateTime<Local>,
) -> String {
    const TITLE: &str = "CHEMPREDICT AI - REACTION PREDICTION REPORT";

    // Writing to a String cannot fail.
    let mut out = String::new();
    let _ = writeln!(out, "{}", TITLE);
    let _ = writeln!(out, "{}", "=".repeat(TITLE.len()));
    let _ = writeln!(
        out,
        "Generated: {}",
        generated_at.format("%Y-%m-%d %H:%M:%S %:z")
    );

    section(&mut out, "REACTANTS");
    let _ = writeln!(out, "Reactant 1: {}", reactant1);
    let _ = writeln!(out, "Reactant 2: {}", reactant2);

    section(&mut out, "PREDICTION");
    let _ = writeln!(out, "Reaction Type:   {}", result.reaction_type);
    let _ = writeln!(
        out,
        "Product:         {}",
        result.product.as_deref().unwrap_or("Not reported")
    );
    let _ = writeln!(out, "Predicted Yield: {}", result.predicted_yield);
    let _ = writeln!(out, "Hazard Level:    {}", result.safety_hazard_level);
    if let Some(ref method) = result.prediction_method {
        let _ = writeln!(out, "Method:          {}", method);
    }

    if result.has_structures() {
        section(&mut out, "STRUCTURES (SMILES)");
        let rows = [
            ("Reactant 1", &result.reactant1_smiles),
            ("Reactant 2", &result.reactant2_smiles),
            ("Product", &result.product_smiles),
        ];
        for (label, smiles) in rows {
            if let Some(smiles) = smiles {
                let _ = writeln!(out, "{:<11} {}", format!("{}:", label), smiles);
            }
        }
    }

    section(&mut out, "DESCRIPTION");
    let _ = writeln!(
        out,
        "{}",
        result
            .reaction_description
            .as_deref()
            .unwrap_or("No description provided.")
    );

    section(&mut out, "SAFETY ADVISORY");
    let _ = writeln!(
        out,
        "{}",
        ReportGenerator::safety_advisory(result.safety_hazard_level)
    );

    section(&mut out, "DISCLAIMER");
    let _ = writeln!(out, "{}", DISCLAIMER);

    out
}
