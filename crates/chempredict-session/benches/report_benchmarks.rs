use chrono::{Local, TimeZone};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use chempredict_core::types::{HazardLevel, PredictionResult};
use chempredict_session::ReportGenerator;

fn full_result() -> PredictionResult {
    PredictionResult {
        product: Some("CCOC(C)=O".to_string()),
        safety_hazard_level: HazardLevel::Medium,
        reaction_description: Some(
            "ML-predicted Esterification reaction between ethanol and acetic acid.".to_string(),
        ),
        reactant1_smiles: Some("CCO".to_string()),
        reactant2_smiles: Some("CC(=O)O".to_string()),
        product_smiles: Some("CCOC(C)=O".to_string()),
        prediction_method: Some("ml_chemberta".to_string()),
        ..PredictionResult::minimal("Esterification", "87.3%")
    }
}

fn bench_generate(c: &mut Criterion) {
    let at = Local
        .with_ymd_and_hms(2024, 3, 9, 14, 30, 0)
        .single()
        .unwrap_or_else(Local::now);
    let full = full_result();
    let minimal = PredictionResult::minimal("Double Displacement", "85%");

    c.bench_function("report_full", |b| {
        b.iter(|| {
            ReportGenerator::generate_at(
                black_box(&full),
                black_box("ethanol"),
                black_box("acetic acid"),
                at,
            )
        })
    });

    c.bench_function("report_minimal", |b| {
        b.iter(|| {
            ReportGenerator::generate_at(black_box(&minimal), black_box("H2O"), black_box("NaCl"), at)
        })
    });
}

criterion_group!(benches, bench_generate);
criterion_main!(benches);
