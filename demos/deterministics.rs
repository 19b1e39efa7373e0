//! Deterministic terms example.
//!
//! Run with: cargo run --example deterministics
//! Set RUST_LOG=debug to see process construction logs.

use anofox_deterministic::core::{DeterministicFrame, Frequency, TimeIndex};
use anofox_deterministic::deterministic::{
    BrokenTimeTrend, DeterministicProcess, ExogenousTerm, Fourier, Seasonality, TimeTrend,
};
use anofox_deterministic::models::{AutoRegDesign, AutoRegSpec, Trend};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    println!("=== Deterministic Terms Example ===\n");

    // 1. Constant, linear trend and 5-period seasonal dummies on an integer index
    println!("--- Basic use ---");
    let process = DeterministicProcess::builder(TimeIndex::range(100))
        .constant(true)
        .order(1)
        .seasonal(true)
        .period(5.0)
        .build()
        .unwrap();
    println!("{}", process.in_sample().unwrap().slice_rows(0, 9).unwrap());
    println!("Next 15 values:\n{}", process.out_of_sample(15).unwrap());
    // stop is included in the range
    println!("range(190, 210):\n{}", process.range(190, 210).unwrap());

    // 2. Monthly period index with Fourier terms
    println!("--- Period index ---");
    let index = TimeIndex::parse_period_range("2020-03", Frequency::Monthly, 60).unwrap();
    let process = DeterministicProcess::builder(index)
        .constant(true)
        .fourier(2)
        .build()
        .unwrap();
    println!("{}", process.in_sample().unwrap().slice_rows(0, 11).unwrap());
    println!("{}", process.out_of_sample(12).unwrap());
    let by_date = process.range("2025-01", "2026-01").unwrap();
    let by_position = process.range(58, 70).unwrap();
    println!("range(\"2025-01\", \"2026-01\"):\n{by_date}");
    println!("Same as range(58, 70): {}\n", by_date == by_position);

    // 3. Two seasonal components: day-of-week dummies and an annual Fourier cycle
    println!("--- Additional terms ---");
    let index = TimeIndex::parse_period_range("2020-03-01", Frequency::Daily, 2 * 365).unwrap();
    let process = DeterministicProcess::builder(index)
        .additional_term(TimeTrend::new(true, 0).unwrap())
        .additional_term(Seasonality::new(7).unwrap())
        .additional_term(Fourier::new(365.25, 2).unwrap())
        .build()
        .unwrap();
    println!("{}", process.in_sample().unwrap().slice_rows(0, 27).unwrap());

    // 4. Custom terms: a broken time trend
    println!("--- Broken time trend ---");
    let process = DeterministicProcess::builder(TimeIndex::range(100))
        .additional_term(TimeTrend::new(true, 1).unwrap())
        .additional_term(BrokenTimeTrend::new(60))
        .build()
        .unwrap();
    println!("{}", process.range(55, 65).unwrap());

    // 5. Exogenous data treated as deterministic
    println!("--- Exogenous process ---");
    let mut rng = StdRng::seed_from_u64(98765432101234567);
    let rows: Vec<Vec<f64>> = (0..300)
        .map(|_| vec![rng.gen_range(0..100) as f64, rng.gen_range(0..100) as f64])
        .collect();
    let exog = DeterministicFrame::from_rows(
        TimeIndex::range(300),
        vec!["exog1".into(), "exog2".into()],
        rows,
    )
    .unwrap();
    let process = DeterministicProcess::builder(TimeIndex::range(200))
        .additional_term(TimeTrend::new(true, 1).unwrap())
        .additional_term(ExogenousTerm::new(exog).unwrap())
        .build()
        .unwrap();
    println!("{}", process.in_sample().unwrap().slice_rows(0, 4).unwrap());
    println!("{}", process.out_of_sample(10).unwrap());

    // 6. Autoregression with a custom deterministic process
    println!("--- Autoregression design ---");
    let idx = TimeIndex::range(200);
    let process = DeterministicProcess::builder(idx.clone())
        .constant(true)
        .period(52.0)
        .fourier(2)
        .build()
        .unwrap();
    let params = [1.0, 3.0, -1.0, 4.0, -2.0];
    let mut y = Vec::with_capacity(200);
    let mut prev = 0.0;
    for row in process.in_sample().unwrap().to_rows() {
        let mean: f64 = row.iter().zip(params).map(|(x, b)| x * b).sum();
        let value = 0.9 * prev + mean + rng.gen_range(-1.0..1.0);
        y.push(value);
        prev = value;
    }

    match AutoRegDesign::new(&y, idx.clone(), AutoRegSpec::new(1).deterministic(process.clone())) {
        Ok(_) => println!("unexpected: default trend accepted with a custom process"),
        Err(e) => println!("Rejected: {e}"),
    }

    let spec = AutoRegSpec::new(1).trend(Trend::None).deterministic(process);
    let design = AutoRegDesign::new(&y, idx, spec).unwrap();
    println!(
        "Regressors: {:?} ({} rows after holding back {})",
        design.regressors().columns(),
        design.regressors().nrows(),
        design.hold_back()
    );
    println!(
        "Deterministic terms for the next 12 periods:\n{}",
        design.deterministic_forecast(12).unwrap()
    );
}
