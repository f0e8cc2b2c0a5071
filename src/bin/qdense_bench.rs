use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::ProgressBar;
use log::{info, warn};
use qdense::kernel::{DenseKernel, DualMac, Scalar, Strategy, SELECTED};
use qdense::{DenseParams, QuantDense, Status};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "qdense-bench", version, about = "Check and time the q15 x q7 dense kernel strategies")]
struct Args {
    /// Input feature count
    #[arg(long, default_value_t = 256)]
    dim_vec: u16,

    /// Output feature count
    #[arg(long, default_value_t = 64)]
    rows: u16,

    /// Left shift applied to bias
    #[arg(long, default_value_t = 6)]
    bias_shift: u16,

    /// Right shift applied to the accumulator (with rounding)
    #[arg(long, default_value_t = 9)]
    out_shift: u16,

    /// Timed calls per strategy
    #[arg(long, default_value_t = 10_000)]
    iters: usize,

    /// Random shapes to cross-check between strategies before timing
    #[arg(long, default_value_t = 500)]
    cases: usize,

    /// RNG seed
    #[arg(long, default_value_t = 0x5eed)]
    seed: u64,

    /// Strategy to time (defaults to the one this build selects)
    #[arg(long, value_enum)]
    strategy: Option<Strategy>,

    /// Print a JSON report instead of text
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Debug, serde::Serialize)]
struct Report {
    strategy: Strategy,
    status: Status,
    params: DenseParams,
    iters: usize,
    cases_checked: usize,
    mismatches: usize,
    ns_per_call: f64,
    macs_per_sec: f64,
}

fn random_layer(rng: &mut SmallRng, params: DenseParams) -> Result<QuantDense> {
    let n = params.dim_vec as usize * params.num_of_rows as usize;
    let weights = (0..n).map(|_| rng.gen::<i8>()).collect();
    let bias = (0..params.num_of_rows).map(|_| rng.gen::<i8>()).collect();
    QuantDense::new(params, weights, bias).context("build random layer")
}

fn random_vector(rng: &mut SmallRng, len: usize) -> Vec<i16> { (0..len).map(|_| rng.gen::<i16>()).collect() }

/// Random shapes, including odd row counts and non-multiple-of-4 columns.
fn cross_check(rng: &mut SmallRng, cases: usize, quiet: bool) -> Result<usize> {
    let pb = if quiet { ProgressBar::hidden() } else { ProgressBar::new(cases as u64) };
    let mut mismatches = 0usize;
    for _ in 0..cases {
        let params = DenseParams {
            dim_vec: rng.gen_range(0..=67),
            num_of_rows: rng.gen_range(0..=17),
            bias_shift: rng.gen_range(0..=8),
            out_shift: rng.gen_range(0..=15),
        };
        let layer = random_layer(rng, params)?;
        let v = random_vector(rng, layer.dim_vec());
        let mut a = vec![0i16; layer.num_of_rows()];
        let mut b = vec![0i16; layer.num_of_rows()];
        layer.forward_with(Strategy::DualMac, &v, &mut a);
        layer.forward_with(Strategy::Scalar, &v, &mut b);
        if a != b {
            warn!("strategies disagree for {:?}", params);
            mismatches += 1;
        }
        pb.inc(1);
    }
    pb.finish_and_clear();
    Ok(mismatches)
}

fn time_strategy<K: DenseKernel>(layer: &QuantDense, v: &[i16], out: &mut [i16], iters: usize) -> f64 {
    let p = layer.params;
    let t0 = Instant::now();
    for _ in 0..iters {
        K::run(std::hint::black_box(v), &layer.weights, p.dim_vec, p.num_of_rows, p.bias_shift, p.out_shift, &layer.bias, out);
    }
    let dt = t0.elapsed();
    if iters == 0 { 0.0 } else { dt.as_nanos() as f64 / iters as f64 }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let strategy = args.strategy.unwrap_or(SELECTED);
    info!("build strategy={} timing strategy={}", SELECTED.name(), strategy.name());

    let params = DenseParams { dim_vec: args.dim_vec, num_of_rows: args.rows, bias_shift: args.bias_shift, out_shift: args.out_shift };
    let mut rng = SmallRng::seed_from_u64(args.seed);
    let mismatches = cross_check(&mut rng, args.cases, args.json)?;
    if mismatches > 0 {
        bail!("{} of {} random cases differ between strategies", mismatches, args.cases);
    }

    let layer = random_layer(&mut rng, params)?;
    let v = random_vector(&mut rng, layer.dim_vec());
    let mut out = vec![0i16; layer.num_of_rows()];
    let status = layer.try_forward(&v, &mut out).context("validate layer call")?;
    let ns = match strategy {
        Strategy::DualMac => time_strategy::<DualMac>(&layer, &v, &mut out, args.iters),
        Strategy::Scalar => time_strategy::<Scalar>(&layer, &v, &mut out, args.iters),
    };
    let macs = layer.dim_vec() as f64 * layer.num_of_rows() as f64;
    let macs_per_sec = if ns > 0.0 { macs * 1e9 / ns } else { 0.0 };

    let report = Report { strategy, status, params, iters: args.iters, cases_checked: args.cases, mismatches, ns_per_call: ns, macs_per_sec };
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "strategy={} dim_vec={} rows={} ns/call={:.1} MMAC/s={:.1} checked={} mismatches={}",
            strategy.name(), params.dim_vec, params.num_of_rows, ns, macs_per_sec / 1e6, args.cases, mismatches
        );
    }
    Ok(())
}
