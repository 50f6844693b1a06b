// ─────────────────────────────────────────────────────────────────────
// SSPIKE Rates — Command-Line Front End
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! `sspike`: predicted supernova neutrino events in a detector.
//!
//! Usage:
//!   sspike Nakazato_2013 -M 20 -Z 0.02 -R 300 -L 10
//!   sspike -f plan.json --cache-dir out/

use anyhow::{bail, Context, Result};
use clap::Parser;
use sspike_core::cache::DiskCache;
use sspike_core::io::format_visible_totals;
use sspike_core::pipeline::run_all;
use sspike_types::config::{ParamValue, RunConfig, RunPlan};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Supernova neutrino event rates in a liquid-scintillator detector.
#[derive(Parser, Debug)]
#[command(name = "sspike", version)]
struct Args {
    /// Model family, e.g. Nakazato_2013 (not needed with --plan)
    model: Option<String>,

    /// Detector name
    #[arg(short = 'D', long)]
    detector: Option<String>,

    /// Distance to the supernova [kpc]
    #[arg(short = 'L', long)]
    distance: Option<f64>,

    /// Flavor transformation
    #[arg(short = 'X', long)]
    transform: Option<String>,

    /// Progenitor mass [solar masses]
    #[arg(short = 'M', long)]
    mass: Option<f64>,

    /// Progenitor metallicity
    #[arg(short = 'Z', long)]
    metal: Option<f64>,

    /// Shock revival time [ms]
    #[arg(short = 'R', long)]
    t_rev: Option<f64>,

    /// Rotation rate
    #[arg(short = 'O', long)]
    omega: Option<f64>,

    /// Magnetic field exponent
    #[arg(short = 'B', long = "b0")]
    b0: Option<f64>,

    /// Equation of state
    #[arg(short = 'N', long)]
    eos: Option<String>,

    /// Turbulent mixing strength
    #[arg(short = 'S', long)]
    stir: Option<f64>,

    /// Batch plan (JSON) expanded into one run per combination
    #[arg(short = 'f', long)]
    plan: Option<PathBuf>,

    /// Run configuration (JSON) used as the template for every run
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Fluence file, overriding the per-run directory layout
    #[arg(long)]
    fluence: Option<PathBuf>,

    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Directory with detector-response tables
    #[arg(long)]
    snow_dir: Option<PathBuf>,

    /// Debug logging
    #[arg(short = 'd', long)]
    debug: bool,
}

fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Template configuration with command-line overrides applied.
fn template(args: &Args) -> Result<RunConfig> {
    let mut cfg = match &args.config {
        Some(path) => RunConfig::from_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => RunConfig::new(args.model.clone().unwrap_or_default()),
    };
    if let Some(model) = &args.model {
        cfg.model = model.clone();
    }
    if let Some(detector) = &args.detector {
        cfg.detector = detector.clone();
    }
    if let Some(distance) = args.distance {
        cfg.distance = distance;
    }
    if let Some(transform) = &args.transform {
        cfg.transform = transform.clone();
    }

    let numbers = [
        ("mass", args.mass),
        ("metal", args.metal),
        ("t_rev", args.t_rev),
        ("omega", args.omega),
        ("B0", args.b0),
        ("stir", args.stir),
    ];
    for (key, value) in numbers {
        if let Some(v) = value {
            cfg.progenitor.insert(key.to_string(), ParamValue::Number(v));
        }
    }
    if let Some(eos) = &args.eos {
        cfg.progenitor.insert("eos".to_string(), ParamValue::Text(eos.clone()));
    }

    if let Some(path) = &args.fluence {
        cfg.paths.fluence_file = Some(path.clone());
    }
    if let Some(dir) = &args.data_dir {
        cfg.paths.data_dir = dir.clone();
    }
    if let Some(dir) = &args.cache_dir {
        cfg.paths.cache_dir = dir.clone();
    }
    if let Some(dir) = &args.snow_dir {
        cfg.paths.snow_dir = Some(dir.clone());
    }
    Ok(cfg)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    let template = template(&args)?;
    let runs = match &args.plan {
        Some(path) => {
            let plan = RunPlan::from_file(path)
                .with_context(|| format!("reading plan {}", path.display()))?;
            plan.expand(&template)?
        }
        None => {
            if args.model.is_none() && args.config.is_none() {
                bail!("a model name, --config or --plan is required");
            }
            template.validate()?;
            vec![template.clone()]
        }
    };
    info!(runs = runs.len(), cache = %template.paths.cache_dir.display(), "starting");

    let cache = DiskCache::new(&template.paths.cache_dir);
    let tables = run_all(&runs, &cache)?;
    for table in &tables {
        print!("{}", format_visible_totals(table)?);
    }
    Ok(())
}
