use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use saltometro::config::SessionConfig;
use saltometro::csv_loader::load_samples_from_csv;
use saltometro::kinematics::KinematicInputs;
use saltometro::phase_detector::PhaseDetector;
use saltometro::profile::load_profile;
use saltometro::session::print_report;

struct ReplayOptions {
    dump_trial: bool,
    dump_window: bool,
    profile: Option<PathBuf>,
    config: Option<PathBuf>,
}

fn parse_args() -> Result<(PathBuf, ReplayOptions)> {
    const USAGE: &str = "Uso: replay_csv [--dump-trial] [--dump-window] [--profile perfil.json] \
                         [--config cfg.json] <muestras.csv>";

    let mut opts = ReplayOptions {
        dump_trial: false,
        dump_window: false,
        profile: None,
        config: None,
    };
    let mut csv_path: Option<PathBuf> = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--dump-trial" => opts.dump_trial = true,
            "--dump-window" => opts.dump_window = true,
            "--profile" => {
                opts.profile = Some(PathBuf::from(
                    args.next().ok_or_else(|| anyhow!("{}", USAGE))?,
                ))
            }
            "--config" => {
                opts.config = Some(PathBuf::from(
                    args.next().ok_or_else(|| anyhow!("{}", USAGE))?,
                ))
            }
            _ => {
                if csv_path.is_some() {
                    bail!("{}", USAGE);
                }
                csv_path = Some(PathBuf::from(arg));
            }
        }
    }

    let csv_path = csv_path.ok_or_else(|| anyhow!("Debes especificar un archivo CSV"))?;
    Ok((csv_path, opts))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let (csv_path, opts) = parse_args()?;
    println!("🎞️  Reproduciendo muestras desde {:?}", csv_path);

    let config = match &opts.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    let profile = opts.profile.as_ref().map(|path| load_profile(path)).transpose()?;
    if profile.is_none() {
        println!("ℹ️  Sin perfil: sólo se muestran detección y suavizado");
    }

    let samples = load_samples_from_csv(&csv_path)?;
    println!("{} muestras cargadas\n", samples.len());

    let mut detector = PhaseDetector::new(config.detector);
    let smoother = config.smoother();
    let calculator = config.calculator();
    let mut trial_idx = 0;

    for sample in samples {
        let Some(trial) = detector.feed(sample) else {
            continue;
        };
        trial_idx += 1;

        println!(
            "🦘 Intento {}: {} muestras, {:.3} s de impulso",
            trial_idx,
            trial.len(),
            trial.ascent_duration_s()
        );

        if opts.dump_trial {
            println!("  {:>14} {:>10} {:>10} {:>10}", "t_ns", "ax", "ay", "az");
            for s in trial.samples() {
                println!(
                    "  {:>14} {:>10.4} {:>10.4} {:>10.4}",
                    s.timestamp_ns, s.ax, s.ay, s.az
                );
            }
        }

        let smoothed = match smoother.smooth(&trial) {
            Ok(smoothed) => smoothed,
            Err(e) => {
                eprintln!("❌ {}", e);
                continue;
            }
        };

        if opts.dump_window {
            println!(
                "  suavizado: x={:.4} y={:.4} z={:.4}",
                smoothed.smoothed_x, smoothed.smoothed_y, smoothed.smoothed_z
            );
            println!("  ventana Y filtrada: {:?}", smoothed.filtered_y);
            println!("  max_y: {}", smoothed.max_y);
        }

        if let Some(profile) = &profile {
            let inputs = KinematicInputs::from_trial(&trial, &smoothed);
            match calculator.compute(&inputs, profile) {
                Ok(metrics) => print_report(&metrics),
                Err(e) => eprintln!("⚠️  Intento descartado: {}", e),
            }
        }
    }

    if trial_idx == 0 {
        println!("ℹ️  No se detectó ninguna fase ascendente");
    }
    println!("\n✅ Umbral alto final: {}", detector.upper_threshold());

    Ok(())
}
