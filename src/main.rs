/*
Evaluación de Squat Jump con IMU

Sistema que:
1. Arranca el sensor y verifica el autotest
2. Pide los datos del sujeto (o los lee de un JSON)
3. Detecta la fase de impulso en el flujo de muestras
4. Calcula altura, tiempo de ascenso, fuerza, velocidad, potencia, trabajo e IMC
5. Anexa cada intento a datos.csv

El proceso que habla con el sensor escribe muestras en un FIFO con el formato
timestamp_ns,ax,ay,az,gx,gy,gz:
     mkfifo /tmp/imu && ./target/release/saltometro --input /tmp/imu

Sin hardware:
     ./target/release/saltometro --synthetic 3 -v
*/

use std::env;
use std::io;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};

use saltometro::config::SessionConfig;
use saltometro::csv_loader::CsvSource;
use saltometro::profile::{load_profile, read_profile};
use saltometro::recorder::CsvRecorder;
use saltometro::sensor::{SampleSource, SensorError, SyntheticParams, SyntheticSource};
use saltometro::session::{Session, StdinPrompt};
use saltometro::types::SubjectProfile;

const USAGE: &str = "Uso: saltometro [-v] [--config cfg.json] [--profile perfil.json] \
                     [--out datos.csv] (--input muestras.csv | --synthetic N)";

enum SourceArg {
    Input(PathBuf),
    Synthetic(usize),
}

struct Options {
    verbose: bool,
    config_path: PathBuf,
    profile_path: Option<PathBuf>,
    out_path: Option<PathBuf>,
    source: SourceArg,
}

fn parse_args() -> Result<Options> {
    let mut verbose = false;
    let mut config_path = PathBuf::from("saltometro.json");
    let mut profile_path = None;
    let mut out_path = None;
    let mut source = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        let mut value = |flag: &str| {
            args.next()
                .ok_or_else(|| anyhow!("Falta el valor de {}\n{}", flag, USAGE))
        };
        match arg.as_str() {
            "-v" | "-V" => verbose = true,
            "--config" => config_path = PathBuf::from(value("--config")?),
            "--profile" => profile_path = Some(PathBuf::from(value("--profile")?)),
            "--out" => out_path = Some(PathBuf::from(value("--out")?)),
            "--input" => source = Some(SourceArg::Input(PathBuf::from(value("--input")?))),
            "--synthetic" => {
                let raw = value("--synthetic")?;
                let jumps = raw
                    .parse()
                    .map_err(|_| anyhow!("Número de saltos inválido: {}", raw))?;
                source = Some(SourceArg::Synthetic(jumps));
            }
            "-h" | "--help" => bail!("{}", USAGE),
            other => bail!("Argumento desconocido: {}\n{}", other, USAGE),
        }
    }

    let source = source.ok_or_else(|| anyhow!("Debes indicar una fuente de muestras\n{}", USAGE))?;
    Ok(Options {
        verbose,
        config_path,
        profile_path,
        out_path,
        source,
    })
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run_session<S: SampleSource>(
    config: &SessionConfig,
    profile: SubjectProfile,
    source: S,
) -> Result<()> {
    let recorder = CsvRecorder::open(&config.output_path)?;
    println!("📄 Registro: {}", recorder.path().display());

    let mut session = Session::new(config, profile, source, recorder);
    let summary = session.run(&mut StdinPrompt)?;

    println!(
        "\n👋 Sesión terminada: {} intentos registrados, {} descartados",
        summary.recorded, summary.rejected
    );
    Ok(())
}

fn main() -> Result<()> {
    let opts = parse_args()?;
    init_logging(opts.verbose);

    println!("🦘 Squat Jump - evaluación con IMU\n");

    let mut config = SessionConfig::load(&opts.config_path)?;
    if let Some(out) = opts.out_path {
        config.output_path = out;
    }

    let profile = match &opts.profile_path {
        Some(path) => load_profile(path)?,
        None => read_profile(&mut io::stdin().lock(), &mut io::stdout())?,
    };
    log::debug!("Perfil: {:?}", profile);

    let result = match opts.source {
        SourceArg::Input(path) => {
            println!("🔌 Leyendo muestras de {}", path.display());
            run_session(&config, profile, CsvSource::open(&path)?)
        }
        SourceArg::Synthetic(jumps) => {
            println!("🔧 Modo: generador sintético ({} saltos)", jumps);
            let params = SyntheticParams {
                jumps,
                ..Default::default()
            };
            run_session(&config, profile, SyntheticSource::new(params))
        }
    };

    if let Err(e) = &result {
        if let Some(SensorError::HardwareFault { code }) = e.downcast_ref::<SensorError>() {
            eprintln!("❌ Error de sistema del sensor: 0x{:02X}", code);
            eprintln!("   Ver la sección 4.3.59 de la hoja de datos para su significado.");
        }
    }
    result
}
