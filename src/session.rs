use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::Result;
use log::{debug, error, warn};

use crate::config::SessionConfig;
use crate::error::TrialError;
use crate::kinematics::{KinematicCalculator, KinematicInputs};
use crate::phase_detector::PhaseDetector;
use crate::recorder::TrialRecorder;
use crate::sensor::SampleSource;
use crate::smoothing::WindowSmoother;
use crate::types::{SubjectProfile, Trial, TrialMetrics, TrialRecord};

/// Pregunta al operador si sigue con otro intento
pub trait ContinuePrompt {
    fn should_continue(&mut self) -> bool;
}

impl<F: FnMut() -> bool> ContinuePrompt for F {
    fn should_continue(&mut self) -> bool {
        self()
    }
}

/// ENTER continúa, "S" detiene
pub struct StdinPrompt;

impl ContinuePrompt for StdinPrompt {
    fn should_continue(&mut self) -> bool {
        print!("Presiona ENTER para continuar o S para detener: ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => false,
            Ok(_) => !line.trim().eq_ignore_ascii_case("s"),
        }
    }
}

/// Conteo de una sesión terminada
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub recorded: usize,
    pub rejected: usize,
}

/// Suaviza y calcula las métricas de un intento completo
pub fn process_trial(
    trial: &Trial,
    smoother: &WindowSmoother,
    calculator: &KinematicCalculator,
    profile: &SubjectProfile,
) -> Result<TrialMetrics, TrialError> {
    let smoothed = smoother.smooth(trial)?;
    let inputs = KinematicInputs::from_trial(trial, &smoothed);
    calculator.compute(&inputs, profile)
}

/// Imprime el informe de un intento
pub fn print_report(metrics: &TrialMetrics) {
    println!("Altura: {} cm", metrics.jump_height_cm);
    println!("Tiempo de ascenso: {} s", metrics.ascent_time_s);
    println!("Aceleración máxima: {} m/s^2", metrics.max_accel);
    println!("Fuerza: {} N", metrics.force_n);
    println!("Velocidad: {} m/s", metrics.velocity_mps);
    println!("Potencia: {} W", metrics.power_w);
    println!("Trabajo: {} J", metrics.work_j);
    println!("IMC: {}", metrics.bmi);
    println!("{}", "*".repeat(60));
}

/// Bucle de intentos: muestra → detector → suavizado → cálculo → registro.
pub struct Session<S, R> {
    source: S,
    recorder: R,
    profile: SubjectProfile,
    detector: PhaseDetector,
    smoother: WindowSmoother,
    calculator: KinematicCalculator,
    pause: Duration,
}

impl<S: SampleSource, R: TrialRecorder> Session<S, R> {
    pub fn new(config: &SessionConfig, profile: SubjectProfile, source: S, recorder: R) -> Self {
        Self {
            source,
            recorder,
            profile,
            detector: PhaseDetector::new(config.detector),
            smoother: config.smoother(),
            calculator: config.calculator(),
            pause: Duration::from_millis(config.inter_trial_pause_ms),
        }
    }

    /// Arranca el sensor y procesa intentos hasta que el operador se detiene o
    /// la fuente se agota. Los errores de hardware y de registro cortan la
    /// sesión; los errores numéricos sólo descartan el intento.
    pub fn run<P: ContinuePrompt>(&mut self, prompt: &mut P) -> Result<SessionSummary> {
        let status = self.source.begin()?.check()?;
        println!("Estado del sistema: {}", status.system_status);
        println!("Autotest (0x0F es normal): 0x{:02X}", status.self_test);
        println!("🎬 Leyendo datos del sensor...\n");

        let mut summary = SessionSummary::default();

        while let Some(sample) = self.source.next_sample()? {
            let Some(trial) = self.detector.feed(sample) else {
                continue;
            };

            match process_trial(&trial, &self.smoother, &self.calculator, &self.profile) {
                Ok(metrics) => {
                    print_report(&metrics);
                    let record = TrialRecord::new(&self.profile, &metrics);
                    if let Err(e) = self.recorder.record_trial(&record) {
                        error!("No se pudo registrar el intento: {:#}", e);
                        return Err(e);
                    }
                    summary.recorded += 1;
                }
                Err(e) => {
                    warn!("Intento descartado: {}", e);
                    eprintln!("⚠️  Intento descartado: {}", e);
                    summary.rejected += 1;
                }
            }

            std::thread::sleep(self.pause);

            if !prompt.should_continue() {
                debug!("Sesión detenida por el operador");
                break;
            }
        }

        Ok(summary)
    }

    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    pub fn into_recorder(self) -> R {
        self.recorder
    }
}
