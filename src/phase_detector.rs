use log::debug;
use serde::{Deserialize, Serialize};

use crate::types::{Sample, Trial, LOWER_THRESHOLD, TIGHTENED_THRESHOLD, UPPER_THRESHOLD};

/// Qué hacer con el umbral alto tras el primer ascenso detectado
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdPolicy {
    /// Baja el umbral alto a `tightened_threshold` y no vuelve a subirlo
    TightenOnce,
    /// Mantiene el umbral inicial durante toda la sesión
    Fixed,
}

/// Parámetros de configuración del detector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetectorParams {
    /// Umbral alto de aceleración vertical (default: 9.0)
    pub upper_threshold: f64,
    /// Umbral bajo, fijo (default: 5.0)
    pub lower_threshold: f64,
    /// Valor del umbral alto tras el primer ascenso (default: 2.0)
    pub tightened_threshold: f64,
    pub policy: ThresholdPolicy,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            upper_threshold: UPPER_THRESHOLD,
            lower_threshold: LOWER_THRESHOLD,
            tightened_threshold: TIGHTENED_THRESHOLD,
            policy: ThresholdPolicy::TightenOnce,
        }
    }
}

/// Estados de la máquina de estados del detector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseState {
    /// Esperando el impulso
    Idle,
    /// Capturando la fase de impulso (push-off)
    Ascending,
}

/// Detector de la fase ascendente de un squat jump.
///
/// Todo el estado mutable de la detección (umbral vigente, último `ay`,
/// buffer del intento) vive aquí, así cada sesión o test tiene el suyo.
pub struct PhaseDetector {
    params: DetectorParams,
    upper_thr: f64,
    state: PhaseState,
    last_y: f64,

    /// Muestras capturadas desde que empezó la fase ascendente
    capture: Vec<Sample>,
}

impl PhaseDetector {
    pub fn new(params: DetectorParams) -> Self {
        Self {
            upper_thr: params.upper_threshold,
            params,
            state: PhaseState::Idle,
            last_y: 0.0,
            capture: Vec::new(),
        }
    }

    /// Alimenta el detector con una nueva muestra.
    /// Devuelve el intento completo cuando la fase ascendente termina.
    pub fn feed(&mut self, sample: Sample) -> Option<Trial> {
        let y = sample.ay;

        if self.state == PhaseState::Idle
            && y > self.upper_thr
            && y > self.last_y
            && y > self.params.lower_threshold
        {
            debug!("Inicio de fase ascendente (ay={:.3}, umbral={})", y, self.upper_thr);
            self.state = PhaseState::Ascending;
            self.capture.clear();
            self.tighten();
        }
        self.last_y = y;

        match self.state {
            PhaseState::Idle => None,
            PhaseState::Ascending => {
                if y > self.upper_thr {
                    self.capture.push(sample);
                    None
                } else {
                    self.state = PhaseState::Idle;
                    self.finish_capture(sample)
                }
            }
        }
    }

    fn tighten(&mut self) {
        if self.params.policy == ThresholdPolicy::TightenOnce
            && self.upper_thr > self.params.tightened_threshold
        {
            debug!(
                "Umbral alto ajustado {} -> {}",
                self.upper_thr, self.params.tightened_threshold
            );
            self.upper_thr = self.params.tightened_threshold;
        }
    }

    fn finish_capture(&mut self, terminal: Sample) -> Option<Trial> {
        let samples = std::mem::take(&mut self.capture);
        if samples.len() > 1 {
            debug!("Fase ascendente completa: {} muestras", samples.len());
            Some(Trial::new(samples, terminal))
        } else {
            debug!("Intento degenerado descartado ({} muestras)", samples.len());
            None
        }
    }

    pub fn state(&self) -> PhaseState {
        self.state
    }

    /// Umbral alto vigente
    pub fn upper_threshold(&self) -> f64 {
        self.upper_thr
    }

    pub fn last_y(&self) -> f64 {
        self.last_y
    }

    /// Muestras en el buffer de captura
    pub fn capture_len(&self) -> usize {
        self.capture.len()
    }
}

impl Default for PhaseDetector {
    fn default() -> Self {
        Self::new(DetectorParams::default())
    }
}
