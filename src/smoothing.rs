use log::debug;

use crate::error::TrialError;
use crate::types::{Trial, SIGMA_LIMIT, WINDOW_SIZE};

/// Resumen por eje de la ventana final de un intento
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothedWindow {
    pub smoothed_x: f64,
    pub smoothed_y: f64,
    pub smoothed_z: f64,
    /// Ventana Y tras descartar outliers, en orden ascendente
    pub filtered_y: Vec<f64>,
    /// Último elemento de `filtered_y`: aceleración máxima medida
    pub max_y: f64,
}

/// Ordena, recorta, promedia y filtra un intento.
///
/// Sólo el eje Y pasa por el filtro de outliers; X y Z se promedian tal cual.
#[derive(Debug, Clone, Copy)]
pub struct WindowSmoother {
    window: usize,
    sigma_limit: f64,
}

impl WindowSmoother {
    pub fn new(window: usize, sigma_limit: f64) -> Self {
        Self {
            window: window.max(1),
            sigma_limit,
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn smooth(&self, trial: &Trial) -> Result<SmoothedWindow, TrialError> {
        self.smooth_triples(&trial.accel_triples())
            .ok_or(TrialError::EmptyTrial)
    }

    /// Igual que `smooth` sobre tripletas (ax, ay, az) sueltas
    pub fn smooth_triples(&self, triples: &[[f64; 3]]) -> Option<SmoothedWindow> {
        if triples.is_empty() {
            return None;
        }

        // Orden estable por ay: los empates conservan el orden de captura
        let mut sorted = triples.to_vec();
        sorted.sort_by(|a, b| a[1].total_cmp(&b[1]));

        let take = self.window.min(sorted.len());
        let last_window = &sorted[sorted.len() - take..];

        let xs: Vec<f64> = last_window.iter().map(|t| t[0]).collect();
        let ys: Vec<f64> = last_window.iter().map(|t| t[1]).collect();
        let zs: Vec<f64> = last_window.iter().map(|t| t[2]).collect();

        let smoothed_x = *moving_average(&xs, take).last()?;
        let smoothed_y = *moving_average(&ys, take).last()?;
        let smoothed_z = *moving_average(&zs, take).last()?;

        let filtered_y = reject_outliers(&ys, self.sigma_limit);
        let max_y = *filtered_y.last()?;

        debug!(
            "Ventana {}/{}: x={:.3} y={:.3} z={:.3} max_y={:.3} (descartados {})",
            take,
            triples.len(),
            smoothed_x,
            smoothed_y,
            smoothed_z,
            max_y,
            ys.len() - filtered_y.len()
        );

        Some(SmoothedWindow {
            smoothed_x,
            smoothed_y,
            smoothed_z,
            filtered_y,
            max_y,
        })
    }
}

impl Default for WindowSmoother {
    fn default() -> Self {
        Self::new(WINDOW_SIZE, SIGMA_LIMIT)
    }
}

/// Media móvil uniforme en modo "valid": una salida por cada posición donde
/// la ventana de `width` cabe entera.
pub fn moving_average(values: &[f64], width: usize) -> Vec<f64> {
    if width == 0 || values.len() < width {
        return Vec::new();
    }
    values
        .windows(width)
        .map(|w| w.iter().sum::<f64>() / width as f64)
        .collect()
}

/// Conserva los valores dentro de media ± `sigma_limit`·σ (σ poblacional),
/// respetando el orden de entrada.
pub fn reject_outliers(values: &[f64], sigma_limit: f64) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();

    let lower = mean - sigma_limit * std;
    let upper = mean + sigma_limit * std;

    values
        .iter()
        .copied()
        .filter(|v| *v >= lower && *v <= upper)
        .collect()
}
