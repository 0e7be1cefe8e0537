use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::kinematics::KinematicCalculator;
use crate::phase_detector::DetectorParams;
use crate::smoothing::WindowSmoother;
use crate::types::{GRAVITY, SIGMA_LIMIT, WINDOW_SIZE};

/// Configuración de una sesión de evaluación
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub detector: DetectorParams,
    /// Tamaño de la ventana de media móvil (default: 7)
    pub window_size: usize,
    /// Límite de outliers en σ para el eje Y (default: 3.0)
    pub sigma_limit: f64,
    pub gravity: f64,
    /// CSV donde se anexan los resultados (default: "datos.csv")
    pub output_path: PathBuf,
    /// Pausa entre intentos en milisegundos (default: 1)
    pub inter_trial_pause_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            detector: DetectorParams::default(),
            window_size: WINDOW_SIZE,
            sigma_limit: SIGMA_LIMIT,
            gravity: GRAVITY,
            output_path: PathBuf::from("datos.csv"),
            inter_trial_pause_ms: 1,
        }
    }
}

impl SessionConfig {
    /// Lee la configuración de un JSON; si el archivo no existe usa los valores
    /// por defecto.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("Sin configuración en {}, usando valores por defecto", path.display());
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("No se pudo leer la configuración {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Configuración inválida en {}", path.display()))
    }

    pub fn smoother(&self) -> WindowSmoother {
        WindowSmoother::new(self.window_size, self.sigma_limit)
    }

    pub fn calculator(&self) -> KinematicCalculator {
        KinematicCalculator::new(self.gravity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase_detector::ThresholdPolicy;

    #[test]
    fn test_missing_file_gives_defaults() {
        let cfg = SessionConfig::load("/nonexistent/saltometro.json").unwrap();
        assert_eq!(cfg, SessionConfig::default());
        assert_eq!(cfg.window_size, 7);
        assert_eq!(cfg.detector.upper_threshold, 9.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let path = std::env::temp_dir().join("saltometro_config_partial.json");
        fs::write(
            &path,
            r#"{ "detector": { "policy": "fixed" }, "output_path": "salida.csv" }"#,
        )
        .unwrap();

        let cfg = SessionConfig::load(&path).unwrap();
        assert_eq!(cfg.detector.policy, ThresholdPolicy::Fixed);
        assert_eq!(cfg.detector.lower_threshold, 5.0);
        assert_eq!(cfg.output_path, PathBuf::from("salida.csv"));
        assert_eq!(cfg.gravity, GRAVITY);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let path = std::env::temp_dir().join("saltometro_config_unknown.json");
        fs::write(&path, r#"{ "ventana": 9 }"#).unwrap();
        assert!(SessionConfig::load(&path).is_err());
        let _ = fs::remove_file(&path);
    }
}
