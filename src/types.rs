use serde::{Deserialize, Serialize};

/// Constantes del sistema
pub const WINDOW_SIZE: usize = 7; // ventana de media móvil
pub const GRAVITY: f64 = 9.80665; // m/s^2
pub const UPPER_THRESHOLD: f64 = 9.0; // umbral inicial de aceleración vertical
pub const LOWER_THRESHOLD: f64 = 5.0;
pub const TIGHTENED_THRESHOLD: f64 = 2.0; // umbral tras el primer ascenso detectado
pub const SIGMA_LIMIT: f64 = 3.0; // límite de outliers en desviaciones estándar
pub const SAMPLING_RATE_HZ: f64 = 1000.0;

/// Una lectura del IMU: aceleración lineal (m/s^2), velocidad angular y
/// marca de tiempo monotónica en nanosegundos.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp_ns: u64,
    pub ax: f64,
    pub ay: f64,
    pub az: f64,
    pub gx: f64,
    pub gy: f64,
    pub gz: f64,
}

impl Sample {
    pub fn new(timestamp_ns: u64, accel: [f64; 3], gyro: [f64; 3]) -> Self {
        Self {
            timestamp_ns,
            ax: accel[0],
            ay: accel[1],
            az: accel[2],
            gx: gyro[0],
            gy: gyro[1],
            gz: gyro[2],
        }
    }

    pub fn accel(&self) -> [f64; 3] {
        [self.ax, self.ay, self.az]
    }

    pub fn gyro(&self) -> [f64; 3] {
        [self.gx, self.gy, self.gz]
    }
}

/// Muestras capturadas durante una fase ascendente.
///
/// No se guarda un centinela de tiempo cero: `len()` cuenta sólo muestras
/// reales y la duración se mide entre la primera y la última. `terminal` es la
/// lectura que cerró la fase (su giroscopio entra en la altura compuesta).
#[derive(Debug, Clone, PartialEq)]
pub struct Trial {
    samples: Vec<Sample>,
    terminal: Sample,
}

impl Trial {
    pub fn new(samples: Vec<Sample>, terminal: Sample) -> Self {
        Self { samples, terminal }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn terminal(&self) -> &Sample {
        &self.terminal
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Segundos entre la primera y la última muestra capturada, redondeado a ms.
    pub fn ascent_duration_s(&self) -> f64 {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => {
                let elapsed = last.timestamp_ns.saturating_sub(first.timestamp_ns);
                round_to(elapsed as f64 / 1e9, 3)
            }
            _ => 0.0,
        }
    }

    /// Tripletas (ax, ay, az) en orden de captura
    pub fn accel_triples(&self) -> Vec<[f64; 3]> {
        self.samples.iter().map(Sample::accel).collect()
    }
}

/// Datos del sujeto evaluado, fijos durante toda la sesión.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubjectProfile {
    pub name: String,
    pub age: f64,
    pub mass_kg: f64,
    pub height_cm: f64,
    pub lower_limb_length_cm: f64,
    pub initial_height_cm: f64,
}

impl SubjectProfile {
    /// hpo: longitud del miembro inferior menos la altura inicial, en metros.
    /// Puede ser negativa.
    pub fn hpo_m(&self) -> f64 {
        (self.lower_limb_length_cm / 100.0) - (self.initial_height_cm / 100.0)
    }

    pub fn bmi(&self) -> f64 {
        let height_m = self.height_cm / 100.0;
        round_to(self.mass_kg / height_m.powi(2), 2)
    }
}

/// Resultados de un intento
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialMetrics {
    /// Altura compuesta (magnitud de aceleración + giroscopio)
    pub jump_height_cm: f64,
    pub ascent_time_s: f64,
    pub max_accel: f64,
    pub force_n: f64,
    pub velocity_mps: f64,
    pub power_w: f64,
    pub work_j: f64,
    pub bmi: f64,
    /// Estimación intermedia a partir de la aceleración máxima
    pub projectile_height_cm: f64,
    /// Desplazamiento horizontal (eje X)
    pub travel_distance_cm: f64,
}

/// Fila del registro CSV. El orden de los campos es el orden de las columnas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub name: String,
    pub age: f64,
    pub mass_kg: f64,
    pub height_cm: f64,
    pub jump_height_cm: f64,
    pub ascent_time_s: f64,
    pub max_accel: f64,
    pub force_n: f64,
    pub velocity_mps: f64,
    pub power_w: f64,
    pub work_j: f64,
    pub bmi: f64,
}

impl TrialRecord {
    pub fn new(profile: &SubjectProfile, metrics: &TrialMetrics) -> Self {
        Self {
            name: profile.name.clone(),
            age: profile.age,
            mass_kg: profile.mass_kg,
            height_cm: profile.height_cm,
            jump_height_cm: metrics.jump_height_cm,
            ascent_time_s: metrics.ascent_time_s,
            max_accel: metrics.max_accel,
            force_n: metrics.force_n,
            velocity_mps: metrics.velocity_mps,
            power_w: metrics.power_w,
            work_j: metrics.work_j,
            bmi: metrics.bmi,
        }
    }
}

/// Redondea a `decimals` cifras decimales
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
