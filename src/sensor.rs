use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::types::{Sample, SAMPLING_RATE_HZ};

/// Resultado normal del autotest del IMU
pub const SELF_TEST_OK: u8 = 0x0F;
/// Estado de sistema que indica error interno del sensor
pub const SYSTEM_ERROR: u8 = 0x01;

#[derive(Error, Debug)]
pub enum SensorError {
    #[error("No se pudo inicializar el sensor: {0}")]
    HardwareInit(String),

    #[error("Error interno del sensor (código 0x{code:02X})")]
    HardwareFault { code: u8 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Estado informado por el sensor tras el arranque
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorStatus {
    pub system_status: u8,
    pub self_test: u8,
    pub system_error: u8,
}

impl SensorStatus {
    pub fn nominal() -> Self {
        Self {
            system_status: 0x05,
            self_test: SELF_TEST_OK,
            system_error: 0x00,
        }
    }

    /// Falla con `HardwareFault` si el sensor reporta error de sistema
    pub fn check(self) -> Result<Self, SensorError> {
        if self.system_status == SYSTEM_ERROR {
            return Err(SensorError::HardwareFault {
                code: self.system_error,
            });
        }
        if self.self_test != SELF_TEST_OK {
            log::warn!("Autotest no nominal: 0x{:02X}", self.self_test);
        }
        Ok(self)
    }
}

/// Fuente de muestras de tipo "pull".
///
/// `begin` se llama una sola vez antes de leer; `next_sample` bloquea hasta la
/// siguiente lectura y devuelve `None` cuando la fuente se agota (replay,
/// generadores). Un sensor real no se agota nunca.
pub trait SampleSource {
    fn begin(&mut self) -> Result<SensorStatus, SensorError>;

    fn next_sample(&mut self) -> Result<Option<Sample>, SensorError>;
}

/// Adapta cualquier iterador de muestras (grabaciones en memoria, tests)
pub struct IterSource<I> {
    samples: I,
    status: SensorStatus,
}

impl<I: Iterator<Item = Sample>> IterSource<I> {
    pub fn new(samples: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            samples: samples.into_iter(),
            status: SensorStatus::nominal(),
        }
    }

    pub fn with_status(mut self, status: SensorStatus) -> Self {
        self.status = status;
        self
    }
}

impl<I: Iterator<Item = Sample>> SampleSource for IterSource<I> {
    fn begin(&mut self) -> Result<SensorStatus, SensorError> {
        Ok(self.status)
    }

    fn next_sample(&mut self) -> Result<Option<Sample>, SensorError> {
        Ok(self.samples.next())
    }
}

/// Parámetros del generador sintético
#[derive(Debug, Clone)]
pub struct SyntheticParams {
    /// Número de saltos a generar (default: 3)
    pub jumps: usize,
    /// Muestras en reposo antes de cada salto (default: 40)
    pub idle_samples: usize,
    /// Muestras del impulso ascendente (default: 12)
    pub push_off_samples: usize,
    /// Pico de aceleración vertical durante el impulso (default: 16.0)
    pub peak_accel: f64,
    /// Amplitud del ruido uniforme (default: 0.2)
    pub noise: f64,
    pub sample_rate_hz: f64,
    pub seed: u64,
}

impl Default for SyntheticParams {
    fn default() -> Self {
        Self {
            jumps: 3,
            idle_samples: 40,
            push_off_samples: 12,
            peak_accel: 16.0,
            noise: 0.2,
            sample_rate_hz: SAMPLING_RATE_HZ,
            seed: 7,
        }
    }
}

/// Genera ciclos reposo → impulso → aterrizaje de forma determinista.
pub struct SyntheticSource {
    params: SyntheticParams,
    rng: StdRng,
    tick: u64,
    status: SensorStatus,
    fail_init: Option<String>,
}

impl SyntheticSource {
    pub fn new(params: SyntheticParams) -> Self {
        let rng = StdRng::seed_from_u64(params.seed);
        Self {
            params,
            rng,
            tick: 0,
            status: SensorStatus::nominal(),
            fail_init: None,
        }
    }

    /// Simula un sensor que reporta error de sistema en el arranque
    pub fn with_fault(mut self, code: u8) -> Self {
        self.status = SensorStatus {
            system_status: SYSTEM_ERROR,
            self_test: 0x00,
            system_error: code,
        };
        self
    }

    /// Simula un sensor ausente
    pub fn with_init_failure(mut self, reason: &str) -> Self {
        self.fail_init = Some(reason.to_string());
        self
    }

    fn cycle_len(&self) -> u64 {
        (self.params.idle_samples as u64).saturating_add(self.params.push_off_samples as u64)
    }

    fn jitter(&mut self) -> f64 {
        let amp = self.params.noise.abs();
        self.rng.gen_range(-amp..=amp)
    }

    /// Aceleración vertical sin ruido para la posición `pos` dentro del ciclo
    fn vertical_profile(&self, pos: u64) -> f64 {
        let idle = self.params.idle_samples as u64;
        if pos < idle {
            return 0.5;
        }
        // Impulso: arranca por encima de 10 m/s^2 y sube hasta el pico
        let step = (pos - idle) as f64;
        let n = self.params.push_off_samples.max(1) as f64;
        let rise = (std::f64::consts::PI * (step + 1.0) / (n + 1.0)).sin();
        10.0 + (self.params.peak_accel - 10.0).max(0.0) * rise
    }
}

impl SampleSource for SyntheticSource {
    fn begin(&mut self) -> Result<SensorStatus, SensorError> {
        if let Some(reason) = &self.fail_init {
            return Err(SensorError::HardwareInit(reason.clone()));
        }
        Ok(self.status)
    }

    fn next_sample(&mut self) -> Result<Option<Sample>, SensorError> {
        let cycle = self.cycle_len();
        if cycle == 0 {
            return Ok(None);
        }
        let active = cycle.saturating_mul(self.params.jumps as u64);
        // Un ciclo de reposo extra al final cierra la última fase ascendente
        let total = active.saturating_add(self.params.idle_samples.max(1) as u64);
        if self.tick >= total {
            return Ok(None);
        }

        let pos = self.tick % cycle;
        let in_tail = self.tick >= active;
        let base_y = if in_tail { 0.5 } else { self.vertical_profile(pos) };

        let ay = base_y + self.jitter();
        let ax = 0.8 + self.jitter();
        let az = 0.3 + self.jitter();
        let gx = self.jitter();
        let gy = self.jitter();
        let gz = self.jitter();

        let timestamp_ns = (self.tick as f64 * 1e9 / self.params.sample_rate_hz) as u64;
        self.tick += 1;

        Ok(Some(Sample::new(timestamp_ns, [ax, ay, az], [gx, gy, gz])))
    }
}
