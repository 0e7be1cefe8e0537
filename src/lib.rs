//! Evaluación de squat jump con un IMU.
//!
//! Flujo: `SampleSource` → `PhaseDetector` → `WindowSmoother` →
//! `KinematicCalculator` → `TrialRecorder`, orquestado por `Session`.

pub mod config;
pub mod csv_loader;
pub mod error;
pub mod kinematics;
pub mod phase_detector;
pub mod profile;
pub mod recorder;
pub mod sensor;
pub mod session;
pub mod smoothing;
pub mod types;

pub use error::TrialError;
pub use phase_detector::{DetectorParams, PhaseDetector, PhaseState, ThresholdPolicy};
pub use sensor::{SampleSource, SensorError, SensorStatus};
pub use session::{Session, SessionSummary};
pub use types::{Sample, SubjectProfile, Trial, TrialMetrics, TrialRecord};
