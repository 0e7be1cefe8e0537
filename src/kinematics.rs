use crate::error::TrialError;
use crate::smoothing::SmoothedWindow;
use crate::types::{round_to, SubjectProfile, Trial, TrialMetrics, GRAVITY};

/// Entradas del cálculo para un intento
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicInputs {
    /// Segundos entre la primera y la última muestra del impulso
    pub ascent_duration_s: f64,
    pub smoothed_x: f64,
    pub smoothed_y: f64,
    pub smoothed_z: f64,
    pub max_y: f64,
    /// Giroscopio de la lectura que cerró la fase, sin suavizar
    pub gyro: [f64; 3],
}

impl KinematicInputs {
    pub fn from_trial(trial: &Trial, smoothed: &SmoothedWindow) -> Self {
        Self {
            ascent_duration_s: trial.ascent_duration_s(),
            smoothed_x: smoothed.smoothed_x,
            smoothed_y: smoothed.smoothed_y,
            smoothed_z: smoothed.smoothed_z,
            max_y: smoothed.max_y,
            gyro: trial.terminal().gyro(),
        }
    }
}

/// Convierte la ventana suavizada y el perfil del sujeto en métricas.
///
/// Cada paso redondea a 3 decimales (el IMC a 2) y los pasos siguientes usan
/// el valor ya redondeado.
#[derive(Debug, Clone, Copy)]
pub struct KinematicCalculator {
    gravity: f64,
}

impl KinematicCalculator {
    pub fn new(gravity: f64) -> Self {
        Self { gravity }
    }

    pub fn compute(
        &self,
        inputs: &KinematicInputs,
        profile: &SubjectProfile,
    ) -> Result<TrialMetrics, TrialError> {
        let g = self.gravity;
        let seg = inputs.ascent_duration_s;

        let projectile_height_cm = round_to((inputs.max_y * seg.powi(2) / 2.0) * 100.0, 3);

        if inputs.smoothed_y == 0.0 {
            return Err(TrialError::NumericDomain {
                quantity: "tiempo de ascenso",
                radicand: f64::INFINITY,
            });
        }
        let ascent_radicand = 2.0 * (projectile_height_cm / 100.0) / inputs.smoothed_y;
        // Con smoothed_y < 0 sólo vale una altura proyectil nula
        if inputs.smoothed_y < 0.0 && projectile_height_cm != 0.0 {
            return Err(TrialError::NumericDomain {
                quantity: "tiempo de ascenso",
                radicand: ascent_radicand,
            });
        }
        let ascent_time_s = round_to(checked_sqrt("tiempo de ascenso", ascent_radicand)?, 3);

        let travel_distance_cm =
            round_to((inputs.smoothed_x * ascent_time_s.powi(2) / 2.0) * 100.0, 3);

        let jump_height_cm = if inputs.smoothed_y > 0.0 {
            round_to(composite_height(inputs), 3)
        } else {
            0.0
        };

        let displacement_m = jump_height_cm / 100.0;
        let hpo_m = profile.hpo_m();
        let bmi = profile.bmi();

        if hpo_m == 0.0 {
            return Err(TrialError::ForceUndefined);
        }
        let force_n = round_to(profile.mass_kg * g * (displacement_m / hpo_m + 1.0), 3);

        let velocity_mps = round_to(checked_sqrt("velocidad", g * displacement_m / 2.0)?, 3);
        let power_w = round_to(velocity_mps * force_n, 3);
        let work_j = round_to(profile.mass_kg * g * (hpo_m + displacement_m), 3);

        Ok(TrialMetrics {
            jump_height_cm,
            ascent_time_s,
            max_accel: inputs.max_y,
            force_n,
            velocity_mps,
            power_w,
            work_j,
            bmi,
            projectile_height_cm,
            travel_distance_cm,
        })
    }
}

impl Default for KinematicCalculator {
    fn default() -> Self {
        Self::new(GRAVITY)
    }
}

/// Magnitud de la aceleración suavizada más magnitud del giroscopio
fn composite_height(inputs: &KinematicInputs) -> f64 {
    let accel = (inputs.smoothed_x.powi(2) + inputs.smoothed_y.powi(2) + inputs.smoothed_z.powi(2))
        .sqrt();
    let [gx, gy, gz] = inputs.gyro;
    let gyro = (gx.powi(2) + gy.powi(2) + gz.powi(2)).sqrt();
    accel + gyro
}

fn checked_sqrt(quantity: &'static str, radicand: f64) -> Result<f64, TrialError> {
    // -0.0 es válido; NaN no
    if radicand < 0.0 || radicand.is_nan() {
        return Err(TrialError::NumericDomain { quantity, radicand });
    }
    Ok(radicand.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> SubjectProfile {
        SubjectProfile {
            name: "Ana".to_string(),
            age: 24.0,
            mass_kg: 70.0,
            height_cm: 175.0,
            lower_limb_length_cm: 90.0,
            initial_height_cm: 30.0,
        }
    }

    fn reference_inputs() -> KinematicInputs {
        KinematicInputs {
            ascent_duration_s: 0.3,
            smoothed_x: 1.0,
            smoothed_y: 10.0,
            smoothed_z: 0.5,
            max_y: 12.0,
            gyro: [0.0; 3],
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_reference_jump() {
        let m = KinematicCalculator::default()
            .compute(&reference_inputs(), &profile())
            .unwrap();

        assert!(close(m.projectile_height_cm, 54.0));
        assert!(close(m.ascent_time_s, 0.329));
        assert!(close(m.travel_distance_cm, 5.412));
        assert!(close(m.jump_height_cm, 10.062));
        assert!(close(m.bmi, 22.86));
        assert!(close(m.force_n, 801.586));
        assert!(close(m.velocity_mps, 0.702));
        assert!(close(m.power_w, 562.713));
        assert!(close(m.work_j, 480.951));
        assert_eq!(m.max_accel, 12.0);
    }

    #[test]
    fn test_gyro_adds_to_height() {
        let inputs = KinematicInputs {
            gyro: [0.0, 3.0, 4.0],
            ..reference_inputs()
        };
        let m = KinematicCalculator::default().compute(&inputs, &profile()).unwrap();
        assert!(close(m.jump_height_cm, 15.062));
    }

    #[test]
    fn test_negative_smoothed_y_zeroes_height() {
        let inputs = KinematicInputs {
            ascent_duration_s: 0.0,
            smoothed_y: -1.0,
            ..reference_inputs()
        };
        let p = profile();
        let m = KinematicCalculator::default().compute(&inputs, &p).unwrap();

        assert_eq!(m.jump_height_cm, 0.0);
        assert_eq!(m.force_n, round_to(p.mass_kg * GRAVITY, 3));
        assert_eq!(m.work_j, round_to(p.mass_kg * GRAVITY * p.hpo_m(), 3));
        assert_eq!(m.velocity_mps, 0.0);
        assert_eq!(m.power_w, 0.0);
    }

    #[test]
    fn test_negative_ascent_radicand_is_domain_error() {
        let inputs = KinematicInputs {
            smoothed_y: -1.0,
            ..reference_inputs()
        };
        let err = KinematicCalculator::default()
            .compute(&inputs, &profile())
            .unwrap_err();
        assert!(matches!(
            err,
            TrialError::NumericDomain {
                quantity: "tiempo de ascenso",
                ..
            }
        ));
    }

    #[test]
    fn test_negative_smoothed_y_and_max_y_is_domain_error() {
        // El radicando sale positivo, pero el tiempo de ascenso no está definido
        let inputs = KinematicInputs {
            smoothed_y: -1.0,
            max_y: -12.0,
            ..reference_inputs()
        };
        let err = KinematicCalculator::default()
            .compute(&inputs, &profile())
            .unwrap_err();
        match err {
            TrialError::NumericDomain { quantity, radicand } => {
                assert_eq!(quantity, "tiempo de ascenso");
                assert!(radicand > 0.0);
            }
            other => panic!("esperaba NumericDomain, obtuve {:?}", other),
        }
    }

    #[test]
    fn test_zero_smoothed_y_is_domain_error() {
        let inputs = KinematicInputs {
            smoothed_y: 0.0,
            ..reference_inputs()
        };
        assert!(matches!(
            KinematicCalculator::default().compute(&inputs, &profile()),
            Err(TrialError::NumericDomain { .. })
        ));
    }

    #[test]
    fn test_zero_hpo_force_undefined() {
        let p = SubjectProfile {
            lower_limb_length_cm: 45.0,
            initial_height_cm: 45.0,
            ..profile()
        };
        assert_eq!(
            KinematicCalculator::default().compute(&reference_inputs(), &p),
            Err(TrialError::ForceUndefined)
        );
    }

    #[test]
    fn test_negative_hpo_not_clamped() {
        let p = SubjectProfile {
            lower_limb_length_cm: 30.0,
            initial_height_cm: 90.0,
            ..profile()
        };
        let m = KinematicCalculator::default().compute(&reference_inputs(), &p).unwrap();
        // hpo = -0.6: el cociente resta en lugar de sumar
        assert!(m.force_n < p.mass_kg * GRAVITY);
        assert!(m.work_j < 0.0);
    }

    #[test]
    fn test_deterministic() {
        let calc = KinematicCalculator::default();
        let a = calc.compute(&reference_inputs(), &profile()).unwrap();
        let b = calc.compute(&reference_inputs(), &profile()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_inputs_from_trial() {
        use crate::types::Sample;

        let samples = vec![
            Sample::new(0, [1.0, 10.0, 0.5], [0.0; 3]),
            Sample::new(300_000_000, [1.0, 12.0, 0.5], [0.0; 3]),
        ];
        let trial = Trial::new(samples, Sample::new(310_000_000, [0.0, 1.0, 0.0], [0.1, 0.2, 0.2]));
        let smoothed = SmoothedWindow {
            smoothed_x: 1.0,
            smoothed_y: 11.0,
            smoothed_z: 0.5,
            filtered_y: vec![10.0, 12.0],
            max_y: 12.0,
        };
        let inputs = KinematicInputs::from_trial(&trial, &smoothed);
        assert_eq!(inputs.ascent_duration_s, 0.3);
        assert_eq!(inputs.gyro, [0.1, 0.2, 0.2]);
        assert_eq!(inputs.max_y, 12.0);
    }
}
