use thiserror::Error;

/// Errores recuperables: invalidan el intento actual pero no la sesión.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrialError {
    #[error("Dominio numérico inválido en {quantity}: radicando {radicand}")]
    NumericDomain {
        quantity: &'static str,
        radicand: f64,
    },

    #[error("Fuerza indefinida: hpo = 0 (miembro inferior igual a la altura inicial)")]
    ForceUndefined,

    #[error("Intento sin muestras")]
    EmptyTrial,
}
