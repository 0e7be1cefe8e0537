use std::fs;
use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::types::SubjectProfile;

/// Pide los datos del sujeto por consola, en el orden de la planilla.
pub fn read_profile<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<SubjectProfile> {
    let name = ask(input, output, "Nombre: ")?;
    if name.is_empty() {
        bail!("El nombre no puede estar vacío");
    }

    Ok(SubjectProfile {
        name,
        age: ask_number(input, output, "Edad: ")?,
        mass_kg: ask_number(input, output, "Peso en kg: ")?,
        height_cm: ask_number(input, output, "Altura corporal en cm: ")?,
        lower_limb_length_cm: ask_number(input, output, "Longitud del miembro inferior en cm: ")?,
        initial_height_cm: ask_number(input, output, "Altura inicial en cm: ")?,
    })
}

/// Carga el perfil desde un JSON
pub fn load_profile(path: impl AsRef<Path>) -> Result<SubjectProfile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("No se pudo leer el perfil {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Perfil inválido en {}", path.display()))
}

fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> Result<String> {
    write!(output, "{}", prompt)?;
    output.flush()?;

    let mut line = String::new();
    let read = input.read_line(&mut line)?;
    if read == 0 {
        bail!("Entrada cerrada esperando \"{}\"", prompt.trim_end_matches(": "));
    }
    Ok(line.trim().to_string())
}

fn ask_number<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> Result<f64> {
    let raw = ask(input, output, prompt)?;
    let field = prompt.trim_end_matches(": ");
    let value: f64 = raw
        .replace(',', ".")
        .parse()
        .with_context(|| format!("Valor inválido para \"{}\": {:?}", field, raw))?;
    if !value.is_finite() {
        bail!("Valor inválido para \"{}\": {:?}", field, raw);
    }
    Ok(value)
}
