use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::WriterBuilder;

use crate::types::TrialRecord;

/// Destino de los resultados: un registro por intento, sólo anexado.
pub trait TrialRecorder {
    fn record_trial(&mut self, record: &TrialRecord) -> Result<()>;
}

/// Anexa filas sin cabecera a un CSV y vacía el buffer tras cada intento.
pub struct CsvRecorder {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl CsvRecorder {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("No se pudo abrir el registro {:?}", path))?;
        let writer = WriterBuilder::new().has_headers(false).from_writer(file);
        Ok(Self { path, writer })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TrialRecorder for CsvRecorder {
    fn record_trial(&mut self, record: &TrialRecord) -> Result<()> {
        self.writer
            .serialize(record)
            .with_context(|| format!("No se pudo escribir en {:?}", self.path))?;
        self.writer
            .flush()
            .with_context(|| format!("No se pudo vaciar {:?}", self.path))?;
        self.writer.get_ref().sync_data()?;
        Ok(())
    }
}

/// Registro en memoria (replay y tests)
impl TrialRecorder for Vec<TrialRecord> {
    fn record_trial(&mut self, record: &TrialRecord) -> Result<()> {
        self.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn record(name: &str, height: f64) -> TrialRecord {
        TrialRecord {
            name: name.to_string(),
            age: 24.0,
            mass_kg: 70.0,
            height_cm: 175.0,
            jump_height_cm: height,
            ascent_time_s: 0.329,
            max_accel: 12.0,
            force_n: 801.586,
            velocity_mps: 0.702,
            power_w: 562.713,
            work_j: 480.951,
            bmi: 22.86,
        }
    }

    #[test]
    fn test_appends_without_header() {
        let path = std::env::temp_dir().join("saltometro_recorder_test.csv");
        let _ = fs::remove_file(&path);

        {
            let mut recorder = CsvRecorder::open(&path).unwrap();
            recorder.record_trial(&record("Ana", 10.062)).unwrap();
        }
        {
            // Reabrir no debe truncar
            let mut recorder = CsvRecorder::open(&path).unwrap();
            recorder.record_trial(&record("Luis", 9.5)).unwrap();
        }

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Ana,24.0,70.0,175.0,10.062,0.329,12.0,801.586"));
        assert!(lines[0].ends_with(",22.86"));
        assert!(lines[1].starts_with("Luis,"));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_vec_recorder() {
        let mut store: Vec<TrialRecord> = Vec::new();
        store.record_trial(&record("Ana", 10.0)).unwrap();
        store.record_trial(&record("Luis", 9.5)).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store[0].jump_height_cm, 10.0);
        assert_eq!(store[1].name, "Luis");
    }
}
