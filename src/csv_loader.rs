use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, ensure, Context, Result};
use csv::{DeserializeRecordsIntoIter, ReaderBuilder};

use crate::sensor::{SampleSource, SensorError, SensorStatus};
use crate::types::Sample;

/// Cabecera esperada en las grabaciones de muestras
pub const SAMPLE_CSV_HEADER: &str = "timestamp_ns,ax,ay,az,gx,gy,gz";

/// Lee muestras de un CSV `timestamp_ns,ax,ay,az,gx,gy,gz` a medida que se
/// piden. Sirve para archivos grabados y también para un FIFO alimentado por
/// el proceso que habla con el sensor.
pub struct CsvSource<R: Read> {
    records: DeserializeRecordsIntoIter<R, Sample>,
}

impl<R: Read> CsvSource<R> {
    pub fn from_reader(reader: R) -> Self {
        let records = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader)
            .into_deserialize();
        Self { records }
    }
}

impl CsvSource<File> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file =
            File::open(path).with_context(|| format!("No se pudo abrir el CSV {:?}", path))?;
        Ok(Self::from_reader(file))
    }
}

impl<R: Read> SampleSource for CsvSource<R> {
    fn begin(&mut self) -> Result<SensorStatus, SensorError> {
        Ok(SensorStatus::nominal())
    }

    fn next_sample(&mut self) -> Result<Option<Sample>, SensorError> {
        match self.records.next() {
            Some(record) => Ok(Some(record?)),
            None => Ok(None),
        }
    }
}

/// Carga una grabación completa y valida que el tiempo sea monotónico.
pub fn load_samples_from_csv(path: impl AsRef<Path>) -> Result<Vec<Sample>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("No se pudo abrir el CSV {:?}", path))?;

    let mut samples: Vec<Sample> = Vec::new();
    for (row_idx, result) in reader.deserialize().enumerate() {
        let sample: Sample =
            result.with_context(|| format!("Fila {} inválida en {:?}", row_idx + 1, path))?;

        if let Some(prev) = samples.last() {
            if sample.timestamp_ns < prev.timestamp_ns {
                bail!(
                    "Marca de tiempo decreciente en fila {} ({} < {})",
                    row_idx + 1,
                    sample.timestamp_ns,
                    prev.timestamp_ns
                );
            }
        }
        samples.push(sample);
    }

    ensure!(!samples.is_empty(), "El CSV {:?} no contiene datos", path);
    Ok(samples)
}
