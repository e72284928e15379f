//! Saving and loading trained models.
//!
//! ## Purpose
//!
//! A trained approximator can be written to a directory together with the data
//! it was trained on and its predictions, and read back later for prediction.
//!
//! ## Design notes
//!
//! * **Layout**: `<dir>/model.json` holds the serialized model; `<dir>/samples.json`
//!   holds `inputs`, `targets` and `outputs` as row vectors.
//! * **Generic**: Functions are generic over `Serialize`/`DeserializeOwned`, so any
//!   model type (including the tagged `Approximator`) can be stored.
//! * **Overwrite**: Without `overwrite`, a non-empty directory is never touched.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use nalgebra::DMatrix;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::primitives::errors::FaError;

/// File name of the serialized model.
pub const MODEL_FILE: &str = "model.json";

/// File name of the sample record.
pub const SAMPLES_FILE: &str = "samples.json";

/// Training data and predictions stored next to a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    /// One entry per sample.
    pub inputs: Vec<Vec<f64>>,
    /// One entry per sample.
    pub targets: Vec<Vec<f64>>,
    /// Model predictions for `inputs`.
    pub outputs: Vec<Vec<f64>>,
}

impl SampleRecord {
    /// Build a record from sample-major matrices.
    pub fn from_matrices(
        inputs: &DMatrix<f64>,
        targets: &DMatrix<f64>,
        outputs: &DMatrix<f64>,
    ) -> Self {
        Self {
            inputs: rows(inputs),
            targets: rows(targets),
            outputs: rows(outputs),
        }
    }
}

fn rows(m: &DMatrix<f64>) -> Vec<Vec<f64>> {
    m.row_iter()
        .map(|r| r.iter().copied().collect())
        .collect()
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> FaError + '_ {
    move |source| FaError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn is_populated(dir: &Path) -> Result<bool, FaError> {
    if !dir.exists() {
        return Ok(false);
    }
    let mut entries = fs::read_dir(dir).map_err(io_error(dir))?;
    Ok(entries.next().is_some())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), FaError> {
    let file = File::create(path).map_err(io_error(path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush().map_err(io_error(path))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, FaError> {
    let file = File::open(path).map_err(io_error(path))?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Write `model` and `samples` into `dir`, creating it if needed.
///
/// Returns the path of the written model file.
pub fn save<M: Serialize>(
    dir: &Path,
    overwrite: bool,
    model: &M,
    samples: &SampleRecord,
) -> Result<PathBuf, FaError> {
    if !overwrite && is_populated(dir)? {
        return Err(FaError::OutputExists(dir.to_path_buf()));
    }
    fs::create_dir_all(dir).map_err(io_error(dir))?;

    let model_path = dir.join(MODEL_FILE);
    write_json(&model_path, model)?;
    write_json(&dir.join(SAMPLES_FILE), samples)?;

    info!(dir = %dir.display(), samples = samples.inputs.len(), "saved model");
    Ok(model_path)
}

/// Read the model stored in `dir`.
pub fn load<M: DeserializeOwned>(dir: &Path) -> Result<M, FaError> {
    let model = read_json(&dir.join(MODEL_FILE))?;
    debug!(dir = %dir.display(), "loaded model");
    Ok(model)
}

/// Read the sample record stored in `dir`.
pub fn load_samples(dir: &Path) -> Result<SampleRecord, FaError> {
    read_json(&dir.join(SAMPLES_FILE))
}
