//! Approximator selection by name.
//!
//! ## Purpose
//!
//! The benchmark and the command line refer to approximators by short names
//! (`"LWR"`, `"GMR"`, ...). This module maps those names to concrete models and
//! wraps them in one tagged enum that can be trained, queried and serialized
//! without knowing the variant.
//!
//! ## Design notes
//!
//! * **Closed set**: `Approximator` is an enum rather than a boxed trait object,
//!   so a saved `model.json` names its own kind and loads back into the right type.
//! * **Factory**: `Approximator::by_name` returns `None` for unknown names; the
//!   `FromStr` impl of `ApproximatorKind` returns `FaError::UnknownApproximator`.

use core::fmt;
use core::str::FromStr;
use std::path::Path;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::algorithms::FunctionApproximator;
use crate::algorithms::gmr::{Gmr, GmrParams};
use crate::algorithms::gpr::{Gpr, GprParams};
use crate::algorithms::lwpr::{Lwpr, LwprParams};
use crate::algorithms::lwr::{Lwr, LwrParams};
use crate::algorithms::rbfn::{Rbfn, RbfnParams};
use crate::algorithms::rrrff::{Rrrff, RrrffParams};
use crate::engine::persistence::{self, SampleRecord};
use crate::primitives::buffer::PredictionBuffer;
use crate::primitives::errors::FaError;

// ============================================================================
// Kind
// ============================================================================

/// The available approximator families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApproximatorKind {
    /// Locally weighted regression.
    Lwr,
    /// Ridge regression with random Fourier features.
    Rrrff,
    /// Locally weighted projection regression.
    Lwpr,
    /// Gaussian mixture regression.
    Gmr,
    /// Radial basis function network.
    Rbfn,
    /// Gaussian process regression.
    Gpr,
}

impl ApproximatorKind {
    /// Every kind, in display order.
    pub const ALL: [ApproximatorKind; 6] = [
        ApproximatorKind::Lwr,
        ApproximatorKind::Rrrff,
        ApproximatorKind::Lwpr,
        ApproximatorKind::Gmr,
        ApproximatorKind::Rbfn,
        ApproximatorKind::Gpr,
    ];

    /// Short upper-case name.
    pub fn name(&self) -> &'static str {
        match self {
            ApproximatorKind::Lwr => "LWR",
            ApproximatorKind::Rrrff => "RRRFF",
            ApproximatorKind::Lwpr => "LWPR",
            ApproximatorKind::Gmr => "GMR",
            ApproximatorKind::Rbfn => "RBFN",
            ApproximatorKind::Gpr => "GPR",
        }
    }
}

impl fmt::Display for ApproximatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ApproximatorKind {
    type Err = FaError;

    /// Names are matched case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApproximatorKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| FaError::UnknownApproximator(s.to_string()))
    }
}

// ============================================================================
// Approximator
// ============================================================================

/// Any approximator, tagged by kind when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Approximator {
    /// Locally weighted regression.
    Lwr(Lwr),
    /// Ridge regression with random Fourier features.
    Rrrff(Rrrff),
    /// Locally weighted projection regression.
    Lwpr(Lwpr),
    /// Gaussian mixture regression.
    Gmr(Gmr),
    /// Radial basis function network.
    Rbfn(Rbfn),
    /// Gaussian process regression.
    Gpr(Gpr),
}

impl Approximator {
    /// An untrained approximator of `kind` with default meta-parameters.
    pub fn new(kind: ApproximatorKind, input_dim: usize) -> Self {
        match kind {
            ApproximatorKind::Lwr => Approximator::Lwr(Lwr::new(LwrParams::new(input_dim))),
            ApproximatorKind::Rrrff => {
                Approximator::Rrrff(Rrrff::new(RrrffParams::new(input_dim)))
            }
            ApproximatorKind::Lwpr => Approximator::Lwpr(Lwpr::new(LwprParams::new(input_dim))),
            ApproximatorKind::Gmr => Approximator::Gmr(Gmr::new(GmrParams::new(input_dim))),
            ApproximatorKind::Rbfn => Approximator::Rbfn(Rbfn::new(RbfnParams::new(input_dim))),
            ApproximatorKind::Gpr => Approximator::Gpr(Gpr::new(GprParams::new(input_dim))),
        }
    }

    /// Factory by name; `None` when the name is unknown.
    pub fn by_name(name: &str, input_dim: usize) -> Option<Self> {
        name.parse()
            .ok()
            .map(|kind| Approximator::new(kind, input_dim))
    }

    /// The kind of the wrapped model.
    pub fn kind(&self) -> ApproximatorKind {
        match self {
            Approximator::Lwr(_) => ApproximatorKind::Lwr,
            Approximator::Rrrff(_) => ApproximatorKind::Rrrff,
            Approximator::Lwpr(_) => ApproximatorKind::Lwpr,
            Approximator::Gmr(_) => ApproximatorKind::Gmr,
            Approximator::Rbfn(_) => ApproximatorKind::Rbfn,
            Approximator::Gpr(_) => ApproximatorKind::Gpr,
        }
    }

    fn inner(&self) -> &dyn FunctionApproximator {
        match self {
            Approximator::Lwr(a) => a,
            Approximator::Rrrff(a) => a,
            Approximator::Lwpr(a) => a,
            Approximator::Gmr(a) => a,
            Approximator::Rbfn(a) => a,
            Approximator::Gpr(a) => a,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn FunctionApproximator {
        match self {
            Approximator::Lwr(a) => a,
            Approximator::Rrrff(a) => a,
            Approximator::Lwpr(a) => a,
            Approximator::Gmr(a) => a,
            Approximator::Rbfn(a) => a,
            Approximator::Gpr(a) => a,
        }
    }

    /// Train, then optionally save the model with its training data and
    /// predictions into `save_dir`.
    pub fn train_and_save(
        &mut self,
        inputs: &DMatrix<f64>,
        targets: &DMatrix<f64>,
        save_dir: Option<&Path>,
        overwrite: bool,
    ) -> Result<(), FaError> {
        self.train(inputs, targets)?;
        if let Some(dir) = save_dir {
            let outputs = self.predict(inputs)?;
            let samples = SampleRecord::from_matrices(inputs, targets, &outputs);
            persistence::save(dir, overwrite, &*self, &samples)?;
        }
        Ok(())
    }

    /// Read a model saved by [`Approximator::train_and_save`].
    pub fn load(dir: &Path) -> Result<Self, FaError> {
        persistence::load(dir)
    }
}

impl FunctionApproximator for Approximator {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn input_dim(&self) -> usize {
        self.inner().input_dim()
    }

    fn expected_output_dim(&self) -> usize {
        self.inner().expected_output_dim()
    }

    fn is_trained(&self) -> bool {
        self.inner().is_trained()
    }

    fn train(&mut self, inputs: &DMatrix<f64>, targets: &DMatrix<f64>) -> Result<(), FaError> {
        self.inner_mut().train(inputs, targets)
    }

    fn reserve_buffer(&self, buffer: &mut PredictionBuffer) {
        self.inner().reserve_buffer(buffer)
    }

    #[inline]
    fn predict_row(
        &self,
        input: &[f64],
        output: &mut [f64],
        buffer: &mut PredictionBuffer,
    ) -> Result<(), FaError> {
        self.inner().predict_row(input, output, buffer)
    }

    fn predict(&self, inputs: &DMatrix<f64>) -> Result<DMatrix<f64>, FaError> {
        self.inner().predict(inputs)
    }
}
