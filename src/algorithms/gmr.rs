//! Gaussian mixture regression (GMR).
//!
//! ## Purpose
//!
//! GMR fits a Gaussian mixture to the joint density of inputs and targets with
//! expectation-maximization, then predicts the conditional expectation of the
//! targets given the input:
//!
//! ```text
//! y(x) = Σₖ hₖ(x) · (μʸₖ + Σʸˣₖ (Σˣˣₖ)⁻¹ (x - μˣₖ))
//! hₖ(x) ∝ πₖ · N(x; μˣₖ, Σˣˣₖ)
//! ```
//!
//! ## Design notes
//!
//! * **Initialization**: k-means (Lloyd iterations) from randomly chosen samples;
//!   the seed is part of the meta-parameters.
//! * **Stability**: Responsibilities are computed in log space with the
//!   log-sum-exp trick; a ridge term keeps covariances positive definite.
//! * **Prediction cache**: Everything that does not depend on the query (inverse
//!   input covariances, regression gains, log normalizers) is computed once after
//!   EM, so prediction is a few small loops over caller-owned scratch.
//!
//! ## Invariants
//!
//! * Mixing weights are positive and sum to one.
//! * Conditional weights `hₖ(x)` sum to one for every query.

use std::f64::consts::PI;

use nalgebra::{DMatrix, DVector};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::algorithms::{FunctionApproximator, check_query};
use crate::engine::validator::Validator;
use crate::primitives::buffer::PredictionBuffer;
use crate::primitives::errors::FaError;

/// Lloyd iterations used to initialize the mixture.
const KMEANS_ITERATIONS: usize = 20;

/// Components whose total responsibility falls below this keep their parameters.
const MIN_RESPONSIBILITY: f64 = 1e-8;

// ============================================================================
// Meta-parameters
// ============================================================================

/// Meta-parameters for [`Gmr`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GmrParams {
    /// Input dimensionality.
    pub input_dim: usize,
    /// Number of mixture components.
    pub n_gaussians: usize,
    /// Maximum number of EM iterations.
    pub max_iterations: usize,
    /// Relative log-likelihood change below which EM stops.
    pub tolerance: f64,
    /// Ridge term added to every covariance.
    pub regularization: f64,
    /// Seed for the k-means initialization.
    pub seed: u64,
}

impl GmrParams {
    /// Defaults: 10 components, 100 EM iterations, tolerance `1e-6`.
    pub fn new(input_dim: usize) -> Self {
        Self {
            input_dim,
            n_gaussians: 10,
            max_iterations: 100,
            tolerance: 1e-6,
            regularization: 1e-6,
            seed: 42,
        }
    }

    /// Set the number of components.
    pub fn n_gaussians(mut self, n: usize) -> Self {
        self.n_gaussians = n;
        self
    }

    /// Set the maximum number of EM iterations.
    pub fn max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Set the convergence tolerance.
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the covariance ridge term.
    pub fn regularization(mut self, regularization: f64) -> Self {
        self.regularization = regularization;
        self
    }

    /// Set the initialization seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn validate(&self) -> Result<(), FaError> {
        Validator::validate_count(self.input_dim, "input_dim")?;
        Validator::validate_count(self.n_gaussians, "n_gaussians")?;
        Validator::validate_count(self.max_iterations, "max_iterations")?;
        Validator::validate_positive(self.tolerance, "tolerance")?;
        Validator::validate_positive(self.regularization, "regularization")
    }
}

// ============================================================================
// Mixture (joint density)
// ============================================================================

/// A Gaussian mixture over the joint input/target space.
#[derive(Debug, Clone)]
struct Mixture {
    priors: Vec<f64>,
    means: Vec<DVector<f64>>,
    covariances: Vec<DMatrix<f64>>,
}

impl Mixture {
    fn len(&self) -> usize {
        self.priors.len()
    }

    /// k-means initialization on the rows of `data`.
    fn initialize(data: &DMatrix<f64>, k: usize, ridge: f64, seed: u64) -> Self {
        let (n, p) = data.shape();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut means: Vec<DVector<f64>> = index::sample(&mut rng, n, k)
            .into_iter()
            .map(|i| data.row(i).transpose())
            .collect();

        let mut assignment = vec![0usize; n];
        for _ in 0..KMEANS_ITERATIONS {
            let mut changed = false;
            for (i, slot) in assignment.iter_mut().enumerate() {
                let row = data.row(i).transpose();
                let nearest = means
                    .iter()
                    .enumerate()
                    .map(|(c, m)| (c, (&row - m).norm_squared()))
                    .min_by(|a, b| a.1.total_cmp(&b.1))
                    .map_or(0, |(c, _)| c);
                if *slot != nearest {
                    *slot = nearest;
                    changed = true;
                }
            }
            for (c, mean) in means.iter_mut().enumerate() {
                let members: Vec<usize> = (0..n).filter(|&i| assignment[i] == c).collect();
                if members.is_empty() {
                    continue;
                }
                let mut sum = DVector::zeros(p);
                for &i in &members {
                    sum += data.row(i).transpose();
                }
                *mean = sum / members.len() as f64;
            }
            if !changed {
                break;
            }
        }

        let global = covariance_of(data, &(0..n).collect::<Vec<_>>(), ridge);
        let mut priors = Vec::with_capacity(k);
        let mut covariances = Vec::with_capacity(k);
        for c in 0..k {
            let members: Vec<usize> = (0..n).filter(|&i| assignment[i] == c).collect();
            priors.push(members.len().max(1) as f64);
            covariances.push(if members.len() >= 2 {
                covariance_of(data, &members, ridge)
            } else {
                global.clone()
            });
        }
        let total: f64 = priors.iter().sum();
        priors.iter_mut().for_each(|p| *p /= total);

        Self {
            priors,
            means,
            covariances,
        }
    }

    /// One EM iteration. Returns the log-likelihood before the M-step.
    fn em_step(&mut self, data: &DMatrix<f64>, ridge: f64) -> Result<f64, FaError> {
        let (n, p) = data.shape();
        let k = self.len();

        // E-step
        let mut log_resp = DMatrix::zeros(n, k);
        for c in 0..k {
            let (inverse, log_det) = inverse_and_log_det(&self.covariances[c])?;
            let log_norm = self.priors[c].ln() - 0.5 * (p as f64 * (2.0 * PI).ln() + log_det);
            for i in 0..n {
                let diff = data.row(i).transpose() - &self.means[c];
                let maha = (diff.transpose() * &inverse * &diff)[(0, 0)];
                log_resp[(i, c)] = log_norm - 0.5 * maha;
            }
        }
        let mut log_likelihood = 0.0;
        for i in 0..n {
            let max = log_resp.row(i).max();
            let lse = max
                + log_resp
                    .row(i)
                    .iter()
                    .map(|&v| (v - max).exp())
                    .sum::<f64>()
                    .ln();
            log_likelihood += lse;
            for c in 0..k {
                log_resp[(i, c)] = (log_resp[(i, c)] - lse).exp();
            }
        }
        let resp = log_resp;

        // M-step
        for c in 0..k {
            let weight: f64 = resp.column(c).sum();
            if weight < MIN_RESPONSIBILITY {
                continue;
            }
            let mut mean = DVector::zeros(p);
            for i in 0..n {
                mean += data.row(i).transpose() * resp[(i, c)];
            }
            mean /= weight;

            let mut cov = DMatrix::zeros(p, p);
            for i in 0..n {
                let diff = data.row(i).transpose() - &mean;
                cov += &diff * diff.transpose() * resp[(i, c)];
            }
            cov /= weight;
            for j in 0..p {
                cov[(j, j)] += ridge;
            }

            self.priors[c] = weight / n as f64;
            self.means[c] = mean;
            self.covariances[c] = cov;
        }
        let total: f64 = self.priors.iter().sum();
        self.priors.iter_mut().for_each(|p| *p /= total);

        Ok(log_likelihood)
    }
}

/// Sample covariance of the selected rows plus `ridge * I`.
fn covariance_of(data: &DMatrix<f64>, rows: &[usize], ridge: f64) -> DMatrix<f64> {
    let p = data.ncols();
    let mut mean = DVector::zeros(p);
    for &i in rows {
        mean += data.row(i).transpose();
    }
    mean /= rows.len().max(1) as f64;

    let mut cov = DMatrix::zeros(p, p);
    for &i in rows {
        let diff = data.row(i).transpose() - &mean;
        cov += &diff * diff.transpose();
    }
    cov /= rows.len().max(1) as f64;
    for j in 0..p {
        cov[(j, j)] += ridge;
    }
    cov
}

/// Inverse and log-determinant of a symmetric positive definite matrix.
fn inverse_and_log_det(m: &DMatrix<f64>) -> Result<(DMatrix<f64>, f64), FaError> {
    let chol = m
        .clone()
        .cholesky()
        .ok_or(FaError::SingularSystem("GMR covariance"))?;
    let log_det = 2.0 * chol.l_dirty().diagonal().iter().map(|v| v.ln()).sum::<f64>();
    Ok((chol.inverse(), log_det))
}

// ============================================================================
// Model (conditional cache)
// ============================================================================

/// One component, conditioned on the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GmrComponent {
    mean_input: Vec<f64>,
    mean_output: Vec<f64>,
    /// (Σˣˣ)⁻¹, input_dim × input_dim
    precision: DMatrix<f64>,
    /// Σʸˣ (Σˣˣ)⁻¹, outputs × input_dim
    gain: DMatrix<f64>,
    /// ln πₖ - ½ (d ln 2π + ln det Σˣˣ)
    log_norm: f64,
}

impl GmrComponent {
    fn from_joint(
        prior: f64,
        mean: &DVector<f64>,
        cov: &DMatrix<f64>,
        d: usize,
    ) -> Result<Self, FaError> {
        let o = mean.len() - d;
        let sigma_xx = cov.view((0, 0), (d, d)).into_owned();
        let sigma_yx = cov.view((d, 0), (o, d)).into_owned();
        let (precision, log_det) = inverse_and_log_det(&sigma_xx)?;
        Ok(Self {
            mean_input: mean.rows(0, d).iter().copied().collect(),
            mean_output: mean.rows(d, o).iter().copied().collect(),
            gain: sigma_yx * &precision,
            precision,
            log_norm: prior.ln() - 0.5 * (d as f64 * (2.0 * PI).ln() + log_det),
        })
    }

    #[inline]
    fn log_weight(&self, x: &[f64], diff: &mut [f64]) -> f64 {
        for (k, v) in diff.iter_mut().enumerate() {
            *v = x[k] - self.mean_input[k];
        }
        let mut maha = 0.0;
        for (i, &di) in diff.iter().enumerate() {
            for (j, &dj) in diff.iter().enumerate() {
                maha += di * self.precision[(i, j)] * dj;
            }
        }
        self.log_norm - 0.5 * maha
    }

    /// Mean of the component's input marginal.
    pub fn mean_input(&self) -> &[f64] {
        &self.mean_input
    }

    /// Mean of the component's output marginal.
    pub fn mean_output(&self) -> &[f64] {
        &self.mean_output
    }
}

/// Trained GMR model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GmrModel {
    components: Vec<GmrComponent>,
    log_likelihood: f64,
    iterations: usize,
}

impl GmrModel {
    /// Conditioned components.
    pub fn components(&self) -> &[GmrComponent] {
        &self.components
    }

    /// Log-likelihood of the training data at the last EM iteration.
    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    /// EM iterations performed.
    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

/// Gaussian mixture regression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gmr {
    params: GmrParams,
    output_dim: usize,
    model: Option<GmrModel>,
}

impl Gmr {
    /// Create an untrained approximator.
    pub fn new(params: GmrParams) -> Self {
        Self {
            params,
            output_dim: 1,
            model: None,
        }
    }

    /// Meta-parameters.
    pub fn params(&self) -> &GmrParams {
        &self.params
    }

    /// Trained model, if any.
    pub fn model(&self) -> Option<&GmrModel> {
        self.model.as_ref()
    }
}

impl FunctionApproximator for Gmr {
    fn name(&self) -> &'static str {
        "GMR"
    }

    fn input_dim(&self) -> usize {
        self.params.input_dim
    }

    fn expected_output_dim(&self) -> usize {
        self.output_dim
    }

    fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    fn train(&mut self, inputs: &DMatrix<f64>, targets: &DMatrix<f64>) -> Result<(), FaError> {
        let p = &self.params;
        p.validate()?;
        Validator::validate_training_data(inputs, targets, p.input_dim, 2)?;

        let d = inputs.ncols();
        let n = inputs.nrows();
        let joint = DMatrix::from_fn(n, d + targets.ncols(), |r, c| {
            if c < d {
                inputs[(r, c)]
            } else {
                targets[(r, c - d)]
            }
        });

        let k = p.n_gaussians.min(n);
        let mut mixture = Mixture::initialize(&joint, k, p.regularization, p.seed);

        let mut previous = f64::NEG_INFINITY;
        let mut log_likelihood = previous;
        let mut iterations = 0;
        for it in 0..p.max_iterations {
            log_likelihood = mixture.em_step(&joint, p.regularization)?;
            iterations = it + 1;
            trace!(iteration = it, log_likelihood, "GMR EM step");
            if (log_likelihood - previous).abs() < p.tolerance * log_likelihood.abs().max(1.0) {
                break;
            }
            previous = log_likelihood;
        }

        let components = (0..mixture.len())
            .map(|c| {
                GmrComponent::from_joint(
                    mixture.priors[c],
                    &mixture.means[c],
                    &mixture.covariances[c],
                    d,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            components = components.len(),
            iterations, log_likelihood, "trained GMR"
        );
        self.output_dim = targets.ncols();
        self.model = Some(GmrModel {
            components,
            log_likelihood,
            iterations,
        });
        Ok(())
    }

    fn reserve_buffer(&self, buffer: &mut PredictionBuffer) {
        let k = self.model.as_ref().map_or(0, |m| m.components.len());
        buffer.ensure_capacity(k, 0, self.params.input_dim);
    }

    fn predict_row(
        &self,
        input: &[f64],
        output: &mut [f64],
        buffer: &mut PredictionBuffer,
    ) -> Result<(), FaError> {
        let model = check_query(
            self.model.as_ref(),
            self.name(),
            input,
            output,
            self.params.input_dim,
            self.output_dim,
        )?;

        let h = buffer.activations.zeroed(model.components.len());
        let diff = buffer.delta.zeroed(input.len());

        let mut max = f64::NEG_INFINITY;
        for (c, comp) in model.components.iter().enumerate() {
            h[c] = comp.log_weight(input, diff);
            max = max.max(h[c]);
        }
        let mut sum = 0.0;
        for v in h.iter_mut() {
            *v = (*v - max).exp();
            sum += *v;
        }

        output.fill(0.0);
        for (c, comp) in model.components.iter().enumerate() {
            let weight = h[c] / sum;
            for (k, v) in diff.iter_mut().enumerate() {
                *v = input[k] - comp.mean_input[k];
            }
            for (o, out) in output.iter_mut().enumerate() {
                let mut y = comp.mean_output[o];
                for (k, &dk) in diff.iter().enumerate() {
                    y += comp.gain[(o, k)] * dk;
                }
                *out += weight * y;
            }
        }
        Ok(())
    }
}
