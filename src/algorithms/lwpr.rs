//! Locally weighted projection regression (LWPR).
//!
//! ## Purpose
//!
//! LWPR is an incremental learner. It covers the input space with receptive
//! fields (Gaussian kernels with their own distance metric), and inside each
//! field fits a local linear model by partial least squares (PLS) along a few
//! projection directions. Fields are created on demand whenever a sample is not
//! explained by any existing field.
//!
//! ## Design notes
//!
//! * **Incremental statistics**: All regression quantities are exponentially
//!   discounted sufficient statistics, updated one sample at a time with a
//!   forgetting factor that anneals from `init_lambda` toward `final_lambda`.
//! * **Normalized inputs**: Inputs are divided by their training range so the
//!   distance metric has the same meaning in every dimension.
//! * **Distance metric adaptation**: When enabled, the Cholesky factor `M` of
//!   each field's metric `D = MᵀM` follows a stochastic gradient of the weighted
//!   leave-one-out error plus a penalty on `‖D‖²`.
//! * **Batch training**: `train` replays the data set for a number of epochs in
//!   a seeded random order.
//!
//! ## Key concepts
//!
//! * **w_gen**: A new field is created when no field is activated above it.
//! * **w_prune**: When two fields are both activated above it, the narrower one
//!   is removed.
//!
//! ## Invariants
//!
//! * `M` is upper triangular with a positive diagonal.
//! * Each output dimension has its own independent set of fields.
//!
//! ## Reference
//!
//! Vijayakumar, S., D'Souza, A., & Schaal, S. (2005). "Incremental Online
//! Learning in High Dimensions." Neural Computation.

use nalgebra::DMatrix;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::algorithms::{FunctionApproximator, check_query};
use crate::engine::validator::Validator;
use crate::math::kernel::gaussian;
use crate::math::{linalg, stats};
use crate::primitives::buffer::PredictionBuffer;
use crate::primitives::errors::FaError;

/// Fields activated below this are ignored in updates and predictions.
const ACTIVATION_CUTOFF: f64 = 1e-3;

/// Guard for divisions by accumulated statistics.
const TINY: f64 = 1e-10;

/// Lower bound on the diagonal of `M`.
const MIN_METRIC: f64 = 1e-3;

/// Largest relative change of a metric entry in one gradient step.
const MAX_METRIC_STEP: f64 = 0.1;

// ============================================================================
// Meta-parameters
// ============================================================================

/// Meta-parameters for [`Lwpr`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LwprParams {
    /// Input dimensionality.
    pub input_dim: usize,
    /// Diagonal of the initial distance metric (in normalized input units).
    pub init_d: f64,
    /// Activation below which a new receptive field is created.
    pub w_gen: f64,
    /// Activation above which overlapping fields are pruned; 1 disables pruning.
    pub w_prune: f64,
    /// Whether to adapt the distance metrics.
    pub update_d: bool,
    /// Learning rate of the distance metric.
    pub init_alpha: f64,
    /// Penalty on large distance metrics.
    pub penalty: f64,
    /// Restrict distance metrics to diagonal matrices.
    pub diag_only: bool,
    /// Initial forgetting factor.
    pub init_lambda: f64,
    /// Asymptotic forgetting factor.
    pub final_lambda: f64,
    /// Annealing rate of the forgetting factor.
    pub tau_lambda: f64,
    /// A projection is added when the last one reduced the error below this ratio.
    pub add_threshold: f64,
    /// Passes over the training data.
    pub epochs: usize,
    /// Seed for the sample order.
    pub seed: u64,
}

impl LwprParams {
    /// Defaults: `init_d` 200 in 1D and 50 otherwise, `w_gen = 0.2`, metric
    /// adaptation on, 50 epochs.
    pub fn new(input_dim: usize) -> Self {
        Self {
            input_dim,
            init_d: if input_dim == 1 { 200.0 } else { 50.0 },
            w_gen: 0.2,
            w_prune: 0.9,
            update_d: true,
            init_alpha: 0.05,
            penalty: 1e-6,
            diag_only: true,
            init_lambda: 0.999,
            final_lambda: 0.99999,
            tau_lambda: 0.9999,
            add_threshold: 0.5,
            epochs: 50,
            seed: 42,
        }
    }

    /// Set the initial distance metric.
    pub fn init_d(mut self, init_d: f64) -> Self {
        self.init_d = init_d;
        self
    }

    /// Set the field creation threshold.
    pub fn w_gen(mut self, w_gen: f64) -> Self {
        self.w_gen = w_gen;
        self
    }

    /// Set the pruning threshold.
    pub fn w_prune(mut self, w_prune: f64) -> Self {
        self.w_prune = w_prune;
        self
    }

    /// Enable or disable distance metric adaptation.
    pub fn update_d(mut self, update_d: bool) -> Self {
        self.update_d = update_d;
        self
    }

    /// Set the distance metric learning rate.
    pub fn init_alpha(mut self, alpha: f64) -> Self {
        self.init_alpha = alpha;
        self
    }

    /// Set the metric penalty.
    pub fn penalty(mut self, penalty: f64) -> Self {
        self.penalty = penalty;
        self
    }

    /// Restrict metrics to diagonal matrices.
    pub fn diag_only(mut self, diag_only: bool) -> Self {
        self.diag_only = diag_only;
        self
    }

    /// Set the number of training epochs.
    pub fn epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Set the shuffling seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn validate(&self) -> Result<(), FaError> {
        Validator::validate_count(self.input_dim, "input_dim")?;
        Validator::validate_positive(self.init_d, "init_d")?;
        Validator::validate_open_unit(self.w_gen, "w_gen")?;
        Validator::validate_unit(self.w_prune, "w_prune")?;
        Validator::validate_non_negative(self.init_alpha, "init_alpha")?;
        Validator::validate_non_negative(self.penalty, "penalty")?;
        Validator::validate_unit(self.init_lambda, "init_lambda")?;
        Validator::validate_unit(self.final_lambda, "final_lambda")?;
        Validator::validate_unit(self.tau_lambda, "tau_lambda")?;
        Validator::validate_open_unit(self.add_threshold, "add_threshold")?;
        Validator::validate_count(self.epochs, "epochs")
    }
}

// ============================================================================
// Receptive Field
// ============================================================================

/// One PLS projection with its discounted statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Projection {
    /// Σ w · yres · xres (unnormalized projection direction)
    s_xres_yres: Vec<f64>,
    /// Unit projection direction.
    u: Vec<f64>,
    /// Σ w · s · xres
    s_xres_s: Vec<f64>,
    /// Input loadings used to deflate the residual.
    p: Vec<f64>,
    /// Σ w · s²
    s_s2: f64,
    /// Σ w · s · yres
    s_s_yres: f64,
    /// Regression coefficient along `u`.
    beta: f64,
    /// Σ w · e² after this projection.
    sum_e2: f64,
}

impl Projection {
    fn new(d: usize) -> Self {
        Self {
            s_xres_yres: vec![0.0; d],
            u: vec![0.0; d],
            s_xres_s: vec![0.0; d],
            p: vec![0.0; d],
            s_s2: 0.0,
            s_s_yres: 0.0,
            beta: 0.0,
            sum_e2: 0.0,
        }
    }
}

/// A receptive field: Gaussian kernel plus local PLS regression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceptiveField {
    center: Vec<f64>,
    /// Upper triangular factor of the distance metric.
    m: DMatrix<f64>,
    mean_x: Vec<f64>,
    beta0: f64,
    sum_w: f64,
    n_data: f64,
    lambda: f64,
    sum_e2_base: f64,
    sum_e_cv2: f64,
    projections: Vec<Projection>,
}

impl ReceptiveField {
    fn new(center: &[f64], m: DMatrix<f64>, y: f64, n_reg: usize, lambda: f64) -> Self {
        let d = center.len();
        Self {
            center: center.to_vec(),
            m,
            mean_x: center.to_vec(),
            beta0: y,
            sum_w: 0.0,
            n_data: 0.0,
            lambda,
            sum_e2_base: 0.0,
            sum_e_cv2: 0.0,
            projections: (0..n_reg).map(|_| Projection::new(d)).collect(),
        }
    }

    /// Center in normalized input space.
    pub fn center(&self) -> &[f64] {
        &self.center
    }

    /// Distance metric `D = MᵀM`.
    pub fn metric(&self) -> DMatrix<f64> {
        self.m.transpose() * &self.m
    }

    /// Number of PLS projections.
    pub fn n_projections(&self) -> usize {
        self.projections.len()
    }

    /// Kernel activation for a normalized input. Does not allocate.
    #[inline]
    fn activation(&self, x: &[f64]) -> f64 {
        let d = x.len();
        let mut sq = 0.0;
        for i in 0..d {
            let mut v = 0.0;
            for j in i..d {
                v += self.m[(i, j)] * (x[j] - self.center[j]);
            }
            sq += v * v;
        }
        gaussian(sq)
    }

    /// Local prediction for a normalized input, using `residual` as scratch.
    #[inline]
    fn predict(&self, x: &[f64], residual: &mut [f64]) -> f64 {
        for (k, r) in residual.iter_mut().enumerate() {
            *r = x[k] - self.mean_x[k];
        }
        let mut y = self.beta0;
        for proj in &self.projections {
            let s = linalg::dot(residual, &proj.u);
            y += s * proj.beta;
            for (k, r) in residual.iter_mut().enumerate() {
                *r -= s * proj.p[k];
            }
        }
        y
    }

    fn trace_metric(&self) -> f64 {
        let d = self.m.nrows();
        let mut trace = 0.0;
        for j in 0..d {
            for i in 0..=j {
                trace += self.m[(i, j)] * self.m[(i, j)];
            }
        }
        trace
    }

    /// Incorporate one sample with activation `w`.
    fn update(&mut self, x: &[f64], y: f64, w: f64, params: &LwprParams) {
        let d = x.len();
        let lambda = self.lambda;
        self.lambda = params.tau_lambda * lambda + params.final_lambda * (1.0 - params.tau_lambda);

        let w_old = self.sum_w;
        self.sum_w = lambda * w_old + w;
        for (k, mx) in self.mean_x.iter_mut().enumerate() {
            *mx = (lambda * w_old * *mx + w * x[k]) / self.sum_w;
        }
        self.beta0 = (lambda * w_old * self.beta0 + w * y) / self.sum_w;
        self.n_data = lambda * self.n_data + 1.0;

        let mut xres: Vec<f64> = x.iter().zip(&self.mean_x).map(|(a, b)| a - b).collect();
        let mut yres = y - self.beta0;
        self.sum_e2_base = lambda * self.sum_e2_base + w * yres * yres;

        let mut leverage = 0.0;
        for proj in &mut self.projections {
            for k in 0..d {
                proj.s_xres_yres[k] = lambda * proj.s_xres_yres[k] + w * yres * xres[k];
            }
            let norm = linalg::dot(&proj.s_xres_yres, &proj.s_xres_yres).sqrt();
            if norm > TINY {
                for k in 0..d {
                    proj.u[k] = proj.s_xres_yres[k] / norm;
                }
            }
            let s = linalg::dot(&xres, &proj.u);

            proj.s_s2 = lambda * proj.s_s2 + w * s * s;
            proj.s_s_yres = lambda * proj.s_s_yres + w * s * yres;
            for k in 0..d {
                proj.s_xres_s[k] = lambda * proj.s_xres_s[k] + w * s * xres[k];
            }
            if proj.s_s2 > TINY {
                proj.beta = proj.s_s_yres / proj.s_s2;
                for k in 0..d {
                    proj.p[k] = proj.s_xres_s[k] / proj.s_s2;
                }
                leverage += s * s / proj.s_s2;
            }

            yres -= s * proj.beta;
            for k in 0..d {
                xres[k] -= s * proj.p[k];
            }
            proj.sum_e2 = lambda * proj.sum_e2 + w * yres * yres;
        }

        self.maybe_add_projection(d, params);

        if params.update_d && self.n_data > 2.0 * d as f64 + 2.0 {
            self.update_metric(x, yres, w, leverage, lambda, params);
        }
    }

    fn maybe_add_projection(&mut self, d: usize, params: &LwprParams) {
        let k = self.projections.len();
        if k >= d || self.n_data < 2.0 * (k + 1) as f64 {
            return;
        }
        let previous = if k >= 2 {
            self.projections[k - 2].sum_e2
        } else {
            self.sum_e2_base
        };
        let last = self.projections[k - 1].sum_e2;
        if previous > TINY && last / previous < params.add_threshold {
            self.projections.push(Projection::new(d));
        }
    }

    fn update_metric(
        &mut self,
        x: &[f64],
        error: f64,
        w: f64,
        leverage: f64,
        lambda: f64,
        params: &LwprParams,
    ) {
        let denom = 1.0 - w * leverage;
        if denom < 0.1 {
            return;
        }
        let e_cv = error / denom;
        self.sum_e_cv2 = lambda * self.sum_e_cv2 + w * e_cv * e_cv;
        let mean_e_cv2 = self.sum_e_cv2 / self.sum_w;
        let dj_dw = (e_cv * e_cv - mean_e_cv2) / self.sum_w;

        let d = x.len();
        let dx: Vec<f64> = x.iter().zip(&self.center).map(|(a, c)| a - c).collect();
        let v: Vec<f64> = (0..d)
            .map(|i| (i..d).map(|j| self.m[(i, j)] * dx[j]).sum())
            .collect();
        let metric = self.metric();
        let m_d = &self.m * &metric;

        for i in 0..d {
            let scale = self.m[(i, i)].abs().max(MIN_METRIC);
            for j in i..d {
                if params.diag_only && i != j {
                    continue;
                }
                let grad = dj_dw * (-w * v[i] * dx[j]) + 4.0 * params.penalty * m_d[(i, j)];
                if !grad.is_finite() {
                    continue;
                }
                let limit = MAX_METRIC_STEP * scale;
                let step = (params.init_alpha * grad).clamp(-limit, limit);
                self.m[(i, j)] -= step;
            }
            if self.m[(i, i)] < MIN_METRIC {
                self.m[(i, i)] = MIN_METRIC;
            }
        }
    }
}

// ============================================================================
// Model
// ============================================================================

/// Trained LWPR model: input normalization and one field set per output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LwprModel {
    norm_in: Vec<f64>,
    fields: Vec<Vec<ReceptiveField>>,
}

impl LwprModel {
    /// Receptive fields of output dimension `o`.
    pub fn fields(&self, o: usize) -> &[ReceptiveField] {
        &self.fields[o]
    }

    /// Largest number of fields over all output dimensions.
    pub fn max_fields(&self) -> usize {
        self.fields.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// Learn one normalized sample for one output dimension.
fn learn_sample(fields: &mut Vec<ReceptiveField>, x: &[f64], y: f64, params: &LwprParams) {
    let d = x.len();
    let mut best: Option<(usize, f64)> = None;
    let mut second: Option<(usize, f64)> = None;

    for (r, rf) in fields.iter_mut().enumerate() {
        let w = rf.activation(x);
        if w > ACTIVATION_CUTOFF {
            rf.update(x, y, w, params);
        }
        if best.is_none_or(|(_, bw)| w > bw) {
            second = best;
            best = Some((r, w));
        } else if second.is_none_or(|(_, sw)| w > sw) {
            second = Some((r, w));
        }
    }

    let max_w = best.map_or(0.0, |(_, w)| w);
    if max_w < params.w_gen {
        let m = match best {
            Some((r, w)) if w > ACTIVATION_CUTOFF => fields[r].m.clone(),
            _ => DMatrix::from_diagonal_element(d, d, params.init_d.sqrt()),
        };
        let n_reg = d.min(2);
        fields.push(ReceptiveField::new(x, m, y, n_reg, params.init_lambda));
        return;
    }

    if params.w_prune < 1.0 {
        if let (Some((a, wa)), Some((b, wb))) = (best, second) {
            if wa > params.w_prune && wb > params.w_prune {
                let narrower = if fields[a].trace_metric() > fields[b].trace_metric() {
                    a
                } else {
                    b
                };
                trace!(field = narrower, "LWPR pruned receptive field");
                fields.remove(narrower);
            }
        }
    }
}

/// Locally weighted projection regression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lwpr {
    params: LwprParams,
    output_dim: usize,
    model: Option<LwprModel>,
}

impl Lwpr {
    /// Create an untrained approximator.
    pub fn new(params: LwprParams) -> Self {
        Self {
            params,
            output_dim: 1,
            model: None,
        }
    }

    /// Meta-parameters.
    pub fn params(&self) -> &LwprParams {
        &self.params
    }

    /// Trained model, if any.
    pub fn model(&self) -> Option<&LwprModel> {
        self.model.as_ref()
    }
}

impl FunctionApproximator for Lwpr {
    fn name(&self) -> &'static str {
        "LWPR"
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
        let params = &self.params;
        params.validate()?;
        Validator::validate_training_data(inputs, targets, params.input_dim, 2)?;

        let norm_in: Vec<f64> = stats::column_ranges(inputs)
            .into_iter()
            .map(|r| if r > TINY { r } else { 1.0 })
            .collect();
        let mut fields: Vec<Vec<ReceptiveField>> = vec![Vec::new(); targets.ncols()];

        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut order: Vec<usize> = (0..inputs.nrows()).collect();
        let mut x = vec![0.0; inputs.ncols()];
        for epoch in 0..params.epochs {
            order.shuffle(&mut rng);
            for &i in &order {
                linalg::copy_row(inputs, i, &mut x);
                for (k, v) in x.iter_mut().enumerate() {
                    *v /= norm_in[k];
                }
                for (o, set) in fields.iter_mut().enumerate() {
                    learn_sample(set, &x, targets[(i, o)], params);
                }
            }
            trace!(
                epoch,
                fields = fields.iter().map(Vec::len).sum::<usize>(),
                "LWPR epoch"
            );
        }

        let model = LwprModel { norm_in, fields };
        debug!(
            max_fields = model.max_fields(),
            epochs = params.epochs,
            "trained LWPR"
        );
        self.output_dim = targets.ncols();
        self.model = Some(model);
        Ok(())
    }

    fn reserve_buffer(&self, buffer: &mut PredictionBuffer) {
        buffer.ensure_capacity(0, 0, self.params.input_dim);
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

        let x = buffer.delta.zeroed(input.len());
        for (k, v) in x.iter_mut().enumerate() {
            *v = input[k] / model.norm_in[k];
        }
        let residual = buffer.residual.zeroed(input.len());

        for (o, out) in output.iter_mut().enumerate() {
            let mut sum_w = 0.0;
            let mut sum_wy = 0.0;
            for rf in &model.fields[o] {
                let w = rf.activation(x);
                if w > ACTIVATION_CUTOFF {
                    sum_wy += w * rf.predict(x, residual);
                    sum_w += w;
                }
            }
            *out = if sum_w > 0.0 { sum_wy / sum_w } else { 0.0 };
        }
        Ok(())
    }
}
