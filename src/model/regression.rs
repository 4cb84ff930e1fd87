//! Linear regression trained by stochastic gradient descent, plus feature
//! standardization.
//!
//! The regressor supports both batch fitting (reinitialize, then several
//! epochs over the data) and incremental fitting (one pass per call), which
//! is what the window models use for online updates.

/// Regression capability over dense feature vectors.
pub trait Regressor {
    /// Full batch fit: discard previous weights and train from scratch.
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]);

    /// Incremental fit: one gradient pass over the given samples.
    fn partial_fit(&mut self, x: &[Vec<f64>], y: &[f64]);

    /// Predict one value per input row.
    fn predict(&self, x: &[Vec<f64>]) -> Vec<f64>;
}

/// Linear model trained by SGD with L2 regularization and learning-rate
/// decay. Weights are sized lazily from the first sample seen.
#[derive(Debug, Clone)]
pub struct SgdRegressor {
    weights: Vec<f64>,
    bias: f64,
    learning_rate: f64,
    lr_decay: f64,
    l2: f64,
    epochs: usize,
    current_lr: f64,
    samples_seen: u64,
}

impl SgdRegressor {
    pub fn new(learning_rate: f64) -> Self {
        Self {
            weights: Vec::new(),
            bias: 0.0,
            learning_rate,
            lr_decay: 0.999,
            l2: 0.001,
            epochs: 100,
            current_lr: learning_rate,
            samples_seen: 0,
        }
    }

    /// Number of epochs used by batch [`Regressor::fit`].
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs.max(1);
        self
    }

    /// L2 regularization strength.
    pub fn with_l2(mut self, l2: f64) -> Self {
        self.l2 = l2;
        self
    }

    /// Total samples consumed across all fit calls.
    pub fn samples_seen(&self) -> u64 {
        self.samples_seen
    }

    fn reset(&mut self) {
        self.weights.clear();
        self.bias = 0.0;
        self.current_lr = self.learning_rate;
        self.samples_seen = 0;
    }

    fn predict_one(&self, features: &[f64]) -> f64 {
        let dot: f64 = self
            .weights
            .iter()
            .zip(features.iter())
            .map(|(w, f)| w * f)
            .sum();
        dot + self.bias
    }

    fn sgd_step(&mut self, features: &[f64], target: f64) {
        if self.weights.len() < features.len() {
            self.weights.resize(features.len(), 0.0);
        }
        let error = self.predict_one(features) - target;
        for (weight, &feature) in self.weights.iter_mut().zip(features.iter()) {
            let grad = error * feature + self.l2 * *weight;
            *weight -= self.current_lr * grad;
        }
        self.bias -= self.current_lr * error;
        self.current_lr *= self.lr_decay;
        self.samples_seen += 1;
    }
}

impl Default for SgdRegressor {
    fn default() -> Self {
        Self::new(0.01)
    }
}

impl Regressor for SgdRegressor {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) {
        self.reset();
        for _ in 0..self.epochs {
            for (features, &target) in x.iter().zip(y.iter()) {
                self.sgd_step(features, target);
            }
        }
    }

    fn partial_fit(&mut self, x: &[Vec<f64>], y: &[f64]) {
        for (features, &target) in x.iter().zip(y.iter()) {
            self.sgd_step(features, target);
        }
    }

    fn predict(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter().map(|features| self.predict_one(features)).collect()
    }
}

/// Per-feature standardization to zero mean and unit variance.
///
/// Fit once on the first training batch and reused for every later
/// transform, so feature scales stay comparable across fits.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: Vec<f64>,
    std: Vec<f64>,
}

impl StandardScaler {
    /// Compute column means and standard deviations from a batch.
    /// Zero-variance columns keep a divisor of 1.0 so transforming them
    /// yields zeros instead of NaNs.
    pub fn fit(x: &[Vec<f64>]) -> Self {
        let dim = x.first().map(Vec::len).unwrap_or(0);
        let n = x.len().max(1) as f64;

        let mut mean = vec![0.0; dim];
        for row in x {
            for (m, &v) in mean.iter_mut().zip(row.iter()) {
                *m += v;
            }
        }
        for m in &mut mean {
            *m /= n;
        }

        let mut std = vec![0.0; dim];
        for row in x {
            for ((s, m), &v) in std.iter_mut().zip(mean.iter()).zip(row.iter()) {
                *s += (v - m).powi(2);
            }
        }
        for s in &mut std {
            *s = (*s / n).sqrt();
            if *s == 0.0 {
                *s = 1.0;
            }
        }

        Self { mean, std }
    }

    /// Standardize a single feature vector.
    pub fn transform_one(&self, features: &[f64]) -> Vec<f64> {
        features
            .iter()
            .zip(self.mean.iter().zip(self.std.iter()))
            .map(|(&v, (m, s))| (v - m) / s)
            .collect()
    }

    /// Standardize a batch of feature vectors.
    pub fn transform(&self, x: &[Vec<f64>]) -> Vec<Vec<f64>> {
        x.iter().map(|row| self.transform_one(row)).collect()
    }
}
