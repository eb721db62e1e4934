//! Neural Network (Multi-Layer Perceptron) regression
//!
//! A feedforward network trained with mini-batch SGD, momentum, and
//! validation-split early stopping.

use ndarray::{Array1, Array2, Axis};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use super::Regressor;
use crate::error::{PardepError, Result};

/// Activation function for hidden layers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum Activation {
    /// Rectified Linear Unit
    #[default]
    ReLU,
    /// Sigmoid
    Sigmoid,
    /// Hyperbolic tangent
    Tanh,
}

/// Neural Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlpConfig {
    /// Hidden layer sizes
    pub hidden_layers: Vec<usize>,
    /// Activation function for hidden layers
    pub activation: Activation,
    /// Learning rate
    pub learning_rate: f64,
    /// Number of epochs
    pub max_epochs: usize,
    /// Batch size
    pub batch_size: usize,
    /// L2 regularization
    pub alpha: f64,
    /// Random seed
    pub random_state: Option<u64>,
    /// Early stopping patience
    pub early_stopping_patience: usize,
    /// Validation split for early stopping
    pub validation_split: f64,
    /// Momentum
    pub momentum: f64,
}

impl Default for MlpConfig {
    fn default() -> Self {
        Self {
            hidden_layers: vec![100],
            activation: Activation::ReLU,
            learning_rate: 0.001,
            max_epochs: 200,
            batch_size: 32,
            alpha: 0.0001,
            random_state: Some(42),
            early_stopping_patience: 10,
            validation_split: 0.1,
            momentum: 0.9,
        }
    }
}

/// Multi-Layer Perceptron Regressor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlpRegressor {
    config: MlpConfig,
    weights: Vec<Array2<f64>>,
    biases: Vec<Array1<f64>>,
    n_features: usize,
    is_fitted: bool,
}

impl MlpRegressor {
    pub fn new(config: MlpConfig) -> Self {
        Self {
            config,
            weights: Vec::new(),
            biases: Vec::new(),
            n_features: 0,
            is_fitted: false,
        }
    }

    /// Fit the model
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(PardepError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples < 2 {
            return Err(PardepError::TrainingError(
                "need at least 2 samples".to_string(),
            ));
        }
        self.n_features = x.ncols();

        self.initialize_weights();

        let mut rng = match self.config.random_state {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };

        // Split the tail off for validation
        let val_size = (n_samples as f64 * self.config.validation_split) as usize;
        let train_size = n_samples - val_size;

        let x_train = x.slice(ndarray::s![..train_size, ..]).to_owned();
        let y_train = y.slice(ndarray::s![..train_size]).to_owned();
        let x_val = x.slice(ndarray::s![train_size.., ..]).to_owned();
        let y_val = y.slice(ndarray::s![train_size..]).to_owned();

        let mut velocities_w: Vec<Array2<f64>> = self
            .weights
            .iter()
            .map(|w| Array2::zeros(w.raw_dim()))
            .collect();
        let mut velocities_b: Vec<Array1<f64>> = self
            .biases
            .iter()
            .map(|b| Array1::zeros(b.len()))
            .collect();

        let mut best_val_loss = f64::INFINITY;
        let mut patience_counter = 0;

        for _epoch in 0..self.config.max_epochs {
            let mut indices: Vec<usize> = (0..train_size).collect();
            indices.shuffle(&mut rng);

            for batch_start in (0..train_size).step_by(self.config.batch_size) {
                let batch_end = (batch_start + self.config.batch_size).min(train_size);
                let batch_indices = &indices[batch_start..batch_end];

                let x_batch = gather_rows(&x_train, batch_indices);
                let y_batch: Array1<f64> =
                    batch_indices.iter().map(|&i| y_train[i]).collect();

                let (activations, z_values) = self.forward(&x_batch);
                let gradients = self.backward(&y_batch, &activations, &z_values);

                // Momentum update, then L2 shrink
                for (i, (grad_w, grad_b)) in gradients.into_iter().enumerate() {
                    velocities_w[i] = &velocities_w[i] * self.config.momentum
                        - &grad_w * self.config.learning_rate;
                    velocities_b[i] = &velocities_b[i] * self.config.momentum
                        - &grad_b * self.config.learning_rate;

                    self.weights[i] = &self.weights[i] + &velocities_w[i];
                    self.biases[i] = &self.biases[i] + &velocities_b[i];

                    self.weights[i] =
                        &self.weights[i] * (1.0 - self.config.alpha * self.config.learning_rate);
                }
            }

            if val_size > 0 {
                let val_pred = self.forward_predict(&x_val);
                let val_loss = mse(&y_val, &val_pred);

                if val_loss < best_val_loss {
                    best_val_loss = val_loss;
                    patience_counter = 0;
                } else {
                    patience_counter += 1;
                    if patience_counter >= self.config.early_stopping_patience {
                        break;
                    }
                }
            }
        }

        self.is_fitted = true;
        Ok(())
    }

    /// Make predictions
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(PardepError::ModelNotFitted);
        }
        if x.ncols() != self.n_features {
            return Err(PardepError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }
        Ok(self.forward_predict(x))
    }

    fn forward_predict(&self, x: &Array2<f64>) -> Array1<f64> {
        let (activations, _) = self.forward(x);
        activations.last().unwrap().column(0).to_owned()
    }

    fn initialize_weights(&mut self) {
        self.weights.clear();
        self.biases.clear();

        let mut rng = match self.config.random_state {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };

        let mut layer_sizes = vec![self.n_features];
        layer_sizes.extend(&self.config.hidden_layers);
        layer_sizes.push(1); // Single output for regression

        for i in 0..layer_sizes.len() - 1 {
            let n_in = layer_sizes[i];
            let n_out = layer_sizes[i + 1];

            // Xavier/Glorot initialization
            let scale = (2.0 / (n_in + n_out) as f64).sqrt();

            let weights: Vec<f64> = (0..n_in * n_out)
                .map(|_| rng.gen::<f64>() * 2.0 * scale - scale)
                .collect();

            self.weights
                .push(Array2::from_shape_vec((n_in, n_out), weights).expect("shape from sizes"));
            self.biases.push(Array1::zeros(n_out));
        }
    }

    fn forward(&self, x: &Array2<f64>) -> (Vec<Array2<f64>>, Vec<Array2<f64>>) {
        let mut activations = vec![x.clone()];
        let mut z_values = Vec::new();

        for (i, (w, b)) in self.weights.iter().zip(self.biases.iter()).enumerate() {
            let z = activations.last().unwrap().dot(w) + b;
            z_values.push(z.clone());

            let a = if i < self.weights.len() - 1 {
                activate(&z, self.config.activation)
            } else {
                z // Linear output for regression
            };

            activations.push(a);
        }

        (activations, z_values)
    }

    fn backward(
        &self,
        y: &Array1<f64>,
        activations: &[Array2<f64>],
        z_values: &[Array2<f64>],
    ) -> Vec<(Array2<f64>, Array1<f64>)> {
        let n = y.len() as f64;
        let mut gradients = Vec::new();

        // Output layer error (MSE gradient)
        let y_2d = y.clone().insert_axis(Axis(1));
        let output = activations.last().unwrap();
        let mut delta = (output - &y_2d) / n;

        for i in (0..self.weights.len()).rev() {
            let a_prev = &activations[i];

            let grad_w = a_prev.t().dot(&delta);
            let grad_b = delta.sum_axis(Axis(0));

            gradients.push((grad_w, grad_b));

            if i > 0 {
                let z = &z_values[i - 1];
                delta = delta.dot(&self.weights[i].t())
                    * activate_derivative(z, self.config.activation);
            }
        }

        gradients.reverse();
        gradients
    }
}

impl Regressor for MlpRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        MlpRegressor::fit(self, x, y)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        MlpRegressor::predict(self, x)
    }
}

fn activate(z: &Array2<f64>, activation: Activation) -> Array2<f64> {
    match activation {
        Activation::ReLU => z.mapv(|v| v.max(0.0)),
        Activation::Sigmoid => z.mapv(|v| 1.0 / (1.0 + (-v).exp())),
        Activation::Tanh => z.mapv(|v| v.tanh()),
    }
}

fn activate_derivative(z: &Array2<f64>, activation: Activation) -> Array2<f64> {
    match activation {
        Activation::ReLU => z.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 }),
        Activation::Sigmoid => {
            let sig = activate(z, Activation::Sigmoid);
            &sig * &(1.0 - &sig)
        }
        Activation::Tanh => {
            let t = z.mapv(|v| v.tanh());
            1.0 - &t * &t
        }
    }
}

fn gather_rows(x: &Array2<f64>, indices: &[usize]) -> Array2<f64> {
    let n_cols = x.ncols();
    let mut rows = Vec::with_capacity(indices.len() * n_cols);
    for &i in indices {
        rows.extend(x.row(i).iter().copied());
    }
    Array2::from_shape_vec((indices.len(), n_cols), rows).expect("shape from indices")
}

fn mse(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum::<f64>()
        / y_true.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_regression_data() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_vec((100, 2), (0..200).map(|i| (i as f64) * 0.05).collect())
            .unwrap();

        let y: Array1<f64> = x
            .rows()
            .into_iter()
            .map(|row| row[0] * 2.0 + row[1] + 0.5)
            .collect();

        (x, y)
    }

    #[test]
    fn test_mlp_regressor() {
        let (x, y) = create_regression_data();

        let config = MlpConfig {
            hidden_layers: vec![32, 16],
            max_epochs: 500,
            learning_rate: 0.001,
            ..Default::default()
        };

        let mut mlp = MlpRegressor::new(config);
        mlp.fit(&x, &y).unwrap();

        let predictions = mlp.predict(&x).unwrap();
        assert_eq!(predictions.len(), 100);

        let error: f64 = y
            .iter()
            .zip(predictions.iter())
            .map(|(yi, pi)| (yi - pi).powi(2))
            .sum::<f64>()
            / y.len() as f64;

        let y_var = y.var(0.0);
        assert!(error < y_var, "MSE ({}) should be less than variance ({})", error, y_var);
    }

    #[test]
    fn test_unfitted_predict() {
        let mlp = MlpRegressor::new(MlpConfig::default());
        let x = Array2::zeros((2, 3));
        assert!(matches!(mlp.predict(&x), Err(PardepError::ModelNotFitted)));
    }

    #[test]
    fn test_activation_functions() {
        let z = Array2::from_shape_vec((2, 3), vec![-1.0, 0.0, 1.0, -2.0, 0.5, 2.0]).unwrap();

        let relu = activate(&z, Activation::ReLU);
        assert_eq!(relu[[0, 0]], 0.0);
        assert_eq!(relu[[0, 2]], 1.0);

        let sigmoid = activate(&z, Activation::Sigmoid);
        assert!((sigmoid[[0, 1]] - 0.5).abs() < 0.001); // sigmoid(0) = 0.5
    }

    #[test]
    fn test_feature_count_checked() {
        let (x, y) = create_regression_data();
        let config = MlpConfig {
            hidden_layers: vec![8],
            max_epochs: 5,
            ..Default::default()
        };
        let mut mlp = MlpRegressor::new(config);
        mlp.fit(&x, &y).unwrap();

        let wrong = Array2::zeros((4, 5));
        assert!(mlp.predict(&wrong).is_err());
    }
}
