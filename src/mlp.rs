//! Small fully-connected network with sigmoid units on every layer, trained
//! one example at a time with plain gradient descent on squared error.

use std::collections::BTreeSet;

use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::{EngineError, Result};
use crate::outcome::logistic as sigmoid;

const LOG_EVERY_EPOCHS: usize = 25;

#[derive(Debug, Clone, PartialEq)]
pub struct MlpConfig {
    pub hidden_layers: Vec<usize>,
    /// Weights start uniform in `[-init_range, init_range]`.
    pub init_range: f64,
}

impl Default for MlpConfig {
    fn default() -> Self {
        Self {
            hidden_layers: vec![15, 10],
            init_range: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainParams {
    pub max_iterations: usize,
    pub learning_rate: f64,
    /// Training stops once the epoch's mean squared error drops below this.
    pub target_error: f64,
}

impl Default for TrainParams {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            learning_rate: 0.1,
            target_error: 0.01,
        }
    }
}

impl TrainParams {
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(EngineError::config("max_iterations must be at least 1"));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(EngineError::config(format!(
                "learning rate must be a positive number, got {}",
                self.learning_rate
            )));
        }
        if !self.target_error.is_finite() || self.target_error < 0.0 {
            return Err(EngineError::config(format!(
                "target error must be >= 0, got {}",
                self.target_error
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingReport {
    pub samples: usize,
    pub epochs: usize,
    pub final_error: f64,
    pub converged: bool,
    /// Exact-match accuracy on the training set, in [0, 1]. Not a
    /// validation figure.
    pub accuracy: f64,
}

#[derive(Debug, Clone)]
struct Layer {
    // weights[out][in]
    weights: Vec<Vec<f64>>,
    biases: Vec<f64>,
}

impl Layer {
    fn random<R: Rng + ?Sized>(inputs: usize, outputs: usize, range: f64, rng: &mut R) -> Self {
        let weights = (0..outputs)
            .map(|_| (0..inputs).map(|_| rng.gen_range(-range..=range)).collect())
            .collect();
        Self {
            weights,
            biases: vec![0.0; outputs],
        }
    }

    /// Returns (pre-activation, activation).
    fn forward(&self, input: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let z: Vec<f64> = self
            .weights
            .iter()
            .zip(&self.biases)
            .map(|(row, b)| row.iter().zip(input).map(|(w, x)| w * x).sum::<f64>() + b)
            .collect();
        let a = z.iter().map(|v| sigmoid(*v)).collect();
        (z, a)
    }
}

fn sigmoid_prime(z: f64) -> f64 {
    let s = sigmoid(z);
    s * (1.0 - s)
}

#[derive(Debug, Clone)]
pub struct Mlp<L> {
    input_size: usize,
    config: MlpConfig,
    layers: Vec<Layer>,
    labels: Vec<L>,
    accuracy: Option<f64>,
}

impl<L> Mlp<L>
where
    L: Clone + Ord + Send + Sync,
{
    pub fn new(input_size: usize, config: MlpConfig) -> Result<Self> {
        if input_size == 0 {
            return Err(EngineError::config("network needs at least one input"));
        }
        if let Some(pos) = config.hidden_layers.iter().position(|n| *n == 0) {
            return Err(EngineError::config(format!(
                "hidden layer {pos} has zero units"
            )));
        }
        if !config.init_range.is_finite() || config.init_range <= 0.0 {
            return Err(EngineError::config(format!(
                "init range must be a positive number, got {}",
                config.init_range
            )));
        }
        Ok(Self {
            input_size,
            config,
            layers: Vec::new(),
            labels: Vec::new(),
            accuracy: None,
        })
    }

    pub fn is_trained(&self) -> bool {
        !self.layers.is_empty()
    }

    /// Distinct labels seen by the last `fit`, in output-unit order.
    pub fn labels(&self) -> &[L] {
        &self.labels
    }

    pub fn training_accuracy(&self) -> Option<f64> {
        self.accuracy
    }

    /// Unit counts from input to output. The output size is only known
    /// after training.
    pub fn layer_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![self.input_size];
        sizes.extend(&self.config.hidden_layers);
        if self.is_trained() {
            sizes.push(self.labels.len());
        }
        sizes
    }

    pub fn describe(&self) -> String {
        let sizes = self
            .layer_sizes()
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join("-");
        format!("MLP {sizes} (sigmoid)")
    }

    /// Re-initializes the network and trains it on `inputs`/`labels`.
    pub fn fit<R: Rng + ?Sized>(
        &mut self,
        inputs: &[Vec<f64>],
        labels: &[L],
        params: &TrainParams,
        rng: &mut R,
    ) -> Result<TrainingReport> {
        params.validate()?;
        if inputs.is_empty() {
            return Err(EngineError::invalid("training set is empty"));
        }
        if inputs.len() != labels.len() {
            return Err(EngineError::invalid(format!(
                "{} inputs but {} labels",
                inputs.len(),
                labels.len()
            )));
        }
        for (idx, row) in inputs.iter().enumerate() {
            self.check_input(row)
                .map_err(|err| EngineError::invalid(format!("training row {idx}: {err}")))?;
        }

        let distinct: BTreeSet<L> = labels.iter().cloned().collect();
        let label_set: Vec<L> = distinct.into_iter().collect();
        let targets: Vec<Vec<f64>> = labels
            .iter()
            .map(|y| {
                let mut t = vec![0.0; label_set.len()];
                if let Ok(idx) = label_set.binary_search(y) {
                    t[idx] = 1.0;
                }
                t
            })
            .collect();

        let mut sizes = vec![self.input_size];
        sizes.extend(&self.config.hidden_layers);
        sizes.push(label_set.len());
        self.layers = sizes
            .windows(2)
            .map(|w| Layer::random(w[0], w[1], self.config.init_range, rng))
            .collect();
        self.labels = label_set;
        self.accuracy = None;

        let out_units = self.labels.len() as f64;
        let n = inputs.len() as f64;
        let mut epochs = 0;
        let mut final_error = f64::INFINITY;
        let mut converged = false;

        for epoch in 0..params.max_iterations {
            let mut sq_sum = 0.0;
            for (x, t) in inputs.iter().zip(&targets) {
                sq_sum += self.train_example(x, t, params.learning_rate);
            }
            epochs = epoch + 1;
            final_error = sq_sum / (n * out_units);

            if epoch % LOG_EVERY_EPOCHS == 0 {
                debug!(epoch = epochs, mse = final_error, "mlp epoch");
            }
            if final_error < params.target_error {
                converged = true;
                break;
            }
        }

        let accuracy = self.accuracy(inputs, labels)?;
        self.accuracy = Some(accuracy);

        info!(
            samples = inputs.len(),
            epochs,
            mse = final_error,
            converged,
            accuracy,
            "mlp training finished"
        );

        Ok(TrainingReport {
            samples: inputs.len(),
            epochs,
            final_error,
            converged,
            accuracy,
        })
    }

    /// One forward/backward pass with an immediate weight update. Returns the
    /// summed squared output error before the update.
    fn train_example(&mut self, input: &[f64], target: &[f64], lr: f64) -> f64 {
        let mut activations: Vec<Vec<f64>> = Vec::with_capacity(self.layers.len() + 1);
        let mut pre: Vec<Vec<f64>> = Vec::with_capacity(self.layers.len());
        activations.push(input.to_vec());
        for layer in &self.layers {
            let (z, a) = layer.forward(&activations[activations.len() - 1]);
            pre.push(z);
            activations.push(a);
        }

        let output = &activations[activations.len() - 1];
        let out_z = &pre[pre.len() - 1];
        let mut sq = 0.0;
        let mut delta: Vec<f64> = output
            .iter()
            .zip(target)
            .zip(out_z)
            .map(|((a, t), z)| {
                let e = a - t;
                sq += e * e;
                e * sigmoid_prime(*z)
            })
            .collect();

        for l in (0..self.layers.len()).rev() {
            let layer_input = &activations[l];

            // Propagate through the weights as they were before this update.
            let prev_delta = (l > 0).then(|| {
                let weights = &self.layers[l].weights;
                pre[l - 1]
                    .iter()
                    .enumerate()
                    .map(|(i, z)| {
                        let back: f64 = weights.iter().zip(&delta).map(|(row, d)| row[i] * d).sum();
                        back * sigmoid_prime(*z)
                    })
                    .collect::<Vec<f64>>()
            });

            let layer = &mut self.layers[l];
            for ((row, bias), d) in layer.weights.iter_mut().zip(&mut layer.biases).zip(&delta) {
                for (w, a) in row.iter_mut().zip(layer_input) {
                    *w -= lr * d * a;
                }
                *bias -= lr * d;
            }

            if let Some(next) = prev_delta {
                delta = next;
            }
        }
        sq
    }

    fn check_input(&self, input: &[f64]) -> Result<()> {
        if input.len() != self.input_size {
            return Err(EngineError::invalid(format!(
                "expected {} features, got {}",
                self.input_size,
                input.len()
            )));
        }
        if input.iter().any(|v| !v.is_finite()) {
            return Err(EngineError::invalid("features must be finite"));
        }
        Ok(())
    }

    pub fn output_activations(&self, input: &[f64]) -> Result<Vec<f64>> {
        if !self.is_trained() {
            return Err(EngineError::ModelNotTrained);
        }
        self.check_input(input)?;
        let mut current = input.to_vec();
        for layer in &self.layers {
            current = layer.forward(&current).1;
        }
        Ok(current)
    }

    pub fn predict_one(&self, input: &[f64]) -> Result<L> {
        let out = self.output_activations(input)?;
        let mut best = 0;
        for (idx, v) in out.iter().enumerate() {
            if *v > out[best] {
                best = idx;
            }
        }
        Ok(self.labels[best].clone())
    }

    pub fn predict(&self, inputs: &[Vec<f64>]) -> Result<Vec<L>> {
        inputs.iter().map(|x| self.predict_one(x)).collect()
    }

    /// Fraction of `inputs` whose predicted label equals the given one.
    pub fn accuracy(&self, inputs: &[Vec<f64>], labels: &[L]) -> Result<f64> {
        if inputs.len() != labels.len() {
            return Err(EngineError::invalid("inputs and labels differ in length"));
        }
        if inputs.is_empty() {
            return Ok(0.0);
        }
        let correct = inputs
            .par_iter()
            .zip(labels.par_iter())
            .map(|(x, y)| self.predict_one(x).map(|p| usize::from(p == *y)))
            .try_reduce(|| 0, |a, b| Ok(a + b))?;
        Ok(correct as f64 / inputs.len() as f64)
    }
}
