use lexevo::{EngineConfig, ErrorMetric, EvolutionEngine, Model, Topology};
use lexevo_nn::{DenseNetwork, NetworkConfig};

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use rayon::prelude::*;
use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::EnvFilter;

use std::error::Error;
use std::fmt;
use std::fs;

type BoxedError = Box<dyn Error + Send + Sync>;

/// Synthetic "u-ball" data: `y = sum(x_i^2) + noise`,
/// with every `x_i` uniform in `[-1, 1]`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
struct DatasetConfig {
    dimensions: usize,
    samples: usize,
    noise: f32,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        DatasetConfig {
            dimensions: 50,
            samples: 200,
            noise: 0.0,
        }
    }
}

/// Gradient descent settings for the plain network baseline,
/// also used as the hybrid runs' learning rate.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
struct Training {
    epochs: usize,
    learning_rate: f32,
}

impl Default for Training {
    fn default() -> Self {
        Training {
            epochs: 10,
            learning_rate: 1e-3,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
struct Experiments {
    seed: u64,
    dataset: DatasetConfig,
    train_fraction: f32,
    hidden_layer_sizes: Vec<usize>,
    training: Training,
    engine: EngineConfig,
    network: NetworkConfig,
}

impl Default for Experiments {
    fn default() -> Self {
        Experiments {
            seed: 42,
            dataset: DatasetConfig::default(),
            train_fraction: 0.8,
            hidden_layer_sizes: vec![5, 25],
            training: Training::default(),
            engine: EngineConfig {
                cases: vec!["mse".to_owned(), "l2".to_owned(), "l1".to_owned()],
                verbose: 0,
                ..EngineConfig::default()
            },
            network: NetworkConfig::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Method {
    Network,
    Genetic,
    Hybrid,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Network => write!(f, "Neural Network"),
            Method::Genetic => write!(f, "GA"),
            Method::Hybrid => write!(f, "Hybrid GA"),
        }
    }
}

struct Dataset {
    inputs: Vec<Vec<f32>>,
    targets: Vec<Vec<f32>>,
}

impl Dataset {
    fn uball<R: Rng>(config: &DatasetConfig, rng: &mut R) -> Result<Dataset, BoxedError> {
        let noise = Normal::new(0.0, config.noise)?;
        let inputs: Vec<Vec<f32>> = (0..config.samples)
            .map(|_| {
                (0..config.dimensions)
                    .map(|_| rng.gen_range(-1.0..=1.0))
                    .collect()
            })
            .collect();
        let targets = inputs
            .iter()
            .map(|x: &Vec<f32>| vec![x.iter().map(|v| v * v).sum::<f32>() + noise.sample(rng)])
            .collect();
        Ok(Dataset { inputs, targets })
    }

    /// Shuffles the examples and splits them in two,
    /// the first part holding `fraction` of them.
    fn split<R: Rng>(self, fraction: f32, rng: &mut R) -> (Dataset, Dataset) {
        let mut examples: Vec<(Vec<f32>, Vec<f32>)> =
            self.inputs.into_iter().zip(self.targets).collect();
        examples.shuffle(rng);
        let at = (examples.len() as f32 * fraction) as usize;
        let test = examples.split_off(at);
        let unzip = |examples: Vec<(Vec<f32>, Vec<f32>)>| {
            let (inputs, targets) = examples.into_iter().unzip();
            Dataset { inputs, targets }
        };
        (unzip(examples), unzip(test))
    }

    fn mse(&self, model: &impl Model) -> f32 {
        let predictions = model.predict(&self.inputs);
        let total: f32 = predictions
            .iter()
            .zip(&self.targets)
            .map(|(p, t)| ErrorMetric::MSE.error(p, t))
            .sum();
        total / self.targets.len().max(1) as f32
    }
}

/// Fits a model with `method` on `train`, returning its test error.
fn evaluate(
    method: Method,
    hidden: usize,
    experiments: &Experiments,
    train: &Dataset,
    test: &Dataset,
) -> Result<f32, BoxedError> {
    let topology = Topology::single_hidden(experiments.dataset.dimensions, hidden, 1)?;
    let mut network =
        DenseNetwork::with_config(topology, experiments.network.clone(), experiments.seed);

    let fitted = match method {
        Method::Network => {
            let Training {
                epochs,
                learning_rate,
            } = experiments.training;
            network.train(&train.inputs, &train.targets, epochs, learning_rate);
            network
        }
        Method::Genetic | Method::Hybrid => {
            let config = EngineConfig {
                learning_rate: match method {
                    Method::Hybrid => experiments.training.learning_rate,
                    _ => 0.0,
                },
                ..experiments.engine.clone()
            };
            let mut engine = EvolutionEngine::new(config, network, experiments.seed)?;
            let best = engine.run(&train.inputs, &train.targets)?;
            info!(%method, hidden, train_mse = ?best.fitness(), "evolution finished");
            engine.fitted_model()?
        }
    };
    Ok(test.mse(&fitted))
}

fn main() -> Result<(), BoxedError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let experiments: Experiments = match std::env::args().nth(1) {
        Some(path) => ron::from_str(&fs::read_to_string(path)?)?,
        None => Experiments::default(),
    };
    info!(
        "running experiments:\n{}",
        ron::ser::to_string_pretty(&experiments, PrettyConfig::new())?
    );

    let mut rng = ChaCha8Rng::seed_from_u64(experiments.seed);
    let data = Dataset::uball(&experiments.dataset, &mut rng)?;
    let (train, test) = data.split(experiments.train_fraction, &mut rng);
    println!("train: {} examples, test: {} examples", train.inputs.len(), test.inputs.len());

    let runs: Vec<(Method, usize)> = [Method::Network, Method::Hybrid, Method::Genetic]
        .iter()
        .flat_map(|m| experiments.hidden_layer_sizes.iter().map(move |h| (*m, *h)))
        .collect();
    let results = runs
        .par_iter()
        .map(|&(method, hidden)| {
            evaluate(method, hidden, &experiments, &train, &test).map(|mse| (method, hidden, mse))
        })
        .collect::<Result<Vec<_>, BoxedError>>()?;

    for (method, hidden, mse) in &results {
        println!("{} ({} hidden) MSE: {}", method, hidden, mse);
    }
    for method in [Method::Hybrid, Method::Network, Method::Genetic] {
        let best = results
            .iter()
            .filter(|(m, _, _)| *m == method)
            .min_by(|a, b| a.2.total_cmp(&b.2));
        if let Some((_, hidden, mse)) = best {
            println!("best {} MSE: {} ({} hidden)", method, mse, hidden);
        }
    }
    Ok(())
}
