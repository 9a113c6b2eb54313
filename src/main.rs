use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};

use canopy_id3::{
    AttributeIndex, ConfusionEntry, Dataset, Evaluation, ForestConfig, LabelMetrics, OobMode,
    Prediction, RankedAttribute, TreeConfig,
};
use canopy_io::{ExperimentName, RecordReader, ReportWriter, split_train_test};

#[derive(Parser)]
#[command(name = "canopy")]
#[command(about = "ID3 decision trees and bagged ensembles over categorical records")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for reproducibility
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Input and output options shared by every subcommand.
#[derive(Args, Debug, Clone)]
struct DataArgs {
    /// Path to the comma-delimited records file (no header, non-negative integers)
    #[arg(long)]
    data: PathBuf,

    /// Number of leading records used for training; the rest are test records
    #[arg(long)]
    training_size: usize,

    /// Column holding the label
    #[arg(long, default_value_t = 0)]
    target: usize,

    /// Experiment name for the JSON report (must match [a-zA-Z0-9_-]+)
    #[arg(long)]
    experiment: Option<String>,

    /// Output directory for the report file
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Train one ID3 tree and classify the test records
    Tree {
        #[command(flatten)]
        data: DataArgs,

        /// Include the breadth-first node listing in the output
        #[arg(long, default_value_t = false)]
        print_tree: bool,
    },

    /// Train a bagged ensemble of ID3 trees and classify the test records by majority vote
    Forest {
        #[command(flatten)]
        data: DataArgs,

        /// Number of trees in the ensemble
        #[arg(long, default_value_t = 1000)]
        n_trees: usize,

        /// Compute out-of-bag accuracy on the training records
        #[arg(long, default_value_t = false)]
        oob: bool,
    },
}

// --- stdout / report output structs ---

#[derive(Serialize)]
struct EvaluationOutput {
    accuracy: f64,
    n_correct: usize,
    n_incorrect: usize,
    n_unclassifiable: usize,
    confusion: Vec<ConfusionEntry>,
    label_metrics: Vec<LabelMetrics>,
}

impl From<&Evaluation> for EvaluationOutput {
    fn from(eval: &Evaluation) -> Self {
        Self {
            accuracy: eval.accuracy(),
            n_correct: eval.n_correct(),
            n_incorrect: eval.n_incorrect(),
            n_unclassifiable: eval.n_unclassifiable(),
            confusion: eval.entries(),
            label_metrics: eval.label_metrics(),
        }
    }
}

#[derive(Serialize)]
struct TreeOutput {
    experiment: Option<String>,
    n_train: usize,
    n_test: usize,
    width: usize,
    target: usize,
    n_nodes: usize,
    n_leaves: usize,
    depth: usize,
    #[serde(flatten)]
    evaluation: EvaluationOutput,
    #[serde(skip_serializing_if = "Option::is_none")]
    tree: Option<Vec<String>>,
}

#[derive(Serialize)]
struct ForestOutput {
    experiment: Option<String>,
    n_train: usize,
    n_test: usize,
    width: usize,
    target: usize,
    n_trees: usize,
    seed: u64,
    #[serde(flatten)]
    evaluation: EvaluationOutput,
    oob_accuracy: Option<f64>,
    n_oob_records: Option<usize>,
    importances: Vec<RankedAttribute>,
}

/// Load the records file and split it into training and test sets.
fn load(args: &DataArgs) -> Result<(Dataset, Dataset)> {
    let dataset = RecordReader::new(&args.data)
        .read()
        .with_context(|| format!("failed to read records from {}", args.data.display()))?;
    let (train, test) = split_train_test(&dataset, args.training_size)
        .context("failed to split training and test records")?;
    info!(n_train = train.len(), n_test = test.len(), "dataset split");
    Ok((train, test))
}

fn evaluate(test: &Dataset, target: AttributeIndex, predictions: &[Prediction]) -> Result<Evaluation> {
    let expected: Vec<u32> = test
        .records()
        .iter()
        .map(|record| record[target.index()])
        .collect();
    let eval = Evaluation::from_predictions(&expected, predictions).context("evaluation failed")?;
    debug!("confusion table\n{eval}");
    Ok(eval)
}

fn write_report<T: Serialize>(experiment: Option<&str>, output_dir: &Path, output: &T) -> Result<()> {
    if let Some(name) = experiment {
        let name = ExperimentName::new(name.to_string())?;
        let writer = ReportWriter::new(output_dir, name)?;
        writer.write_report(output).context("failed to write report")?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Tree { data, print_tree } => {
            // Validate the name before any work is done.
            if let Some(name) = &data.experiment {
                ExperimentName::new(name.clone())?;
            }
            let (train, test) = load(&data)?;
            let target = AttributeIndex::new(data.target);

            let tree = TreeConfig::new(target)
                .fit(&train)
                .context("tree induction failed")?;
            info!(n_nodes = tree.n_nodes(), depth = tree.depth(), "tree built");

            let predictions = tree
                .classify_batch(test.records())
                .context("classification failed")?;
            let eval = evaluate(&test, target, &predictions)?;
            info!(accuracy = eval.accuracy(), "test records classified");

            let output = TreeOutput {
                experiment: data.experiment.clone(),
                n_train: train.len(),
                n_test: test.len(),
                width: train.width(),
                target: data.target,
                n_nodes: tree.n_nodes(),
                n_leaves: tree.n_leaves(),
                depth: tree.depth(),
                evaluation: EvaluationOutput::from(&eval),
                tree: print_tree.then(|| tree.to_string().lines().map(str::to_owned).collect()),
            };
            write_report(data.experiment.as_deref(), &data.output_dir, &output)?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Forest { data, n_trees, oob } => {
            if let Some(name) = &data.experiment {
                ExperimentName::new(name.clone())?;
            }
            let (train, test) = load(&data)?;
            let target = AttributeIndex::new(data.target);

            let oob_mode = if oob { OobMode::Enabled } else { OobMode::Disabled };
            let config = ForestConfig::new(n_trees)?
                .with_seed(cli.seed)
                .with_oob_mode(oob_mode);
            let result = config
                .fit(&train, &TreeConfig::new(target))
                .context("ensemble training failed")?;

            let predictions = result
                .forest()
                .classify_batch(test.records())
                .context("classification failed")?;
            let eval = evaluate(&test, target, &predictions)?;
            info!(accuracy = eval.accuracy(), "test records classified");

            let output = ForestOutput {
                experiment: data.experiment.clone(),
                n_train: train.len(),
                n_test: test.len(),
                width: train.width(),
                target: data.target,
                n_trees,
                seed: cli.seed,
                evaluation: EvaluationOutput::from(&eval),
                oob_accuracy: result.oob_score().map(|s| s.accuracy),
                n_oob_records: result.oob_score().map(|s| s.n_oob_records),
                importances: result.importances().to_vec(),
            };
            write_report(data.experiment.as_deref(), &data.output_dir, &output)?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
