//! ngpred CLI: train, evaluate and query a backoff character n-gram model.

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ngpred_core::io::{read_lines, write_predictions};
use ngpred_core::model::config::{DEFAULT_MAX_GRAMS, DEFAULT_TOP_K, DEFAULT_UNIGRAM_FALLBACK_SIZE};
use ngpred_core::{corpus, BasicNormalizer, ModelConfig, NGramModel};

#[derive(Parser)]
#[command(name = "ngpred")]
#[command(about = "Next-character prediction with a backoff character n-gram model")]
#[command(version)]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Train a model from conversation records and save it
	Train {
		/// Dataset file, one conversation record per line
		#[arg(short, long)]
		data: PathBuf,

		/// Directory receiving model.sda
		#[arg(short, long, default_value = "work")]
		work_dir: PathBuf,

		/// Highest n-gram order
		#[arg(long, default_value_t = DEFAULT_MAX_GRAMS)]
		max_grams: usize,

		/// Size of the fallback unigram list
		#[arg(long, default_value_t = DEFAULT_UNIGRAM_FALLBACK_SIZE)]
		fallback: usize,
	},

	/// Predict every line of a test file and write one prediction per line
	Test {
		/// Directory holding model.sda
		#[arg(short, long, default_value = "work")]
		work_dir: PathBuf,

		/// Input contexts, one per line
		#[arg(long)]
		test_data: PathBuf,

		/// Output predictions, one per line
		#[arg(long)]
		test_output: PathBuf,

		/// Characters predicted per context
		#[arg(long, default_value_t = DEFAULT_TOP_K)]
		top_k: usize,
	},

	/// Predict the next characters of the given contexts
	Predict {
		/// Directory holding model.sda
		#[arg(short, long, default_value = "work")]
		work_dir: PathBuf,

		/// Characters predicted per context
		#[arg(long, default_value_t = DEFAULT_TOP_K)]
		top_k: usize,

		/// Contexts to complete
		#[arg(required = true)]
		contexts: Vec<String>,
	},
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	match Cli::parse().command {
		Commands::Train { data, work_dir, max_grams, fallback } => {
			let config = ModelConfig::new(max_grams, fallback, DEFAULT_TOP_K)?;
			let text = corpus::load_training_text(&data, &BasicNormalizer)?;

			let mut model = NGramModel::new(config);
			log::info!("Training {}-gram model", max_grams);
			model.train(&text);

			fs::create_dir_all(&work_dir)?;
			let path = model.save(&work_dir)?;
			println!("Model saved to {}", path.display());
		}
		Commands::Test { work_dir, test_data, test_output, top_k } => {
			let mut model = NGramModel::load(&work_dir)?;
			model.set_default_top_k(top_k)?;

			let contexts = read_lines(&test_data)?;
			log::info!("Predicting {} contexts", contexts.len());
			let predictions = model.run_pred(&contexts);
			write_predictions(&predictions, &test_output)?;
			println!("Wrote {} predictions to {}", predictions.len(), test_output.display());
		}
		Commands::Predict { work_dir, top_k, contexts } => {
			let mut model = NGramModel::load(&work_dir)?;
			model.set_default_top_k(top_k)?;

			for (context, prediction) in contexts.iter().zip(model.run_pred(&contexts)) {
				println!("{context:?} -> {prediction:?}");
			}
		}
	}

	Ok(())
}
