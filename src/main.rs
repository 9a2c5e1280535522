//! Tena interactive shell.
//!
//! Reads one Amharic symptom description per line from stdin and prints the
//! full explanation for each as pretty-printed JSON.
//!
//! ```bash
//! tena --data-dir ./data --backend hashed_ngram
//! echo "ራሴን ሰንጥቆ ያመኛል" | tena --threshold 0.6
//! ```

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use tena_lib::config;
use tena_lib::pipeline::explain::ExplainablePipeline;
use tena_lib::pipeline::storage::ModelCache;
use tena_lib::pipeline_config::{EmbeddingBackend, PipelineConfig, DEFAULT_THRESHOLD, DEFAULT_TOP_K};
use tena_lib::shell::run_shell;

#[derive(Parser)]
#[command(name = "tena")]
#[command(version)]
#[command(about = "Explainable Amharic symptom triage shell")]
#[command(long_about = None)]
struct Cli {
    /// Directory holding lexicons/ and examples.json
    #[arg(long, env = config::DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    /// Number of corpus matches reported per input
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,

    /// Minimum similarity for a confident match (inclusive)
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f32,

    /// Embedding back-end: hashed_ngram or onnx
    #[arg(long, env = "TENA_BACKEND")]
    backend: Option<EmbeddingBackend>,

    /// Directory with model.onnx and tokenizer.json (onnx back-end)
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Identifier reported as `embedding_model` (onnx back-end)
    #[arg(long)]
    model_id: Option<String>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long)]
    log: Option<String>,
}

impl Cli {
    fn pipeline_config(&self) -> PipelineConfig {
        let data_dir = self.data_dir.clone().unwrap_or_else(config::data_dir);
        let mut cfg = PipelineConfig::from_data_dir(&data_dir);
        cfg.top_k = self.top_k;
        cfg.threshold = self.threshold;

        if let Some(backend) = self.backend {
            cfg.embedding.backend = backend;
        }
        if let Some(model_id) = &self.model_id {
            cfg.embedding.model_dir = config::models_dir().join(model_id);
            cfg.embedding.model_id = model_id.clone();
        }
        if let Some(model_dir) = &self.model_dir {
            cfg.embedding.model_dir = model_dir.clone();
        }
        cfg
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    tena_lib::init_tracing(cli.log.as_deref());

    let cfg = cli.pipeline_config();
    let models = ModelCache::new();

    let pipeline = match ExplainablePipeline::new(&cfg, &models) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            tracing::error!(error = %e, "Failed to start pipeline");
            eprintln!("tena: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run_shell(&pipeline, io::stdin().lock(), io::stdout().lock()) {
        Ok(explained) => {
            tracing::info!(explained, model = pipeline.embedding_model(), "Shell closed");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("tena: {e}");
            ExitCode::FAILURE
        }
    }
}
