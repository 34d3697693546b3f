//! Nova converter CLI.
//!
//! Converts ONNX models to the Nova graph format for the Nova execution
//! engine, with inspection, reverse export, and hub download helpers.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use nova_converter::{convert, download, export, graph_builder, inspect, nova, onnx};

#[derive(Parser)]
#[command(name = "nova")]
#[command(about = "Convert ONNX models to the Nova graph format")]
#[command(version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an ONNX model to Nova format
    Convert {
        /// Input ONNX model file
        input: PathBuf,

        /// Output .nova file (defaults to the input name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert an ONNX model and validate it against the execution-graph
    /// builder
    Import {
        /// Input ONNX model file
        input: PathBuf,

        /// Output .nova file (defaults to the input name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export a Nova model back to ONNX
    Export {
        /// Input .nova file
        input: PathBuf,

        /// Output ONNX file (defaults to the input name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show a summary of a model file
    Inspect {
        /// Model file (.onnx or .nova)
        input: PathBuf,

        /// Model format, inferred from the extension when omitted
        #[arg(long)]
        format: Option<Format>,
    },

    /// Download a model from the Hugging Face hub
    Download {
        /// Model ID, e.g. 'openai/whisper-tiny.en'
        #[arg(long)]
        model: String,

        /// Output directory for downloaded files
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// API key for gated repositories
        #[arg(long, env = "HF_API_KEY")]
        api_key: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Onnx,
    Nova,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Convert { input, output } => run_convert(&input, output, false),
        Commands::Import { input, output } => run_convert(&input, output, true),
        Commands::Export { input, output } => run_export(&input, output),
        Commands::Inspect { input, format } => run_inspect(&input, format),
        Commands::Download {
            model,
            output,
            api_key,
        } => run_download(&model, &output, api_key),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "nova_converter=debug"
    } else {
        "nova_converter=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(false)
        .init();
}

fn run_convert(input: &Path, output: Option<PathBuf>, validate: bool) -> Result<()> {
    let output = output.unwrap_or_else(|| input.with_extension(nova::NOVA_EXTENSION));

    let model = onnx::load_model(input)
        .with_context(|| format!("failed to load ONNX model {}", input.display()))?;

    if validate {
        graph_builder::validate_source_attributes(&model)?;
    }

    let converted = convert::convert_model(&model, Some(input))
        .with_context(|| format!("failed to convert {}", input.display()))?;

    let (node_count, param_count) = match converted.graph.as_ref() {
        Some(g) => (g.nodes.len(), g.parameters.len()),
        None => (0, 0),
    };

    if validate {
        let graph = graph_builder::ExecutionGraph::build(&converted)
            .context("execution-graph validation failed")?;
        println!("Validated {} layers", graph.layers.len());
    }

    nova::save(&converted, &output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!("Converted {} -> {}", input.display(), output.display());
    println!("  Nodes:      {}", node_count);
    println!("  Parameters: {}", param_count);
    Ok(())
}

fn run_export(input: &Path, output: Option<PathBuf>) -> Result<()> {
    let output = output.unwrap_or_else(|| input.with_extension("onnx"));

    let model = nova::load(input)
        .with_context(|| format!("failed to load Nova model {}", input.display()))?;
    let exported = export::export_model(&model)
        .with_context(|| format!("failed to export {}", input.display()))?;
    onnx::save_model(&exported, &output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!("Exported {} -> {}", input.display(), output.display());
    Ok(())
}

fn run_inspect(input: &Path, format: Option<Format>) -> Result<()> {
    let format = match format {
        Some(f) => f,
        None => match input.extension().and_then(|e| e.to_str()) {
            Some("onnx") => Format::Onnx,
            Some(ext) if ext == nova::NOVA_EXTENSION => Format::Nova,
            _ => bail!(
                "cannot infer the model format of {}; pass --format",
                input.display()
            ),
        },
    };

    match format {
        Format::Onnx => inspect::inspect_onnx(input)?,
        Format::Nova => inspect::inspect_nova(input)?,
    }
    Ok(())
}

fn run_download(model_id: &str, output: &Path, api_key: Option<String>) -> Result<()> {
    let client = download::HubClient::new(api_key);
    let result = client
        .download(model_id, output)
        .with_context(|| format!("failed to download '{model_id}'"))?;

    println!("Downloaded model to: {}", result.model_path.display());
    if !result.tokenizer_paths.is_empty() {
        println!("Tokenizer files:");
        for path in &result.tokenizer_paths {
            println!("  - {}", path.display());
        }
    }
    Ok(())
}
