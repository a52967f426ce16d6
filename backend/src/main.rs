//! Romanize CLI - add a pronunciation column to a CSV of native-script names
//!
//! # Commands
//!
//! ```bash
//! romanize serve                           # Start HTTP server (port 3000)
//! romanize run names.csv --column Name     # Process a file, write the artifact
//! romanize name "अमिताभ बच्चन"              # Romanize a single name
//! romanize columns names.csv               # List the columns of a file
//! romanize schemes                         # List scripts and schemes
//! ```
//!
//! Strategy options (`--strategy`, `--source-script`, ...) override the
//! `ROMANIZE_*` environment variables and apply to every command.

use clap::{Args, Parser, Subcommand};
use romanize::{
    parse_csv_file_auto, strategy_from_settings, transliterate_one, ArtifactStore, LlmProvider,
    NamePipeline, Settings, SourceScript, StrategyKind, TargetScheme,
};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "romanize")]
#[command(about = "Romanize native-script personal names in CSV files", long_about = None)]
struct Cli {
    #[command(flatten)]
    options: StrategyOptions,

    #[command(subcommand)]
    command: Commands,
}

/// Overrides for values read from the environment.
#[derive(Args)]
struct StrategyOptions {
    /// Transliteration strategy: rule or llm
    #[arg(long, global = true)]
    strategy: Option<StrategyKind>,

    /// Script of the input names (devanagari, bengali, tamil, ...)
    #[arg(long, global = true)]
    source_script: Option<SourceScript>,

    /// Output scheme: phonetic, iast, itrans or harvard-kyoto
    #[arg(long, global = true)]
    target_scheme: Option<TargetScheme>,

    /// Directory holding processed_data.csv and per-run copies
    #[arg(long, global = true)]
    artifact_dir: Option<PathBuf>,

    /// Name of the added column
    #[arg(long, global = true)]
    output_column: Option<String>,

    /// LLM provider: gemini or anthropic
    #[arg(long, global = true)]
    llm_provider: Option<LlmProvider>,

    /// LLM model name
    #[arg(long, global = true)]
    model: Option<String>,
}

impl StrategyOptions {
    /// Flags as `ROMANIZE_*` overrides.
    fn into_overrides(self) -> HashMap<&'static str, String> {
        let mut overrides = HashMap::new();
        let mut set = |key, value: Option<String>| {
            if let Some(value) = value {
                overrides.insert(key, value);
            }
        };
        set("ROMANIZE_STRATEGY", self.strategy.map(|v| v.to_string()));
        set("ROMANIZE_SOURCE_SCRIPT", self.source_script.map(|v| v.to_string()));
        set("ROMANIZE_TARGET_SCHEME", self.target_scheme.map(|v| v.to_string()));
        set(
            "ROMANIZE_ARTIFACT_DIR",
            self.artifact_dir.map(|v| v.to_string_lossy().into_owned()),
        );
        set("ROMANIZE_OUTPUT_COLUMN", self.output_column);
        set("ROMANIZE_LLM_PROVIDER", self.llm_provider.map(|v| v.to_string()));
        set("ROMANIZE_LLM_MODEL", self.model);
        overrides
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Romanize one column of a CSV file and store the result
    Run {
        /// Input CSV file
        input: PathBuf,

        /// Column holding the names
        #[arg(short, long)]
        column: String,

        /// Also copy the processed CSV here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Romanize names given on the command line (rule-based)
    Name {
        /// Names to romanize
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// List the columns of a CSV file
    Columns {
        /// Input CSV file
        input: PathBuf,
    },

    /// List supported source scripts and target schemes
    Schemes,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match load_settings(cli.options) {
        Ok(settings) => match cli.command {
            Commands::Serve { port } => cmd_serve(&settings, port).await,
            Commands::Run {
                input,
                column,
                output,
            } => cmd_run(&settings, &input, &column, output.as_deref()).await,
            Commands::Name { names } => cmd_name(&settings, &names),
            Commands::Columns { input } => cmd_columns(&input),
            Commands::Schemes => cmd_schemes(),
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn load_settings(options: StrategyOptions) -> Result<Settings, Box<dyn std::error::Error>> {
    Ok(Settings::from_env(&options.into_overrides())?)
}

fn build_pipeline(settings: &Settings) -> Result<NamePipeline, Box<dyn std::error::Error>> {
    let strategy = strategy_from_settings(settings)?;
    Ok(
        NamePipeline::new(strategy, ArtifactStore::new(&settings.artifact_dir))
            .with_output_column(settings.output_column.clone()),
    )
}

async fn cmd_serve(settings: &Settings, port: u16) -> CliResult {
    let pipeline = build_pipeline(settings)?;
    romanize::start_server(port, pipeline).await?;
    Ok(())
}

async fn cmd_run(settings: &Settings, input: &Path, column: &str, output: Option<&Path>) -> CliResult {
    eprintln!("📄 Processing: {}", input.display());

    let pipeline = build_pipeline(settings)?;
    let bytes = fs::read(input)?;
    let outcome = pipeline.run_bytes(&bytes, column).await?;

    eprintln!("\n✨ Done!");
    eprintln!("   Strategy: {}", outcome.strategy);
    eprintln!("   Rows:     {}", outcome.row_count);
    eprintln!("   Run id:   {}", outcome.receipt.run_id);
    eprintln!("   Artifact: {}", outcome.receipt.path.display());

    if let Some(path) = output {
        fs::copy(&outcome.receipt.path, path)?;
        eprintln!("💾 Output written to: {}", path.display());
    }

    Ok(())
}

fn cmd_name(settings: &Settings, names: &[String]) -> CliResult {
    if settings.strategy == StrategyKind::Llm {
        eprintln!("⚠️  'name' always uses the rule-based strategy");
    }
    for name in names {
        println!(
            "{}",
            transliterate_one(name, settings.source_script, settings.target_scheme)
        );
    }
    Ok(())
}

fn cmd_columns(input: &Path) -> CliResult {
    let result = parse_csv_file_auto(input)?;
    eprintln!(
        "   Encoding: {}, separator: '{}', rows: {}",
        result.encoding,
        result.delimiter.escape_default(),
        result.table.row_count()
    );
    for header in result.table.headers() {
        println!("{}", header);
    }
    Ok(())
}

fn cmd_schemes() -> CliResult {
    println!("Source scripts:");
    for script in SourceScript::ALL {
        println!("  {:<12} ({})", script.name(), script.default_language());
    }

    let sample = "अमिताभ बच्चन";
    println!("\nTarget schemes (\"{}\"):", sample);
    for scheme in TargetScheme::ALL {
        println!(
            "  {:<14} {}",
            scheme.name(),
            transliterate_one(sample, SourceScript::Devanagari, scheme)
        );
    }
    Ok(())
}
