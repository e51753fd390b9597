use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config_converter::{BatchInput, BatchResult, ConfigConverter, ConversionOptions, Format};

#[derive(Parser)]
#[command(name = "ucc", version)]
#[command(about = "Universal Config Converter - convert between JSON, YAML, TOML, ENV, XML and INI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a config file from one format to another
    Convert {
        /// Input file path
        input: PathBuf,
        /// Output file path
        output: PathBuf,
        #[command(flatten)]
        options: OptionArgs,
    },
    /// Parse a config file and print it in another format
    Parse {
        /// Input file path
        input: PathBuf,
        /// Output format (json|yaml|toml|env|xml|ini)
        #[arg(short, long, default_value = "json")]
        format: String,
        /// Disable pretty printing
        #[arg(long)]
        compact: bool,
    },
    /// Convert many files into one target format
    Batch {
        /// Input files
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Target format
        #[arg(short, long)]
        to: String,
        /// Directory for converted files (defaults to each input's directory)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
        #[command(flatten)]
        options: OptionArgs,
    },
    /// List supported formats and extensions
    Formats,
}

#[derive(Args)]
struct OptionArgs {
    /// Pretty print output (where applicable)
    #[arg(short, long)]
    pretty: bool,
    /// Indentation size
    #[arg(short, long)]
    indent: Option<usize>,
    /// Sort keys alphabetically
    #[arg(short, long)]
    sort: bool,
}

impl From<&OptionArgs> for ConversionOptions {
    fn from(args: &OptionArgs) -> Self {
        ConversionOptions {
            pretty: args.pretty.then_some(true),
            indent: args.indent,
            sort: args.sort,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "config_converter=warn,ucc=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let converter = ConfigConverter::new();
    match run(&converter, cli.command) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("✗ Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(converter: &ConfigConverter, command: Commands) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Convert {
            input,
            output,
            options,
        } => {
            converter.convert_file(&input, &output, &(&options).into())?;
            println!(
                "✓ Successfully converted {} to {}",
                input.display(),
                output.display()
            );
        }
        Commands::Parse {
            input,
            format,
            compact,
        } => {
            let target: Format = format.parse()?;
            let source = converter.detect_format(&input)?;
            let content = fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let tree = converter.parse(&content, source)?;
            let options = ConversionOptions::default()
                .with_pretty(!compact)
                .with_indent(if compact { 0 } else { 2 });
            println!("{}", converter.stringify(&tree, target, &options)?);
        }
        Commands::Batch {
            files,
            to,
            out_dir,
            options,
        } => {
            let target: Format = to.parse()?;
            return batch(converter, &files, target, out_dir.as_deref(), &(&options).into());
        }
        Commands::Formats => {
            for info in converter.formats_overview() {
                println!(
                    "{:<6} {:<34} {}",
                    info.format,
                    info.description,
                    info.extensions.join(", ")
                );
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn batch(
    converter: &ConfigConverter,
    files: &[PathBuf],
    target: Format,
    out_dir: Option<&Path>,
    options: &ConversionOptions,
) -> anyhow::Result<ExitCode> {
    if let Some(dir) = out_dir {
        if !dir.is_dir() {
            bail!("output directory {} does not exist", dir.display());
        }
    }
    let mut inputs = Vec::with_capacity(files.len());
    let mut failed = 0usize;
    for path in files {
        match fs::read_to_string(path) {
            Ok(content) => inputs.push(BatchInput::new(path.to_string_lossy(), content)),
            Err(err) => {
                eprintln!("✗ {}: {err}", path.display());
                failed += 1;
            }
        }
    }
    for result in converter.convert_batch(&inputs, target, options) {
        match result {
            BatchResult::Success {
                original_name,
                new_name,
                content,
            } => {
                let source = Path::new(&original_name);
                let dir = out_dir
                    .map(Path::to_path_buf)
                    .or_else(|| source.parent().map(Path::to_path_buf))
                    .unwrap_or_default();
                let file_name = Path::new(&new_name)
                    .file_name()
                    .map(|name| name.to_os_string())
                    .unwrap_or_default();
                let destination = dir.join(file_name);
                match fs::write(&destination, content) {
                    Ok(()) => println!("✓ {original_name} -> {}", destination.display()),
                    Err(err) => {
                        eprintln!("✗ {}: {err}", destination.display());
                        failed += 1;
                    }
                }
            }
            BatchResult::Failure {
                original_name,
                error,
            } => {
                eprintln!("✗ {original_name}: {error}");
                failed += 1;
            }
        }
    }
    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
