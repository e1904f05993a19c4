//! bundlegen command-line interface.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode, DebounceEventResult};

use bundle_compiler::{Compiler, CompilerConfig, ConfigOverrides, ResolutionReport};

mod ui;

#[derive(Parser)]
#[command(name = "bundlegen")]
#[command(about = "Generates binary serialize/deserialize code from record schemas")]
struct Cli {
    /// Log resolution decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate code for every record in a schema
    Generate {
        #[command(flatten)]
        input: SchemaArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Resolve every record without writing anything
    Check {
        #[command(flatten)]
        input: SchemaArgs,
    },

    /// Print the resolved member tree of one record, or all of them
    Inspect {
        #[command(flatten)]
        input: SchemaArgs,

        /// Record name or full path
        #[arg(short, long)]
        record: Option<String>,
    },

    /// Regenerate whenever the schema changes
    Watch {
        #[command(flatten)]
        input: SchemaArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args)]
struct SchemaArgs {
    /// Schema file, or a directory of schema files
    #[arg(short, long, default_value = "bundles.json")]
    schema: PathBuf,

    /// Schema format
    #[arg(short, long, default_value = "json")]
    format: String,

    /// Path the generated code uses to reach the runtime crate
    #[arg(long)]
    runtime_path: Option<String>,

    /// Deepest composite nesting accepted
    #[arg(long)]
    max_depth: Option<usize>,
}

#[derive(Args)]
struct OutputArgs {
    /// Output file, or output directory with --split
    #[arg(short, long, default_value = "src/generated/bundles.rs")]
    out: PathBuf,

    /// Write one file per record plus a mod.rs
    #[arg(long)]
    split: bool,

    /// Spaces per indentation level
    #[arg(long)]
    indent_width: Option<usize>,

    /// Leave out the do-not-edit banner
    #[arg(long)]
    no_header: bool,
}

fn compiler_config(input: &SchemaArgs, output: Option<&OutputArgs>) -> CompilerConfig {
    let mut config = CompilerConfig {
        schema: input.schema.clone(),
        format: input.format.clone(),
        overrides: ConfigOverrides {
            runtime_path: input.runtime_path.clone(),
            max_depth: input.max_depth,
            ..ConfigOverrides::default()
        },
        ..CompilerConfig::default()
    };
    if let Some(output) = output {
        config.out = output.out.clone();
        config.split = output.split;
        config.overrides.indent_width = output.indent_width;
        if output.no_header {
            config.overrides.header = Some(false);
        }
    }
    config
}

/// Installs the log subscriber when `RUST_LOG` is set or `--verbose` is passed.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("bundle_compiler=debug")
    } else if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        return;
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Generate { input, output } => {
            let compiler = Compiler::new(compiler_config(&input, Some(&output)));
            run_generate(&compiler)?;
        }

        Commands::Check { input } => {
            let spinner = ui::spinner("Resolving records...");
            let compiler = Compiler::new(compiler_config(&input, None));

            match compiler.check() {
                Ok(report) => {
                    spinner.finish_and_clear();
                    print_report(&report);
                    ui::looking_good();
                }
                Err(e) => {
                    spinner.finish_and_clear();
                    ui::nope_header();
                    return Err(e.into());
                }
            }
        }

        Commands::Inspect { input, record } => {
            let compiler = Compiler::new(compiler_config(&input, None));
            let outline = compiler.inspect(record.as_deref())?;
            println!("{}", outline);
        }

        Commands::Watch { input, output } => {
            let compiler = Compiler::new(compiler_config(&input, Some(&output)));
            run_watch_mode(&compiler)?;
        }
    }

    Ok(())
}

/// Runs one compile, printing the outcome. Returns the compiler error untouched.
fn run_generate(compiler: &Compiler) -> Result<(), bundle_compiler::CompilerError> {
    let spinner = ui::spinner("Generating...");
    let start = Instant::now();

    let result = compiler.compile();
    spinner.finish_and_clear();
    let result = result?;

    print_report(&result.report);
    ui::box_header("bundlegen");
    for file in &result.files {
        ui::box_line(&file.display().to_string());
    }
    ui::box_footer();
    ui::timing(
        &format!("Generated {} record(s)", result.records),
        start.elapsed().as_millis(),
    );
    Ok(())
}

fn print_report(report: &ResolutionReport) {
    if report.is_empty() {
        return;
    }
    for skipped in &report.skipped {
        ui::skipped_member(&skipped.record, &skipped.member, &skipped.type_name, &skipped.reason.to_string());
    }
    println!();
}

/// Whether a changed path should trigger a rebuild.
fn is_schema_change(changed: &Path, schema: &Path, extension: &str) -> bool {
    if schema.is_dir() {
        changed.starts_with(schema) && changed.extension().and_then(|e| e.to_str()) == Some(extension)
    } else {
        changed == schema
    }
}

fn run_watch_mode(compiler: &Compiler) -> miette::Result<()> {
    let config = compiler.config();
    let schema = std::fs::canonicalize(&config.schema)
        .map_err(|e| miette::miette!("cannot watch {}: {}", config.schema.display(), e))?;

    // A single file is watched through its directory so editors that
    // replace the file on save keep triggering events.
    let (watch_root, mode) = if schema.is_dir() {
        (schema.clone(), RecursiveMode::Recursive)
    } else {
        let parent = schema
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        (parent, RecursiveMode::NonRecursive)
    };

    if let Err(e) = run_generate(compiler) {
        ui::error(&format!("{:?}", miette::Report::new(e)));
    }

    let (tx, rx) = mpsc::channel::<()>();
    let filter_schema = schema.clone();
    let extension = config.format.clone();

    let mut debouncer = new_debouncer(
        Duration::from_millis(500),
        move |result: DebounceEventResult| {
            if let Ok(events) = result {
                if events
                    .iter()
                    .any(|event| is_schema_change(&event.path, &filter_schema, &extension))
                {
                    let _ = tx.send(());
                }
            }
        },
    )
    .map_err(|e| miette::miette!("failed to create file watcher: {}", e))?;

    debouncer
        .watcher()
        .watch(&watch_root, mode)
        .map_err(|e| miette::miette!("failed to watch {}: {}", watch_root.display(), e))?;

    ui::info(&format!("Watching {}", schema.display()));
    ui::dim("Press Ctrl+C to stop.");

    while rx.recv().is_ok() {
        println!();
        tracing::debug!(schema = %schema.display(), "schema changed");
        if let Err(e) = run_generate(compiler) {
            ui::error(&format!("{:?}", miette::Report::new(e)));
        }
        ui::info("Waiting for changes...");
    }

    Ok(())
}
