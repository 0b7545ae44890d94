//! Schema Inspector CLI
//!
//! Command-line interface for describing JSON Schemas as flat property lists
//! and checking them for struct generation.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use schema_inspect::{
    embedded_schema_names, get_object_description, load_graph, validate_struct_integrity,
    BuildOptions, IntegrityError, SchemaGraph,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-inspect")]
#[command(about = "Flatten JSON Schema objects into struct-ready property lists")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that loads a schema.
#[derive(Args)]
struct SourceArgs {
    /// Schema source: file path or URL (http:// or https://)
    schema: String,

    /// JSON Pointer to the root schema inside the document (e.g. #/definitions/Pet)
    #[arg(long, default_value = "#")]
    root: String,

    /// Skip validating the document against its meta-schema
    #[arg(long)]
    no_meta_check: bool,
}

impl SourceArgs {
    fn build_options(&self) -> BuildOptions {
        BuildOptions::new()
            .root(self.root.clone())
            .check_meta(!self.no_meta_check)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the flattened description of a schema as JSON
    Describe {
        #[command(flatten)]
        source: SourceArgs,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Fail if any property lacks a single type
        #[arg(long)]
        check: bool,
    },

    /// Check that every property has exactly one type
    Check {
        #[command(flatten)]
        source: SourceArgs,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },

    /// List the named schemas composed through allOf/anyOf/oneOf
    Embedded {
        #[command(flatten)]
        source: SourceArgs,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Describe {
            source,
            output,
            pretty,
            check,
        } => run_describe(&source, output, pretty, check),
        Commands::Check { source, json } => run_check(&source, json),
        Commands::Embedded { source } => run_embedded(&source),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

/// Log to stderr. `-v` wins over `RUST_LOG`; without either only warnings show.
fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("schema_inspect=info"),
        2 => EnvFilter::new("schema_inspect=debug"),
        _ => EnvFilter::new("schema_inspect=trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load(source: &SourceArgs, report: impl Fn(&str)) -> Result<SchemaGraph, u8> {
    load_graph(&source.schema, &source.build_options()).map_err(|e| {
        report(&e.to_string());
        e.exit_code() as u8
    })
}

fn run_describe(
    source: &SourceArgs,
    output: Option<PathBuf>,
    pretty: bool,
    check: bool,
) -> Result<(), u8> {
    let graph = load(source, |msg| eprintln!("Error: {}", msg))?;
    let Some(root) = graph.root() else {
        eprintln!("Error: schema graph is empty");
        return Err(2);
    };
    let description = get_object_description(&graph, root);

    if check {
        validate_struct_integrity(&description).map_err(|e| {
            print_conflicts(&e);
            e.exit_code() as u8
        })?;
    }

    let value = description.to_value(&graph);
    let json_output = if pretty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}

fn run_check(source: &SourceArgs, json_output: bool) -> Result<(), u8> {
    let graph = load(source, |msg| report_error(json_output, msg))?;
    let Some(root) = graph.root() else {
        report_error(json_output, "schema graph is empty");
        return Err(2);
    };
    let description = get_object_description(&graph, root);

    match validate_struct_integrity(&description) {
        Ok(()) => {
            if json_output {
                println!(r#"{{"valid":true}}"#);
            } else {
                println!("Valid");
            }
            Ok(())
        }
        Err(e) => {
            if json_output {
                let output = serde_json::json!({
                    "valid": false,
                    "errors": e.conflicts()
                });
                println!("{}", output);
            } else {
                print_conflicts(&e);
            }
            Err(e.exit_code() as u8)
        }
    }
}

fn run_embedded(source: &SourceArgs) -> Result<(), u8> {
    let graph = load(source, |msg| eprintln!("Error: {}", msg))?;
    let Some(root) = graph.root() else {
        eprintln!("Error: schema graph is empty");
        return Err(2);
    };

    for name in embedded_schema_names(&graph, root) {
        println!("{}", name);
    }
    Ok(())
}

fn print_conflicts(err: &IntegrityError) {
    eprintln!("Struct integrity check failed:");
    for conflict in err.conflicts() {
        eprintln!("  {}", conflict);
    }
}

/// Output an error message in plain text or JSON format.
fn report_error(json_output: bool, msg: &str) {
    if json_output {
        println!("{}", serde_json::json!({ "valid": false, "error": msg }));
    } else {
        eprintln!("Error: {}", msg);
    }
}
