//! `avdl`: generate Avro protocol files from IDL sources.
//!
//! Reads `avdl.toml` from the working directory (or `--config`), compiles
//! every `.avdl` source through `avro-tools idl`, and writes `<name>.avpr`
//! into the output directory.

use std::path::PathBuf;

use anyhow::{Context, Result};
use avdl::exit_codes;
use avdl::generate::{GenerateOptions, generate_from_root};
use avdl::io::config::{CONFIG_FILE_NAME, init_config};
use avdl::logging;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "avdl",
    version,
    about = "Generate Avro protocol (.avpr) files from IDL (.avdl) sources"
)]
struct Cli {
    /// Log per-file progress to stderr (overridden by `RUST_LOG`).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile IDL sources into protocol files.
    Generate {
        /// Source files or directories (defaults to `sources` from the config).
        sources: Vec<PathBuf>,

        /// Directory receiving generated `.avpr` files.
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Configuration file.
        #[arg(short, long, default_value = CONFIG_FILE_NAME)]
        config: PathBuf,

        /// Host build-system version; picks the runtime dependency group.
        #[arg(long)]
        host_version: Option<String>,
    },
    /// Write a default `avdl.toml` if missing.
    Init {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,

        /// Configuration file to create.
        #[arg(short, long, default_value = CONFIG_FILE_NAME)]
        config: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    if let Err(err) = run(cli) {
        eprintln!("{:#}", err);
        std::process::exit(exit_codes::FAILED);
    }
}

fn run(cli: Cli) -> Result<()> {
    let root = std::env::current_dir().context("read current directory")?;
    match cli.command {
        Command::Generate {
            sources,
            output_dir,
            config,
            host_version,
        } => {
            let options = GenerateOptions {
                config_path: config,
                sources,
                output_dir,
                host_version,
            };
            let outcome = generate_from_root(&root, &options)?;
            println!(
                "generate: processed={} did_work={}",
                outcome.processed,
                outcome.did_work()
            );
        }
        Command::Init { force, config } => {
            let path = root.join(config);
            let written = init_config(&path, force)?;
            println!("init: config={} written={}", path.display(), written);
        }
    }
    Ok(())
}
