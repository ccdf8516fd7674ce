use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::{Args, Parser, Subcommand};

use lazybuild_core::{decide, BuildConfig, BuildDecision};
use lazybuild_gh::{EnvInputs, OutputSink};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod probe;
mod sandbox;
mod styles;

use probe::DockerProbe;
use styles as s;

/// The command-line interface for lazybuild.
#[derive(Debug, Parser)]
#[command(name = "lazybuild")]
#[command(version)]
#[command(styles = s::get_clap_styles())]
#[command(about = "Lazy Docker build manager")]
#[command(
    long_about = "lazybuild decides whether a docker image needs to be rebuilt.

It hashes the Dockerfile, any extra files and the build inputs that change
how an image is built into a content tag. When an image already carries that
tag, locally or in its registry, the build can be skipped.

Inputs are read from INPUT_* environment variables, the way GitHub Actions
passes them, or from a TOML file given with --config."
)]
#[command(
    after_help = "\x1b[1;32mExamples:\x1b[0m\n  \x1b[36mINPUT_TAGS=user/app:latest lazybuild\x1b[0m        \x1b[2m# Decide for one image\x1b[0m\n  \x1b[36mlazybuild --files Cargo.lock rust-toolchain.toml\x1b[0m \x1b[2m# Hash extra files too\x1b[0m\n  \x1b[36mlazybuild --config lazybuild.toml --json\x1b[0m     \x1b[2m# Read inputs from a file\x1b[0m\n  \x1b[36mlazybuild sandbox\x1b[0m                           \x1b[2m# Stage inputs into a temp dir\x1b[0m"
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
    /// Extra files to include in the content hash.
    #[arg(long, num_args = 1..)]
    files: Vec<PathBuf>,
    /// Read inputs from a TOML file instead of INPUT_* variables.
    #[arg(long, global = true)]
    config: Option<String>,
    /// Also print the decision as JSON on stdout.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,
    /// Docker executable used to look images up.
    #[arg(long, default_value = "docker", global = true)]
    docker: String,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Compute the content tag and check whether the image exists (default).
    Check(CheckArgs),
    /// Copy the declared build inputs into a fresh directory.
    Sandbox,
}

#[derive(Debug, Clone, Default, Args)]
struct CheckArgs {
    /// Extra files to include in the content hash.
    #[arg(long, num_args = 1..)]
    files: Vec<PathBuf>,
}

impl Cli {
    /// Extra files given before or after the `check` command.
    fn extra_files(&self) -> Vec<PathBuf> {
        let mut files = self.files.clone();
        if let Some(Command::Check(args)) = &self.command {
            files.extend(args.files.iter().cloned());
        }
        files
    }

    fn validate(&self) -> Result<()> {
        if matches!(self.command, Some(Command::Sandbox)) {
            ensure!(
                self.files.is_empty(),
                "--files only applies to the check command"
            );
        }
        Ok(())
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter())
        .init();

    let cli = Cli::parse();
    debug!("parsed cli arguments: {:?}", cli);
    cli.validate()?;

    let mut sink = OutputSink::from_env()?;
    match &cli.command {
        None | Some(Command::Check(_)) => {
            let decision = run_check(&cli, &mut sink)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&decision)?);
            }
            Ok(())
        }
        Some(Command::Sandbox) => sandbox::run(&mut sink),
    }
}

fn load_config(cli: &Cli) -> Result<BuildConfig> {
    let mut cfg = match &cli.config {
        Some(path) => BuildConfig::load_from_file(path)
            .with_context(|| format!("unable to load config '{path}'"))?,
        None => lazybuild_gh::build_config(&EnvInputs)?,
    };
    cfg.extra_files.extend(cli.extra_files());
    Ok(cfg)
}

/// Runs the decision and writes its outputs.
fn run_check(cli: &Cli, sink: &mut OutputSink) -> Result<BuildDecision> {
    let cfg = load_config(cli)?;
    let probe = DockerProbe::new(cli.docker.as_str());
    let decision = decide(&cfg, &probe)?;
    lazybuild_gh::emit_decision(sink, &decision)?;
    Ok(decision)
}
