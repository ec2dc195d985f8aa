use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

#[derive(Parser)]
#[command(name = "dockergen")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Generate Dockerfiles with Harbor base images")]
#[command(long_about = "Calls a running Harbor Dockerfile generator server. The server asks an AI model for a Dockerfile and rewrites its base image to the organization's Harbor registry.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Base URL of the generator server
    #[arg(long, global = true, env = "MCP_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    pub server_url: String,

    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a Dockerfile by calling the server
    Generate(GenerateArgs),

    /// Check that the server is reachable and healthy
    CheckServer,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// Programming language (e.g., python, node)
    #[arg(short, long)]
    pub language: String,

    /// Language version (e.g., 3.11, 18)
    #[arg(long = "version", value_name = "VERSION")]
    pub lang_version: Option<String>,

    /// Comma-separated list of dependencies (e.g., flask,requests)
    #[arg(short, long = "deps", value_name = "DEPS")]
    pub deps: Option<String>,

    /// Port to expose in the Dockerfile
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// Type of application (e.g., web, cli, api)
    #[arg(short = 't', long)]
    pub app_type: Option<String>,

    /// Additional instructions for the AI
    #[arg(short, long)]
    pub instructions: Option<String>,

    /// Path to save the generated Dockerfile (prints to stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl Cli {
    pub fn init_logging(&self) {
        if self.quiet {
            return;
        }

        let level = match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }
}
