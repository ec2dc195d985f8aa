use clap::Parser;
use colored::Colorize;
use dockergen_cli::{
    cli::{Cli, Commands},
    commands, ApiClient,
};
use std::io;
use std::process;

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {}", "Error:".red(), e);
        process::exit(1);
    }
}

fn run() -> dockergen_cli::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    cli.init_logging();

    let client = ApiClient::new(&cli.server_url)?;
    let mut stdout = io::stdout().lock();

    match &cli.command {
        Commands::Generate(args) => commands::handle_generate(&client, args, cli.quiet, &mut stdout),
        Commands::CheckServer => commands::handle_check_server(&client, &mut stdout),
    }
}
