//! Vigil CLI entry point.

use clap::Parser;

use vigil::cli::{handle_error, Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init(args) => vigil::cli::commands::init::execute(&args, cli.json),
        Commands::Run(args) => vigil::cli::commands::run::execute(args).await,
        Commands::Status(args) => vigil::cli::commands::status::execute(&args, cli.json),
    };

    if let Err(err) = result {
        handle_error(&err, cli.json);
    }
}
