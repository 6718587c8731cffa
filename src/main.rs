use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};

use zsh_ai_suggestions::cli;

#[derive(Parser, Debug)]
#[command(
    name = "zsh-ai-suggestions",
    version,
    about = "AI command-line suggestions for zsh"
)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Watch the IPC directory and answer request files (default).
    Watch,
    /// Serve suggestions over HTTP.
    Serve {
        #[arg(long, env = "SERVER_PORT", default_value_t = 5555)]
        port: u16,
    },
    /// Read partial commands from stdin, print one suggestion per line.
    Repl,
    /// Send one request through a running daemon and print the suggestion.
    Request {
        text: String,
        #[arg(long, default_value_t = 5000)]
        timeout_ms: u64,
    },
    /// Delete every file in the IPC directory.
    Clean,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("zsh-ai-suggestions: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    match args.command.unwrap_or(Command::Watch) {
        Command::Watch => {
            cli::watch::run_watch()
                .await
                .context("suggestion daemon failed")?;
        }
        Command::Serve { port } => {
            cli::serve::run_serve(port)
                .await
                .context("http server failed")?;
        }
        Command::Repl => cli::repl::run_repl().await?,
        Command::Request { text, timeout_ms } => {
            cli::request::run_request(&text, Duration::from_millis(timeout_ms)).await?
        }
        Command::Clean => cli::clean::run_clean()?,
    }
    Ok(())
}
