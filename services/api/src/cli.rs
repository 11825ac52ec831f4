use crate::demo::{run_demo, run_screen, ScreenArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use qa_board::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Q&A Board",
    about = "Run and demonstrate the Q&A bulletin service from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Walk through question, answer, and rejection scenarios against in-memory stores
    Demo,
    /// Check a piece of text against the configured content filter
    Screen(ScreenArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Demo => run_demo().await,
        Command::Screen(args) => run_screen(args),
    }
}
