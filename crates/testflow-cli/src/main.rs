use clap::{Parser, Subcommand};

mod commands;
mod prompt;

#[derive(Parser)]
#[command(name = "testflow", version, about = "Testflow CLI")]
struct Cli {
    /// Test service base URL (overrides api.base_url)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk through the testing wizard interactively
    Run,
    /// Print saved progress as JSON
    Status,
    /// List available tests
    Tests {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show percentage results for the current respondent
    Results {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Download the PDF report for a submitted test
    Pdf {
        /// Test ID
        test_id: u64,
        /// Output file (default: test_result_<user>_<test>.pdf)
        #[arg(long, short)]
        out: Option<std::path::PathBuf>,
    },
    /// Discard saved progress and start over
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let ctx = commands::Context::new(cli.api_url);
    let result = match cli.command {
        Commands::Run => commands::run::run(&ctx).await,
        Commands::Status => commands::status::run(&ctx),
        Commands::Tests { json } => commands::catalog::run(&ctx, json).await,
        Commands::Results { json } => commands::results::run(&ctx, json).await,
        Commands::Pdf { test_id, out } => commands::pdf::run(&ctx, test_id, out).await,
        Commands::Reset { yes } => commands::reset::run(&ctx, yes),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
