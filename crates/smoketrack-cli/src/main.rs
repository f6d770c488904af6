use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "smoketrack", version, about = "Smoking pace and activity run tracker")]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a cigarette (prompts for puffs when omitted)
    Smoke(commands::smoke::SmokeArgs),
    /// Recommend how long to wait and how many puffs to take
    Advise,
    /// Show the dashboard
    Status,
    /// Refresh the dashboard periodically
    Watch(commands::status::WatchArgs),
    /// Pace targets
    Targets {
        #[command(subcommand)]
        action: commands::targets::TargetsAction,
    },
    /// Activity runs
    Run {
        #[command(subcommand)]
        action: commands::run::RunAction,
    },
    /// Clear recorded cigarettes (targets and runs are kept)
    Reset {
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Export or import the tracker record
    State {
        #[command(subcommand)]
        action: commands::state::StateAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SMOKETRACK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let json = cli.json;
    let result = match cli.command {
        Commands::Smoke(args) => commands::smoke::run(args, json),
        Commands::Advise => commands::advise::run(json),
        Commands::Status => commands::status::run(json),
        Commands::Watch(args) => commands::status::watch(args, json),
        Commands::Targets { action } => commands::targets::run(action, json),
        Commands::Run { action } => commands::run::run(action, json),
        Commands::Reset { yes } => commands::reset::run(yes, json),
        Commands::State { action } => commands::state::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "smoketrack", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
