#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use cmd::CmdContext;
use larder_core::config;
use output::{CliError, OutputMode, render_error};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "ldr",
    author,
    version,
    about = "larder: household food-inventory tracker",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Config file path (default: the platform config dir).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Inventory store path (default: [store].path, then the data dir).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags.
    fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Setup",
        about = "Create the inventory store",
        after_help = "EXAMPLES:\n    ldr init\n    ldr init --db /tmp/larder.sqlite3"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Account",
        about = "Create an account",
        after_help = "EXAMPLES:\n    ldr register --login alice --username Alice \\\n        --password alice123 --confirm alice123"
    )]
    Register(cmd::register::RegisterArgs),

    #[command(
        next_help_heading = "Account",
        about = "Delete the account and all owned items",
        after_help = "EXAMPLES:\n    ldr unregister --user alice --password alice123"
    )]
    Unregister(cmd::unregister::UnregisterArgs),

    #[command(
        next_help_heading = "Inventory",
        about = "Add a single item",
        after_help = "EXAMPLES:\n    ldr add --user alice --name 사과 --major 식물성 --sub 과일류 --shelf-life 30일\n    ldr add --user alice --name 우유 --major 동물성 --sub 유제품 --expires 2025-12-31"
    )]
    Add(cmd::add::AddArgs),

    #[command(
        next_help_heading = "Inventory",
        about = "List items, most recently added first",
        after_help = "EXAMPLES:\n    ldr list --user alice\n    ldr list --user alice --json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Inventory",
        about = "Delete items by id",
        after_help = "EXAMPLES:\n    ldr rm --user alice 12 13 14"
    )]
    Rm(cmd::rm::RmArgs),

    #[command(
        next_help_heading = "Inventory",
        about = "List the category taxonomy"
    )]
    Categories(cmd::categories::CategoriesArgs),

    #[command(
        next_help_heading = "Ingestion",
        about = "Reconcile a receipt image into the inventory",
        after_help = "EXAMPLES:\n    ldr ingest --user alice --image receipt.jpg\n    ldr ingest --user alice --image receipt.jpg --dry-run"
    )]
    Ingest(cmd::ingest::IngestArgs),

    #[command(
        next_help_heading = "Ingestion",
        about = "Suggest recipes from current stock",
        after_help = "EXAMPLES:\n    ldr recipes --user alice --request \"simple lunchbox\""
    )]
    Recipes(cmd::recipes::RecipesArgs),

    #[command(
        next_help_heading = "Notifications",
        about = "Register or clear the push token",
        after_help = "EXAMPLES:\n    ldr token --user alice set <DEVICE-TOKEN>\n    ldr token --user alice clear"
    )]
    Token(cmd::token::TokenArgs),

    #[command(
        next_help_heading = "Notifications",
        about = "Toggle expiry notifications",
        after_help = "EXAMPLES:\n    ldr notifications --user alice off"
    )]
    Notifications(cmd::notifications::NotificationsArgs),

    #[command(
        next_help_heading = "Notifications",
        about = "Run one expiry scan now",
        after_help = "EXAMPLES:\n    ldr scan\n    ldr scan --date 2025-06-01"
    )]
    Scan(cmd::scan::ScanArgs),

    #[command(
        next_help_heading = "Notifications",
        about = "Run the daily scheduler in the foreground"
    )]
    Watch(cmd::watch::WatchArgs),

    #[command(about = "Emit shell completions")]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("LARDER_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "debug" } else { "warn" })
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = config::load_config(cli.config.as_deref())?;
    let db_path = config::resolve_store_path(cli.db.as_deref(), &config);
    let ctx = CmdContext {
        config,
        db_path,
        output: cli.output_mode(),
    };

    match &cli.command {
        Commands::Init(args) => cmd::init::run_init(args, &ctx),
        Commands::Register(args) => cmd::register::run_register(args, &ctx),
        Commands::Unregister(args) => cmd::unregister::run_unregister(args, &ctx),
        Commands::Add(args) => cmd::add::run_add(args, &ctx),
        Commands::List(args) => cmd::list::run_list(args, &ctx),
        Commands::Rm(args) => cmd::rm::run_rm(args, &ctx),
        Commands::Categories(args) => cmd::categories::run_categories(args, &ctx),
        Commands::Ingest(args) => cmd::ingest::run_ingest(args, &ctx),
        Commands::Recipes(args) => cmd::recipes::run_recipes(args, &ctx),
        Commands::Token(args) => cmd::token::run_token(args, &ctx),
        Commands::Notifications(args) => cmd::notifications::run_notifications(args, &ctx),
        Commands::Scan(args) => cmd::scan::run_scan(args, &ctx),
        Commands::Watch(args) => cmd::watch::run_watch(args, &ctx),
        Commands::Completions(args) => {
            cmd::completions::run_completions(args, &mut Cli::command())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    if let Err(err) = run(&cli) {
        let _ = render_error(cli.output_mode(), &CliError::from_failure(&err));
        std::process::exit(1);
    }
}
