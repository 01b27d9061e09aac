use std::cell::Cell;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing::info;

use chat_expense_tracker::bot::handlers::NOTHING_FOUND;
use chat_expense_tracker::bot::{run_session, Handlers, TelegramTransport};
use chat_expense_tracker::config::{CategorySet, Settings, TrackerPaths, OTHER_CATEGORY};
use chat_expense_tracker::display::{format_ledger_table, format_summary_table};
use chat_expense_tracker::llm::{LanguageModel, OllamaClient};
use chat_expense_tracker::logging::init_tracing;
use chat_expense_tracker::models::MonthKey;
use chat_expense_tracker::services::{
    CategoryClassifier, ExtractionPipeline, LedgerWriter, MonthlySummary,
};
use chat_expense_tracker::storage::LedgerStore;
use chat_expense_tracker::supervisor::Supervisor;

#[derive(Parser)]
#[command(
    name = "expense-tracker",
    author = "Kaylee Beyene",
    version,
    about = "Chat bot that turns free-text expenses into a monthly ledger",
    long_about = "Send expenses to the bot in plain text (\"coffee 50 and taxi 200\"). \
                  A language model extracts each expense, which is appended to the \
                  current month's CSV ledger. /download returns the ledger file."
)]
struct Cli {
    /// Telegram bot token (required for `run` and `serve`)
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    /// API key sent to the language model server as a bearer token
    #[arg(long, env = "LLM_API_KEY", hide_env_values = true, global = true)]
    llm_api_key: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot under the supervisor, honouring active hours (default)
    Run,

    /// Run a single chat session, ignoring active hours
    Serve,

    /// Extract and record expenses from text given on the command line
    Record {
        /// Free-text expense description, e.g. "coffee 50 and taxi 200"
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Show a month's ledger with category totals
    Show {
        /// Month to show (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },

    /// List the categories and their keywords
    Categories,

    /// Show current configuration and paths
    Config,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // A missing .env is fine; real environment variables still apply
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing();

    let paths = TrackerPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let token = require_token(cli.token)?;
            let handlers = build_handlers(&paths, &settings, cli.llm_api_key)?;
            run_supervised(&settings, &token, &handlers).await?;
        }
        Commands::Serve => {
            let token = require_token(cli.token)?;
            let handlers = build_handlers(&paths, &settings, cli.llm_api_key)?;
            let mut transport = TelegramTransport::new(&token, &settings.telegram)?;
            run_session(&mut transport, &handlers, || true).await?;
        }
        Commands::Record { text } => {
            let pipeline = build_pipeline(&paths, &settings, cli.llm_api_key)?;
            let report = pipeline.process(&text.join(" ")).await?;
            if report.is_empty() {
                println!("{}", NOTHING_FOUND);
            } else {
                println!("Expenses recorded:");
                println!("{}", report.summary(&settings.currency_symbol));
            }
        }
        Commands::Show { month } => {
            let month = match month {
                Some(value) => value.parse::<MonthKey>()?,
                None => MonthKey::current(),
            };
            let store = LedgerStore::new(settings.ledger_dir(&paths));
            let records = store.read(month)?;
            let summary = MonthlySummary::from_records(month, &records);

            print!("{}", format_ledger_table(month, &records, &settings.currency_symbol));
            if !summary.is_empty() {
                println!();
                print!("{}", format_summary_table(&summary, &settings.currency_symbol));
            }
        }
        Commands::Categories => {
            let categories = load_categories(&paths, &settings)?;
            print!("{}", categories);
            println!("{}: (fallback)", OTHER_CATEGORY);
        }
        Commands::Config => {
            println!("Expense Tracker Configuration");
            println!("=============================");
            println!("Base directory:  {}", paths.base_dir().display());
            println!("Settings file:   {}", paths.settings_file().display());
            println!("Ledger directory: {}", settings.ledger_dir(&paths).display());
            println!("Categories file: {}", settings.categories_file(&paths).display());
            println!();
            println!("Settings:");
            println!("  Classifier:   {:?}", settings.classifier);
            println!("  LLM:          {} ({})", settings.llm.model, settings.llm.base_url);
            println!(
                "  Active hours: {} to {}",
                settings.active_hours.start, settings.active_hours.end
            );
            println!("  Currency:     {}", settings.currency_symbol);
        }
    }

    Ok(())
}

fn require_token(token: Option<String>) -> Result<String> {
    match token.map(|t| t.trim().to_string()) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => bail!("TELEGRAM_BOT_TOKEN is not set (pass --token or set the environment variable)"),
    }
}

fn load_categories(paths: &TrackerPaths, settings: &Settings) -> Result<CategorySet> {
    let path = settings.categories_file(paths);
    CategorySet::load_or_default(&path)
        .with_context(|| format!("Failed to load categories from {}", path.display()))
}

fn build_pipeline(
    paths: &TrackerPaths,
    settings: &Settings,
    api_key: Option<String>,
) -> Result<ExtractionPipeline> {
    paths.ensure_directories()?;

    let categories = Arc::new(load_categories(paths, settings)?);
    let llm: Arc<dyn LanguageModel> = Arc::new(OllamaClient::new(&settings.llm, api_key)?);
    let classifier =
        CategoryClassifier::from_settings(settings.classifier, categories.clone(), llm.clone());
    info!(strategy = ?classifier.strategy(), "classifier ready");
    let writer = LedgerWriter::new(LedgerStore::new(settings.ledger_dir(paths)), classifier);

    Ok(ExtractionPipeline::new(llm, writer, categories))
}

fn build_handlers(
    paths: &TrackerPaths,
    settings: &Settings,
    api_key: Option<String>,
) -> Result<Handlers> {
    let pipeline = build_pipeline(paths, settings, api_key)?;
    Ok(Handlers::new(pipeline, settings.currency_symbol.clone()))
}

async fn run_supervised(settings: &Settings, token: &str, handlers: &Handlers) -> Result<()> {
    let window = settings.active_window()?;
    let supervisor = Supervisor::new(window, settings.crash_cooldown(), settings.idle_sleep());
    let telegram = &settings.telegram;
    // Update offset handed from one session to the next
    let cursor = Cell::new(None);
    let cursor = &cursor;

    info!(window = %window, "starting expense tracker bot");
    supervisor
        .run(move || async move {
            let mut transport = TelegramTransport::new(token, telegram)?.resume_from(cursor.get());
            let outcome =
                run_session(&mut transport, handlers, || window.contains(Local::now().time())).await;
            cursor.set(transport.offset());
            outcome
        })
        .await;

    Ok(())
}
