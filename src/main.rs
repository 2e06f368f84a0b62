use std::io;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use investor_calculator::analysis::{CompanyReport, Ratio, TopReport};
use investor_calculator::database::{CompanyRepository, DatabaseManager};
use investor_calculator::models::Config;
use investor_calculator::tools::csv_importer::seed_if_missing;
use investor_calculator::ui::{company_line, Shell};

const LAST_SESSION_KEY: &str = "last_session_at";

#[derive(Parser)]
#[command(name = "investor-calculator", version)]
#[command(about = "Company ledger with valuation and leverage ratios")]
struct Cli {
    /// Path to SQLite database
    #[arg(long = "db", value_name = "FILE")]
    database: Option<String>,

    /// Company CSV used to seed a new database
    #[arg(long, value_name = "FILE")]
    companies: Option<String>,

    /// Financial CSV used to seed a new database
    #[arg(long, value_name = "FILE")]
    financials: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive menu (default)
    Menu,
    /// List all companies by ticker
    List,
    /// Show figures and ratios for companies whose name contains NAME
    Show {
        name: String,
        #[arg(long)]
        json: bool,
    },
    /// Rank companies by a ratio (P/E, P/S, P/B, ND/EBITDA, ROE, ROA, L/A)
    Top {
        ratio: Ratio,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Record counts and seeding information
    Stats,
}

impl Cli {
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(path) = &self.database {
            config.database_path = path.clone();
        }
        if let Some(path) = &self.companies {
            config.companies_csv = path.clone();
        }
        if let Some(path) = &self.financials {
            config.financials_csv = path.clone();
        }
    }
}

fn init_logging() {
    // Stay quiet by default so log lines do not interleave with the menus
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("investor_calculator=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    init_logging();

    if let Err(e) = run() {
        error!("{:#}", e);
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::from_env();
    cli.apply_overrides(&mut config);

    let (mut db, seeded) = seed_if_missing(&config)
        .with_context(|| format!("Failed to open database {}", config.database_path))?;
    if let Some(stats) = seeded {
        info!(
            "Seeded {} with {} companies and {} financial records",
            config.database_path, stats.companies, stats.financials
        );
    }

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Menu => {
            db.set_metadata(LAST_SESSION_KEY, &Utc::now().to_rfc3339())?;
            println!("Welcome to the Investor Program!");
            let stdin = io::stdin();
            Shell::new(&mut db, stdin.lock(), io::stdout(), config.top_limit)
                .run()
                .context("Interactive session failed")?;
        }
        Commands::List => {
            println!("COMPANY LIST");
            for company in db.list_all()? {
                println!("{}", company_line(&company));
            }
        }
        Commands::Show { name, json } => show(&db, &name, json)?,
        Commands::Top { ratio, limit, json } => {
            let report = TopReport::build(&db, ratio, limit.unwrap_or(config.top_limit))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report);
            }
        }
        Commands::Stats => {
            let stats = db.stats()?;
            println!("📊 Database: {}", config.database_path);
            println!("   🏢 Companies: {}", stats.companies);
            println!("   💹 Financial records: {}", stats.financials);
            match db.get_metadata("seeded_at")? {
                Some(at) => println!("   🌱 Seeded at: {}", at),
                None => println!("   🌱 Not seeded from CSV"),
            }
            if let Some(at) = db.get_metadata(LAST_SESSION_KEY)? {
                println!("   🕒 Last menu session: {}", at);
            }
        }
    }

    Ok(())
}

fn show(db: &DatabaseManager, name: &str, json: bool) -> Result<()> {
    let mut reports = Vec::new();
    for company in db.find_by_name_substring(name)? {
        if let Some(record) = db.get_company(&company.ticker)? {
            reports.push(CompanyReport::from(record));
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else if reports.is_empty() {
        println!("Company not found!");
    } else {
        for report in &reports {
            println!("{}", report);
        }
    }
    Ok(())
}
