mod report;
mod seed;

use std::error::Error;
use std::io::IsTerminal;

use board::flags::FeatureFlags;
use board::safety::{SafetyCheck, SafetyOptions};
use board::{Config, MigrationRunner};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Q&A board maintenance tool.
#[derive(Parser, Debug)]
#[command(name = "board", version)]
struct Cli {
    /// Database connection URL (defaults to DATABASE_URL)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run pending migrations
    Migrate,

    /// Show migration status
    Status,

    /// Run the pre-migration safety checklist
    #[command(visible_alias = "migration:safety-check")]
    SafetyCheck {
        /// Prepare a database backup location first
        #[arg(long)]
        backup: bool,

        /// Replay the latest migration inside a rolled-back transaction
        #[arg(long)]
        rollback_test: bool,

        /// Check server and extension versions
        #[arg(long)]
        dependency_check: bool,
    },

    /// Inspect feature flags
    Flags {
        #[command(subcommand)]
        command: FlagsCommand,
    },

    /// Insert demo users, questions and answers
    Seed,
}

#[derive(Subcommand, Debug)]
enum FlagsCommand {
    /// List every declared flag
    List,

    /// Show one flag
    Show { name: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stdout().is_terminal();

    match cli.command {
        Command::Migrate => {
            let config = load_config(cli.database_url)?;
            let pool = board::pool::connect(&config)?;
            let mut conn = pool.get().await?;
            let ran = MigrationRunner::new(&mut conn).migrate().await?;
            println!("applied {} migration(s)", ran.len());
            for version in ran {
                println!("  {version}");
            }
        }
        Command::Status => {
            let config = load_config(cli.database_url)?;
            let pool = board::pool::connect(&config)?;
            let mut conn = pool.get().await?;
            let statuses = MigrationRunner::new(&mut conn).status().await?;
            println!("{}", report::render_status(&statuses, color));
        }
        Command::SafetyCheck {
            backup,
            rollback_test,
            dependency_check,
        } => {
            let config = load_config(cli.database_url)?;
            let flags = FeatureFlags::in_memory();
            let pool = board::pool::connect(&config)?;
            let mut conn = pool.get().await?;

            let options = SafetyOptions {
                backup,
                rollback_test,
                dependency_check,
            };
            let report = SafetyCheck::new(&mut conn, &flags, &config.backup_dir)
                .run(options)
                .await?;
            // Findings never change the exit status; only setup failures do.
            println!("{}", report::render_report(&report, color));
        }
        Command::Flags { command } => {
            let flags = FeatureFlags::in_memory();
            match command {
                FlagsCommand::List => {
                    let all = flags.all_flags();
                    let rows = all.iter().map(|(name, on)| (name.as_str(), *on));
                    println!("{}", report::render_flags(rows, color));
                }
                FlagsCommand::Show { name } => {
                    let on = flags.is_enabled(&name);
                    println!("{}", report::render_flags([(name.as_str(), on)], color));
                }
            }
        }
        Command::Seed => {
            let config = load_config(cli.database_url)?;
            let pool = board::pool::connect(&config)?;
            let summary = seed::seed(&pool).await?;
            println!(
                "seeded {} user(s), {} question(s), {} answer(s)",
                summary.users, summary.questions, summary.answers
            );
        }
    }

    Ok(())
}

/// Read configuration, letting `--database-url` stand in for `DATABASE_URL`.
fn load_config(database_url: Option<String>) -> Result<Config, board::ConfigError> {
    let config = Config::from_lookup(|key| match (key, &database_url) {
        ("DATABASE_URL", Some(url)) => Some(url.clone()),
        _ => std::env::var(key).ok(),
    })?;
    info!(database = %mask_password(&config.database_url), "using database");
    Ok(config)
}

/// Mask the password in a database URL for display.
fn mask_password(url: &str) -> String {
    let Some(start) = url.find("://") else {
        return url.to_owned();
    };
    let Some(at) = url.rfind('@') else {
        return url.to_owned();
    };
    if at < start + 3 {
        return url.to_owned();
    }
    match url[start + 3..at].find(':') {
        Some(colon) => {
            let user = &url[start + 3..start + 3 + colon];
            format!("{}{user}:***{}", &url[..start + 3], &url[at..])
        }
        None => url.to_owned(),
    }
}
