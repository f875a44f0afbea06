// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use tracing::info;

// Use library instead of local modules
use budget_tracker::{config, logging, render_report, Config, ExpenseRepository, FilterCriteria, Mode, SqliteStore};

fn main() -> Result<()> {
    let config = config::load();
    logging::init_tracing(&config.log_path)?;

    info!(
        version = budget_tracker::VERSION,
        db = %config.db_path.display(),
        "Starting budget tracker"
    );

    match config.mode.clone() {
        Mode::Report(criteria) => run_report(&config, &criteria)?,
        Mode::Interactive => run_ui_mode(&config)?,
    }

    Ok(())
}

fn open_repository(config: &Config) -> Result<ExpenseRepository<SqliteStore>> {
    let store = SqliteStore::open(&config.db_path)
        .with_context(|| format!("Cannot open expense store at {}", config.db_path.display()))?;

    Ok(ExpenseRepository::load_with_key(store, &config.store_key))
}

fn run_report(config: &Config, criteria: &FilterCriteria) -> Result<()> {
    let repository = open_repository(config)?;
    print!("{}", render_report(repository.expenses(), criteria));
    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &Config) -> Result<()> {
    let repository = open_repository(config)?;

    let mut app = ui::App::new(budget_tracker::Tracker::new(repository));
    ui::run_ui(&mut app)?;

    info!("UI closed");
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &Config) -> Result<()> {
    anyhow::bail!("TUI mode not available; rebuild with `--features tui` or use `budget-tracker report`")
}
