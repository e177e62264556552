// gridcast entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file)
// 2. Load config
// 3. Load season tables
// 4. Resolve identities, window histories, build matrices
// 5. Write outputs

use gridcast_app::config;
use gridcast_app::export;
use gridcast_app::ingest;
use gridcast_app::pipeline;

use anyhow::Context;
use tracing::{info, warn};

fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file)
    init_tracing()?;
    info!("gridcast starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: seasons {}-{}, {} trade overrides",
        config.seasons.first_year,
        config.seasons.last_year,
        config.trade_overrides.len()
    );

    // 3. Load season tables
    let seasons = ingest::load_seasons(&config).context("failed to load season tables")?;
    let rows: usize = seasons.values().map(|t| t.len()).sum();
    info!("Loaded {} rows across {} seasons", rows, seasons.len());

    // 4. Run the pipeline
    let output = pipeline::run(&config, seasons).context("pipeline failed")?;
    if output.resolution.failure_count() > 0 {
        warn!(
            "{} of {} rows unresolved; see {}",
            output.resolution.failure_count(),
            output.resolution.records.len(),
            export::RESOLUTION_FILE
        );
    }

    // 5. Write outputs
    let out_dir = config.output_dir();
    let written = export::write_all(&out_dir, &output)
        .with_context(|| format!("failed to write outputs to {}", out_dir.display()))?;

    info!(
        "Done: {} identities, {} training rows x {} columns, {} forecast rows",
        output.resolution.identity_count,
        output.matrix.n_rows(),
        output.matrix.n_cols(),
        output.forecast.n_rows()
    );
    println!(
        "{} identities, {} training rows, {} forecast rows, {} unresolved; wrote {} files to {}",
        output.resolution.identity_count,
        output.matrix.n_rows(),
        output.forecast.n_rows(),
        output.resolution.failure_count(),
        written.len(),
        out_dir.display()
    );

    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("gridcast.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("gridcast=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
