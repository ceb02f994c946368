use clap::Parser;
use grid_harvest::error::Result;
use grid_harvest::{FixtureSession, GridConfig, GridScrape, ScrapeError, server};

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    let config = match args.to_config() {
        Ok(config) => config,
        Err(e) => {
            ::log::error!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    if let Some(addr) = args.serve {
        eprintln!("Note: scraping requires a WebDriver server (e.g., ChromeDriver).");
        if let Err(e) = server::serve(addr, config).await {
            ::log::error!("Server stopped: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let start_time = std::time::Instant::now();

    let outcome = run_once(&args, config, interrupted()).await;
    if matches!(outcome, Err(ScrapeError::Cancelled)) {
        ::log::warn!("Interrupted after {:.2} seconds", start_time.elapsed().as_secs_f64());
        std::process::exit(130);
    }

    let ok = outcome.is_ok();
    let (_, axum::Json(body)) = server::response_body(outcome);
    let rendered = if args.pretty {
        serde_json::to_string_pretty(&body)
    } else {
        serde_json::to_string(&body)
    };
    match rendered {
        Ok(json) => println!("{json}"),
        Err(e) => ::log::error!("Failed to render output: {}", e),
    }

    ::log::info!(
        "Run finished in {:.2} seconds",
        start_time.elapsed().as_secs_f64()
    );
    if !ok {
        std::process::exit(1);
    }
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        ::log::warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn run_once(
    args: &Args,
    config: GridConfig,
    shutdown: impl Future<Output = ()> + Send,
) -> Result<grid_harvest::Harvest> {
    if args.replay.is_empty() {
        eprintln!("Note: scraping requires a WebDriver server (e.g., ChromeDriver).");
        eprintln!(
            "Set WEBDRIVER_URL environment variable if not using the default http://localhost:4444"
        );
        return GridScrape::with_config(config).run_until(shutdown).await;
    }

    let session = FixtureSession::from_files(&config.start_url, &args.replay)?;
    GridScrape::with_config(config)
        .run_on_until(session, shutdown)
        .await
}
