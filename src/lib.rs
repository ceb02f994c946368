pub mod config;
pub mod controller;
pub mod error;
pub mod extract;
pub mod links;
pub mod pager;
pub mod results;
pub mod server;
pub mod session;
pub mod utils;

#[cfg(test)]
mod tests;

// Re-export commonly used types for convenience
pub use config::GridConfig;
pub use error::{ScrapeError, SessionError};
pub use results::{Harvest, Record, StopReason};
pub use session::{BrowserSession, FixtureSession, WebDriverSession};

use controller::TraversalController;
use std::path::Path;

/// Main builder for harvesting every row of a paginated grid
#[derive(Debug, Clone)]
pub struct GridScrape {
    config: GridConfig,
}

impl GridScrape {
    /// Create a new builder for the grid at `start_url`
    pub fn new(start_url: &str) -> Self {
        Self {
            config: GridConfig::new(start_url),
        }
    }

    /// Use a complete configuration
    pub fn with_config(config: GridConfig) -> Self {
        Self { config }
    }

    /// Load configuration from a JSON file
    pub fn with_config_file(path: impl AsRef<Path>) -> error::Result<Self> {
        Ok(Self::with_config(GridConfig::from_file(path)?))
    }

    pub fn with_start_url(mut self, start_url: &str) -> Self {
        self.config.start_url = start_url.to_string();
        self
    }

    /// Show the browser window
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    pub fn with_webdriver_url(mut self, webdriver_url: &str) -> Self {
        self.config.webdriver_url = webdriver_url.to_string();
        self
    }

    /// Set the maximum number of page advances
    pub fn with_max_loop_pages(mut self, max_loop_pages: usize) -> Self {
        self.config.max_loop_pages = max_loop_pages;
        self
    }

    /// Set the pause between pages, in milliseconds
    pub fn with_delay_between_pages(mut self, delay_ms: u64) -> Self {
        self.config.delay_between_pages_ms = delay_ms;
        self
    }

    /// Set the wall-clock budget for the whole run
    pub fn with_total_timeout(mut self, timeout_seconds: u64) -> Self {
        self.config.total_timeout_secs = Some(timeout_seconds);
        self
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Open a WebDriver session and harvest the grid
    pub async fn run(&self) -> error::Result<Harvest> {
        self.run_until(std::future::pending()).await
    }

    /// Like [`run`](Self::run), but gives up with [`ScrapeError::Cancelled`]
    /// once `shutdown` resolves
    pub async fn run_until<F>(&self, shutdown: F) -> error::Result<Harvest>
    where
        F: Future<Output = ()> + Send,
    {
        self.config.validate()?;
        let session = WebDriverSession::connect(&self.config).await?;
        self.run_on_until(session, shutdown).await
    }

    /// Harvest the grid using `session`, which is closed on every exit path
    pub async fn run_on<S: BrowserSession>(&self, session: S) -> error::Result<Harvest> {
        self.run_on_until(session, std::future::pending()).await
    }

    /// Harvest the grid using `session` until `shutdown` resolves.
    ///
    /// The session is closed whether the traversal finished, failed, ran out
    /// of time or was cancelled.
    pub async fn run_on_until<S, F>(&self, mut session: S, shutdown: F) -> error::Result<Harvest>
    where
        S: BrowserSession,
        F: Future<Output = ()> + Send,
    {
        let outcome = tokio::select! {
            outcome = self.bounded_traverse(&mut session) => outcome,
            _ = shutdown => {
                ::log::warn!("Run cancelled, closing browser session");
                Err(ScrapeError::Cancelled)
            }
        };

        if let Err(e) = session.close().await {
            ::log::warn!("Failed to close browser session: {}", e);
        }
        outcome
    }

    async fn bounded_traverse<S: BrowserSession>(&self, session: &mut S) -> error::Result<Harvest> {
        match self.config.total_timeout() {
            Some(budget) => tokio::time::timeout(budget, self.traverse(session))
                .await
                .unwrap_or(Err(ScrapeError::Deadline(budget))),
            None => self.traverse(session).await,
        }
    }

    async fn traverse<S: BrowserSession>(&self, session: &mut S) -> error::Result<Harvest> {
        ::log::info!("Opening grid at {}", self.config.start_url);
        session.goto(&self.config.start_url).await?;
        TraversalController::new(&self.config).run(session).await
    }
}
