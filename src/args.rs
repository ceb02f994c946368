use clap::Parser;
use grid_harvest::GridConfig;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "grid-harvest")]
#[command(about = "Collects every row of a paginated, server-rendered grid")]
#[command(version)]
pub struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// URL of the first grid page
    #[arg(short, long)]
    pub url: Option<String>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Maximum number of page advances
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Pause between pages in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// WebDriver server URL (WEBDRIVER_URL takes precedence when set)
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Wall-clock budget for the whole run, in seconds
    #[arg(long)]
    pub total_timeout: Option<u64>,

    /// Replay captured HTML pages instead of driving a browser
    #[arg(long, num_args = 1.., conflicts_with = "serve")]
    pub replay: Vec<PathBuf>,

    /// Serve the scrape endpoint on this address instead of running once
    #[arg(long)]
    pub serve: Option<SocketAddr>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

impl Args {
    /// Merge the configuration file, command-line overrides and environment
    pub fn to_config(&self) -> grid_harvest::error::Result<GridConfig> {
        let mut config = match &self.config {
            Some(path) => GridConfig::from_file(path)?,
            None => GridConfig::default(),
        };

        if let Some(url) = &self.url {
            config.start_url = url.clone();
        }
        if self.headed {
            config.headless = false;
        }
        if let Some(max_pages) = self.max_pages {
            config.max_loop_pages = max_pages;
        }
        if let Some(delay_ms) = self.delay_ms {
            config.delay_between_pages_ms = delay_ms;
        }
        if let Some(webdriver_url) = &self.webdriver_url {
            config.webdriver_url = webdriver_url.clone();
        }
        if let Some(total_timeout) = self.total_timeout {
            config.total_timeout_secs = Some(total_timeout);
        }
        config.apply_env();

        config.validate()?;
        Ok(config)
    }
}
