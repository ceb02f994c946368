use crate::error::{Result, ScrapeError};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Configuration for a grid harvesting run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// URL of the first grid page
    #[serde(default = "default_start_url")]
    pub start_url: String,

    /// Run the browser without a visible window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Pause after each extracted page, before advancing
    #[serde(default = "default_delay_between_pages_ms")]
    pub delay_between_pages_ms: u64,

    /// Pause after a page transition, before extracting
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// How long to wait for grid rows to appear
    #[serde(default = "default_row_wait_timeout_ms")]
    pub row_wait_timeout_ms: u64,

    /// How long to wait for rows to change after a click
    #[serde(default = "default_change_timeout_ms")]
    pub change_timeout_ms: u64,

    /// Interval between checks while waiting
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Pause before retrying a failed click
    #[serde(default = "default_click_retry_backoff_ms")]
    pub click_retry_backoff_ms: u64,

    /// Maximum number of page advances in one run
    #[serde(default = "default_max_loop_pages")]
    pub max_loop_pages: usize,

    /// Consecutive advances without new records before giving up
    #[serde(default = "default_stagnation_threshold")]
    pub stagnation_threshold: usize,

    /// Optional wall-clock budget for the whole run
    #[serde(default)]
    pub total_timeout_secs: Option<u64>,

    #[serde(default)]
    pub selectors: GridSelectors,
}

/// CSS selectors and labels describing the grid and its pager
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSelectors {
    /// Data rows of the grid
    #[serde(default = "default_rows")]
    pub rows: String,

    /// Elements whose presence means the grid has rendered, rows or not
    #[serde(default = "default_ready")]
    pub ready: String,

    /// "Next" controls, probed in order
    #[serde(default = "default_next_controls")]
    pub next_controls: Vec<String>,

    /// Anchor texts treated as "next" when no control matches (case-insensitive)
    #[serde(default = "default_next_labels")]
    pub next_labels: Vec<String>,
}

/// Default value for start_url
fn default_start_url() -> String {
    "https://eproc.punjab.gov.pk/ActiveTenders.aspx".to_string()
}

/// Default value for headless
fn default_headless() -> bool {
    true
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

/// Default value for delay_between_pages_ms
fn default_delay_between_pages_ms() -> u64 {
    900
}

/// Default value for settle_delay_ms
fn default_settle_delay_ms() -> u64 {
    600
}

/// Default value for row_wait_timeout_ms
fn default_row_wait_timeout_ms() -> u64 {
    15_000
}

/// Default value for change_timeout_ms
fn default_change_timeout_ms() -> u64 {
    20_000
}

/// Default value for poll_interval_ms
fn default_poll_interval_ms() -> u64 {
    250
}

/// Default value for click_retry_backoff_ms
fn default_click_retry_backoff_ms() -> u64 {
    500
}

/// Default value for max_loop_pages
fn default_max_loop_pages() -> usize {
    200
}

/// Default value for stagnation_threshold
fn default_stagnation_threshold() -> usize {
    4
}

/// Default value for rows
fn default_rows() -> String {
    "tr.rgRow, tr.rgAltRow".to_string()
}

/// Default value for ready
fn default_ready() -> String {
    "tr.rgRow, tr.rgAltRow, tr.rgNoRecords".to_string()
}

/// Default value for next_controls
fn default_next_controls() -> Vec<String> {
    vec![
        r#"a[title="Next"]"#.to_string(),
        r#"a[title=">>"]"#.to_string(),
        "a.rgPageNext".to_string(),
        r#"a[aria-label="Next"]"#.to_string(),
    ]
}

/// Default value for next_labels
fn default_next_labels() -> Vec<String> {
    vec!["»".to_string(), "›".to_string(), "next".to_string()]
}

impl Default for GridSelectors {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            ready: default_ready(),
            next_controls: default_next_controls(),
            next_labels: default_next_labels(),
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self::new(&default_start_url())
    }
}

impl GridConfig {
    /// Create a new configuration with default values
    pub fn new(start_url: &str) -> Self {
        Self {
            start_url: start_url.to_string(),
            headless: default_headless(),
            webdriver_url: default_webdriver_url(),
            delay_between_pages_ms: default_delay_between_pages_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            row_wait_timeout_ms: default_row_wait_timeout_ms(),
            change_timeout_ms: default_change_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            click_retry_backoff_ms: default_click_retry_backoff_ms(),
            max_loop_pages: default_max_loop_pages(),
            stagnation_threshold: default_stagnation_threshold(),
            total_timeout_secs: None,
            selectors: GridSelectors::default(),
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Replace the WebDriver URL with `WEBDRIVER_URL` when it is set
    pub fn apply_env(&mut self) {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.webdriver_url = webdriver_url;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.start_url()?;
        if self.selectors.rows.trim().is_empty() {
            return Err(ScrapeError::Config("row selector is empty".to_string()));
        }
        if self.max_loop_pages == 0 {
            return Err(ScrapeError::Config(
                "max_loop_pages must be at least 1".to_string(),
            ));
        }
        if self.stagnation_threshold == 0 {
            return Err(ScrapeError::Config(
                "stagnation_threshold must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn start_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.start_url)?)
    }

    pub fn delay_between_pages(&self) -> Duration {
        Duration::from_millis(self.delay_between_pages_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn row_wait_timeout(&self) -> Duration {
        Duration::from_millis(self.row_wait_timeout_ms)
    }

    pub fn change_timeout(&self) -> Duration {
        Duration::from_millis(self.change_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn click_retry_backoff(&self) -> Duration {
        Duration::from_millis(self.click_retry_backoff_ms)
    }

    pub fn total_timeout(&self) -> Option<Duration> {
        self.total_timeout_secs.map(Duration::from_secs)
    }
}
