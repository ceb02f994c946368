use crate::config::GridConfig;
use crate::error::SessionError;
use crate::session::{BrowserSession, SNAPSHOT_SEPARATOR};
use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{Map, Value, json};
use std::time::Duration;
use url::Url;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Common local WebDriver endpoints tried after the configured one
const FALLBACK_URLS: [&str; 2] = [
    "http://localhost:9515", // ChromeDriver default
    "http://127.0.0.1:4444",
];

const SNAPSHOT_SCRIPT: &str = "return Array.from(document.querySelectorAll(arguments[0])).map(t => t.innerText).join(arguments[1]);";

/// A browser session driven through a WebDriver server.
///
/// Dropping the session without calling `close` still ends it once the
/// last client handle goes away.
pub struct WebDriverSession {
    client: Client,
}

impl WebDriverSession {
    /// Connect to the configured WebDriver server, falling back to common local ports
    pub async fn connect(config: &GridConfig) -> Result<Self, SessionError> {
        let capabilities = chrome_capabilities(config.headless);

        match connect_to(&config.webdriver_url, &capabilities).await {
            Ok(client) => return Ok(Self { client }),
            Err(e) => {
                ::log::error!(
                    "Failed to connect to WebDriver at {}: {}",
                    config.webdriver_url,
                    e
                );
            }
        }

        for url in FALLBACK_URLS {
            if url == config.webdriver_url {
                continue;
            }

            ::log::info!("Trying fallback WebDriver URL: {}", url);
            if let Ok(client) = connect_to(url, &capabilities).await {
                ::log::debug!("Connected to fallback WebDriver at {}", url);
                return Ok(Self { client });
            }
        }

        ::log::error!(
            "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
        );
        Err(SessionError::Connect(config.webdriver_url.clone()))
    }
}

async fn connect_to(
    url: &str,
    capabilities: &Map<String, Value>,
) -> Result<Client, fantoccini::error::NewSessionError> {
    let mut builder = ClientBuilder::native();
    builder.capabilities(capabilities.clone());
    let client = builder.connect(url).await?;
    ::log::debug!("Connected to WebDriver at {}", url);
    Ok(client)
}

fn chrome_capabilities(headless: bool) -> Map<String, Value> {
    let mut args = vec![
        "--no-sandbox".to_string(),
        "--disable-setuid-sandbox".to_string(),
        "--lang=en-US".to_string(),
        format!("--user-agent={USER_AGENT}"),
    ];
    if headless {
        args.push("--headless=new".to_string());
    }

    let mut capabilities = Map::new();
    capabilities.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
    capabilities
}

fn wait_error(error: CmdError, timeout: Duration, selector: &str) -> SessionError {
    match error {
        CmdError::WaitTimeout => SessionError::Timeout(timeout, selector.to_string()),
        other => other.into(),
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    type Element = Element;

    async fn goto(&mut self, url: &str) -> Result<(), SessionError> {
        self.client.goto(url).await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<Url, SessionError> {
        Ok(self.client.current_url().await?)
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Element>, SessionError> {
        Ok(self.client.find_all(Locator::Css(selector)).await?)
    }

    async fn find_all_in(&self, parent: &Element, selector: &str) -> Result<Vec<Element>, SessionError> {
        Ok(parent.find_all(Locator::Css(selector)).await?)
    }

    async fn text(&self, element: &Element) -> Result<String, SessionError> {
        Ok(element.text().await?)
    }

    async fn attr(&self, element: &Element, name: &str) -> Result<Option<String>, SessionError> {
        Ok(element.attr(name).await?)
    }

    async fn click(&mut self, element: &Element) -> Result<(), SessionError> {
        element.click().await?;
        Ok(())
    }

    async fn close(self) -> Result<(), SessionError> {
        self.client.close().await?;
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration, poll: Duration) -> Result<(), SessionError> {
        self.client
            .wait()
            .at_most(timeout)
            .every(poll)
            .for_element(Locator::Css(selector))
            .await
            .map_err(|e| wait_error(e, timeout, selector))?;
        Ok(())
    }

    async fn snapshot(&self, selector: &str) -> Result<String, SessionError> {
        let value = self
            .client
            .execute(SNAPSHOT_SCRIPT, vec![json!(selector), json!(SNAPSHOT_SEPARATOR)])
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }
}
