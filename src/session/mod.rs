pub mod fixture;
pub mod webdriver;

pub use fixture::FixtureSession;
pub use webdriver::WebDriverSession;

use crate::error::SessionError;
use crate::utils::collapse_whitespace;
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// Separator between row texts in a snapshot
pub const SNAPSHOT_SEPARATOR: &str = "||";

/// The browser capabilities the harvester depends on.
///
/// Implementations must be driven by one task at a time; the grid is
/// stateful UI and concurrent navigation would corrupt it.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Handle to a live element on the current page
    type Element: Clone + Send + Sync;

    /// Navigate and wait for the page to finish loading
    async fn goto(&mut self, url: &str) -> Result<(), SessionError>;

    async fn current_url(&self) -> Result<Url, SessionError>;

    /// All elements matching a CSS selector, in document order
    async fn find_all(&self, selector: &str) -> Result<Vec<Self::Element>, SessionError>;

    /// All descendants of `parent` matching a CSS selector
    async fn find_all_in(
        &self,
        parent: &Self::Element,
        selector: &str,
    ) -> Result<Vec<Self::Element>, SessionError>;

    /// Rendered text of an element
    async fn text(&self, element: &Self::Element) -> Result<String, SessionError>;

    async fn attr(&self, element: &Self::Element, name: &str)
    -> Result<Option<String>, SessionError>;

    async fn click(&mut self, element: &Self::Element) -> Result<(), SessionError>;

    /// End the session and release the browser
    async fn close(self) -> Result<(), SessionError>;

    /// Wait until at least one element matches `selector`
    async fn wait_for(
        &self,
        selector: &str,
        timeout: Duration,
        poll: Duration,
    ) -> Result<(), SessionError> {
        let appeared = tokio::time::timeout(timeout, async {
            loop {
                if !self.find_all(selector).await?.is_empty() {
                    return Ok::<(), SessionError>(());
                }
                tokio::time::sleep(poll).await;
            }
        })
        .await;

        match appeared {
            Ok(result) => result,
            Err(_) => Err(SessionError::Timeout(timeout, selector.to_string())),
        }
    }

    /// Concatenated text of every element matching `selector`
    async fn snapshot(&self, selector: &str) -> Result<String, SessionError> {
        let mut texts = Vec::new();
        for element in self.find_all(selector).await? {
            texts.push(self.text(&element).await?);
        }
        Ok(texts.join(SNAPSHOT_SEPARATOR))
    }

    /// Whitespace-collapsed text of the whole document body
    async fn page_text(&self) -> Result<String, SessionError> {
        let mut text = String::new();
        if let Some(body) = self.find_all("body").await?.first() {
            text = collapse_whitespace(&self.text(body).await?);
        }
        Ok(text)
    }
}
