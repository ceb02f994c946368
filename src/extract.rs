use crate::config::{GridConfig, GridSelectors};
use crate::error::{Result, ScrapeError, SessionError};
use crate::links::LinkResolver;
use crate::results::Record;
use crate::session::BrowserSession;
use std::time::Duration;

/// Reads the grid rows of the page currently rendered in a session
#[derive(Debug, Clone)]
pub struct RowExtractor {
    rows: String,
    ready: String,
    wait: Duration,
    poll: Duration,
}

impl RowExtractor {
    pub fn new(selectors: &GridSelectors, wait: Duration, poll: Duration) -> Self {
        Self {
            rows: selectors.rows.clone(),
            ready: selectors.ready.clone(),
            wait,
            poll,
        }
    }

    pub fn from_config(config: &GridConfig) -> Self {
        Self::new(&config.selectors, config.row_wait_timeout(), config.poll_interval())
    }

    /// Extract every row of the current page.
    ///
    /// An empty grid yields an empty list; only a grid that never renders is an error.
    pub async fn extract<S: BrowserSession>(
        &self,
        session: &S,
        links: &LinkResolver,
    ) -> Result<Vec<Record>> {
        match session.wait_for(&self.ready, self.wait, self.poll).await {
            Ok(()) => {}
            Err(SessionError::Timeout(waited, selector)) => {
                return Err(ScrapeError::ExtractionTimeout { selector, waited });
            }
            Err(e) => return Err(e.into()),
        }

        let rows = session.find_all(&self.rows).await?;
        let mut records = Vec::with_capacity(rows.len());

        for row in &rows {
            let mut cells = Vec::new();
            for cell in session.find_all_in(row, "td").await? {
                cells.push(session.text(&cell).await?);
            }

            let mut hrefs = Vec::new();
            for anchor in session.find_all_in(row, "a").await? {
                if let Some(href) = session.attr(&anchor, "href").await? {
                    hrefs.push(href);
                }
            }
            let resolved = links.resolve_all(hrefs.iter().map(String::as_str));

            records.push(Record::from_cells(&cells, &resolved));
        }

        ::log::debug!("Extracted {} rows", records.len());
        Ok(records)
    }
}
