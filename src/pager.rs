//! Page advancement for server-rendered grids.
//!
//! Two pager shapes are supported: a window of numbered page links and a
//! single "next" control. The strategy is chosen once from the first page;
//! a numbered run hands over to next-control iteration when its range is
//! exhausted and never switches back.

use crate::config::GridConfig;
use crate::error::{Result, ScrapeError, SessionError};
use crate::session::BrowserSession;
use crate::utils::page_number;
use std::fmt;
use std::time::Duration;

/// How the pager moves to the next page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Click numbered links `next..=max`, then continue with the next control
    Numbered { next: u32, max: u32 },
    /// Click the "next" control until none is found
    NextControl,
}

/// Last observed text of the grid rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PagerState {
    snapshot: String,
}

impl PagerState {
    pub fn new(snapshot: String) -> Self {
        Self { snapshot }
    }

    pub fn snapshot(&self) -> &str {
        &self.snapshot
    }

    pub fn observe(&mut self, snapshot: String) {
        self.snapshot = snapshot;
    }
}

/// Result of one advance attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advance {
    /// False when no control leads to another page
    pub advanced: bool,
    /// Row text observed after the transition
    pub snapshot: String,
}

#[derive(Debug, Clone, Copy)]
enum Target {
    Page(u32),
    Next,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Page(n) => write!(f, "click page {n}"),
            Target::Next => f.write_str("click next"),
        }
    }
}

pub struct Pager {
    strategy: Strategy,
    rows: String,
    next_controls: Vec<String>,
    next_labels: Vec<String>,
    settle: Duration,
    change_timeout: Duration,
    poll: Duration,
    retry_backoff: Duration,
}

impl Pager {
    pub fn new(config: &GridConfig, strategy: Strategy) -> Self {
        Self {
            strategy,
            rows: config.selectors.rows.clone(),
            next_controls: config.selectors.next_controls.clone(),
            next_labels: config
                .selectors
                .next_labels
                .iter()
                .map(|l| l.to_lowercase())
                .collect(),
            settle: config.settle_delay(),
            change_timeout: config.change_timeout(),
            poll: config.poll_interval(),
            retry_backoff: config.click_retry_backoff(),
        }
    }

    /// Inspect the first page and pick a strategy.
    ///
    /// Numbered links only describe the pager window currently shown, so
    /// `max` may be lower than the real page count.
    pub async fn detect<S: BrowserSession>(session: &S, config: &GridConfig) -> Result<Self> {
        let mut max = 0;
        for anchor in session.find_all("a").await? {
            if let Some(n) = page_number(&session.text(&anchor).await?) {
                max = max.max(n);
            }
        }

        let strategy = if max >= 2 {
            ::log::info!("Pager numeric links found, highest shown: {}", max);
            Strategy::Numbered { next: 2, max }
        } else {
            ::log::info!("No numbered pager links; iterating the next control");
            Strategy::NextControl
        };

        Ok(Self::new(config, strategy))
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Move the session to the following page.
    ///
    /// Running out of pages is reported through `Advance::advanced`, not as an error.
    pub async fn advance<S: BrowserSession>(
        &mut self,
        session: &mut S,
        state: &PagerState,
    ) -> Result<Advance> {
        let clicked = match self.strategy {
            Strategy::Numbered { next, max } => {
                ::log::debug!("Navigating to page {} of {}", next, max);
                let mut clicked = self.click_with_retry(session, Target::Page(next)).await?;
                if !clicked {
                    ::log::info!("Numeric link not found for {}, trying next control", next);
                    clicked = self.click_with_retry(session, Target::Next).await?;
                }

                self.strategy = if next >= max {
                    Strategy::NextControl
                } else {
                    Strategy::Numbered { next: next + 1, max }
                };
                clicked
            }
            Strategy::NextControl => self.click_with_retry(session, Target::Next).await?,
        };

        if !clicked {
            ::log::info!("No next page control found");
            return Ok(Advance {
                advanced: false,
                snapshot: state.snapshot().to_string(),
            });
        }

        let observed = self.wait_for_change(session, state.snapshot()).await;
        tokio::time::sleep(self.settle).await;
        let snapshot = session.snapshot(&self.rows).await.unwrap_or(observed);

        Ok(Advance {
            advanced: true,
            snapshot,
        })
    }

    /// Wait for the rows to differ from `previous`. Timing out is tolerated.
    async fn wait_for_change<S: BrowserSession>(&self, session: &S, previous: &str) -> String {
        let changed = tokio::time::timeout(self.change_timeout, async {
            loop {
                if let Ok(current) = session.snapshot(&self.rows).await {
                    if current != previous {
                        return current;
                    }
                }
                tokio::time::sleep(self.poll).await;
            }
        })
        .await;

        changed.unwrap_or_else(|_| {
            ::log::debug!(
                "Rows unchanged after {:?}; extracting what is rendered",
                self.change_timeout
            );
            previous.to_string()
        })
    }

    async fn click_with_retry<S: BrowserSession>(&self, session: &mut S, target: Target) -> Result<bool> {
        match self.try_click(session, target).await {
            Ok(clicked) => Ok(clicked),
            Err(first) => {
                ::log::warn!("Pager action `{}` failed ({}), retrying once", target, first);
                tokio::time::sleep(self.retry_backoff).await;
                self.try_click(session, target)
                    .await
                    .map_err(|source| ScrapeError::PagerFault {
                        action: target.to_string(),
                        source,
                    })
            }
        }
    }

    async fn try_click<S: BrowserSession>(&self, session: &mut S, target: Target) -> Result<bool, SessionError> {
        let control = match target {
            Target::Page(n) => find_anchor_labelled(session, &[n.to_string()]).await?,
            Target::Next => self.find_next_control(session).await?,
        };

        match control {
            Some(element) => {
                session.click(&element).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_next_control<S: BrowserSession>(&self, session: &S) -> Result<Option<S::Element>, SessionError> {
        for selector in &self.next_controls {
            if let Some(element) = session.find_all(selector).await?.into_iter().next() {
                ::log::trace!("Next control matched `{}`", selector);
                return Ok(Some(element));
            }
        }
        find_anchor_labelled(session, &self.next_labels).await
    }
}

/// First anchor whose trimmed text equals one of `labels`, ignoring case
async fn find_anchor_labelled<S: BrowserSession>(
    session: &S,
    labels: &[String],
) -> Result<Option<S::Element>, SessionError> {
    for anchor in session.find_all("a").await? {
        let text = session.text(&anchor).await?.trim().to_lowercase();
        if labels.iter().any(|l| l.to_lowercase() == text) {
            return Ok(Some(anchor));
        }
    }
    Ok(None)
}
