use crate::config::GridConfig;
use crate::error::Result;
use crate::extract::RowExtractor;
use crate::links::LinkResolver;
use crate::pager::{Pager, PagerState};
use crate::results::{Harvest, Record, StopReason};
use crate::session::BrowserSession;
use crate::utils::find_total_count;
use std::collections::HashSet;

/// Ordered, deduplicated records collected during one run
#[derive(Debug, Default)]
pub struct Accumulator {
    records: Vec<Record>,
    seen: HashSet<String>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record unless one with the same key is already held
    pub fn insert(&mut self, record: Record) -> bool {
        if !self.seen.insert(record.dedup_key()) {
            return false;
        }
        self.records.push(record);
        true
    }

    /// Add every unseen record and return how many were new
    pub fn merge(&mut self, records: impl IntoIterator<Item = Record>) -> usize {
        let mut added = 0;
        for record in records {
            if self.insert(record) {
                added += 1;
            }
        }
        added
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

/// Drives extraction and paging over one session until the grid is exhausted
pub struct TraversalController<'a> {
    config: &'a GridConfig,
    extractor: RowExtractor,
}

impl<'a> TraversalController<'a> {
    pub fn new(config: &'a GridConfig) -> Self {
        Self {
            config,
            extractor: RowExtractor::from_config(config),
        }
    }

    /// Walk every page reachable from the one the session is showing.
    ///
    /// The session must already be on the first grid page.
    pub async fn run<S: BrowserSession>(&self, session: &mut S) -> Result<Harvest> {
        let links = LinkResolver::for_page(&session.current_url().await?)?;
        let mut state = PagerState::new(
            session
                .snapshot(&self.config.selectors.rows)
                .await
                .unwrap_or_default(),
        );

        let total_hint = probe_total_items(session).await;
        ::log::info!("Detected total items (may be unknown): {:?}", total_hint);

        let mut pager = Pager::detect(session, self.config).await?;
        let mut accumulator = Accumulator::new();
        let mut pages_visited = 0;
        let mut advances = 0;
        let mut stagnant = 0;

        let stop_reason = loop {
            let rows = self.extractor.extract(session, &links).await?;
            let row_count = rows.len();
            let new_records = accumulator.merge(rows);
            pages_visited += 1;
            ::log::info!(
                "Page {} yielded {} rows, {} new",
                pages_visited,
                row_count,
                new_records
            );

            if row_count == 0 {
                ::log::info!("Page {} rendered an empty grid, stopping", pages_visited);
                break StopReason::EndOfData;
            }

            if let Ok(snapshot) = session.snapshot(&self.config.selectors.rows).await {
                state.observe(snapshot);
            }

            if advances > 0 {
                stagnant = if new_records == 0 { stagnant + 1 } else { 0 };
                if stagnant >= self.config.stagnation_threshold {
                    ::log::info!("No new rows for {} advances, stopping", stagnant);
                    break StopReason::Stagnated;
                }
            }

            if advances >= self.config.max_loop_pages {
                ::log::warn!("Reached page limit ({}), stopping", self.config.max_loop_pages);
                break StopReason::PageCap;
            }

            tokio::time::sleep(self.config.delay_between_pages()).await;

            let advance = pager.advance(session, &state).await?;
            if !advance.advanced {
                break StopReason::NoNextPage;
            }
            advances += 1;
            state.observe(advance.snapshot);
        };

        ::log::info!(
            "Scraped {} unique rows over {} pages ({:?})",
            accumulator.len(),
            pages_visited,
            stop_reason
        );
        if let Some(total) = total_hint {
            if (accumulator.len() as u64) < total {
                ::log::warn!(
                    "Page advertised {} items but only {} were collected; pages may have been skipped",
                    total,
                    accumulator.len()
                );
            }
        }

        Ok(Harvest {
            records: accumulator.into_records(),
            pages_visited,
            advances,
            stop_reason,
            total_hint,
        })
    }
}

/// Best-effort search for an advertised item total. Never fails.
pub async fn probe_total_items<S: BrowserSession>(session: &S) -> Option<u64> {
    match session.page_text().await {
        Ok(text) => find_total_count(&text),
        Err(e) => {
            ::log::debug!("Total item probe failed: {}", e);
            None
        }
    }
}
