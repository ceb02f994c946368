//! Offline session that replays captured grid pages.
//!
//! Each page is a full HTML document, parsed once when the session is built.
//! Clicking an anchor whose `href` is `#page-N` renders page N (1-based); any
//! other click leaves the current page in place, which is how a disabled
//! pager control behaves.

use crate::error::{Result, SessionError};
use crate::session::BrowserSession;
use crate::utils::collapse_whitespace;
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use url::Url;

/// Handle to an element of one replayed page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixtureElement {
    page: usize,
    ordinal: usize,
}

pub struct FixtureSession {
    url: Url,
    // Html is Send but not Sync; the lock is never held across an await
    pages: Vec<Mutex<Html>>,
    any: Selector,
    current: usize,
    failing_clicks: usize,
    clicks: usize,
    closed: Arc<AtomicBool>,
}

impl FixtureSession {
    /// Create a session positioned on the first of `pages`
    pub fn new(url: &str, pages: Vec<String>) -> Result<Self> {
        let any = parse_selector("*")?;
        Ok(Self {
            url: Url::parse(url)?,
            pages: pages
                .iter()
                .map(|html| Mutex::new(Html::parse_document(html)))
                .collect(),
            any,
            current: 0,
            failing_clicks: 0,
            clicks: 0,
            closed: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Load captured pages from disk, in the given order
    pub fn from_files<P: AsRef<Path>>(url: &str, paths: &[P]) -> Result<Self> {
        let mut pages = Vec::with_capacity(paths.len());
        for path in paths {
            pages.push(std::fs::read_to_string(path)?);
        }
        Self::new(url, pages)
    }

    /// Make the next `count` clicks fail as if the element had detached
    pub fn with_failing_clicks(mut self, count: usize) -> Self {
        self.failing_clicks = count;
        self
    }

    /// 1-based number of the page currently rendered
    pub fn current_page(&self) -> usize {
        self.current + 1
    }

    /// Number of click attempts, failed ones included
    pub fn clicks(&self) -> usize {
        self.clicks
    }

    /// Flag set once the session has been closed; stays readable after the
    /// session itself is consumed
    pub fn closed_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.closed)
    }

    fn with_document<T>(&self, f: impl FnOnce(&Html) -> Result<T, SessionError>) -> Result<T, SessionError> {
        match self.pages.get(self.current) {
            Some(page) => f(&page.lock().unwrap_or_else(PoisonError::into_inner)),
            None => f(&Html::new_document()),
        }
    }

    fn select_ordinals(&self, scope: Option<&FixtureElement>, css: &str) -> Result<Vec<FixtureElement>, SessionError> {
        let wanted = parse_selector(css)?;

        self.with_document(|doc| {
            let matches: HashSet<_> = match scope {
                Some(parent) => self
                    .resolve(doc, parent)?
                    .select(&wanted)
                    .map(|e| e.id())
                    .collect(),
                None => doc.select(&wanted).map(|e| e.id()).collect(),
            };

            // Matches come back in document order, same as the ordinals
            Ok(doc
                .select(&self.any)
                .enumerate()
                .filter(|(_, e)| matches.contains(&e.id()))
                .map(|(ordinal, _)| FixtureElement {
                    page: self.current,
                    ordinal,
                })
                .collect())
        })
    }

    fn resolve<'a>(&self, doc: &'a Html, element: &FixtureElement) -> Result<ElementRef<'a>, SessionError> {
        if element.page != self.current {
            return Err(SessionError::Command("stale element reference".to_string()));
        }
        doc.select(&self.any)
            .nth(element.ordinal)
            .ok_or_else(|| SessionError::Command("no such element".to_string()))
    }

    fn read<T>(&self, element: &FixtureElement, f: impl FnOnce(ElementRef<'_>) -> T) -> Result<T, SessionError> {
        self.with_document(|doc| Ok(f(self.resolve(doc, element)?)))
    }

    fn target_page(href: &str) -> Option<usize> {
        href.strip_prefix("#page-")?.parse().ok()
    }
}

fn parse_selector(css: &str) -> Result<Selector, SessionError> {
    Selector::parse(css).map_err(|_| SessionError::InvalidSelector(css.to_string()))
}

#[async_trait]
impl BrowserSession for FixtureSession {
    type Element = FixtureElement;

    async fn goto(&mut self, url: &str) -> Result<(), SessionError> {
        self.url = Url::parse(url).map_err(|e| SessionError::Command(e.to_string()))?;
        self.current = 0;
        Ok(())
    }

    async fn current_url(&self) -> Result<Url, SessionError> {
        Ok(self.url.clone())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<FixtureElement>, SessionError> {
        self.select_ordinals(None, selector)
    }

    async fn find_all_in(
        &self,
        parent: &FixtureElement,
        selector: &str,
    ) -> Result<Vec<FixtureElement>, SessionError> {
        self.select_ordinals(Some(parent), selector)
    }

    async fn text(&self, element: &FixtureElement) -> Result<String, SessionError> {
        self.read(element, |node| {
            collapse_whitespace(&node.text().collect::<Vec<_>>().join(" "))
        })
    }

    async fn attr(&self, element: &FixtureElement, name: &str) -> Result<Option<String>, SessionError> {
        self.read(element, |node| node.value().attr(name).map(str::to_string))
    }

    async fn click(&mut self, element: &FixtureElement) -> Result<(), SessionError> {
        self.clicks += 1;
        if self.failing_clicks > 0 {
            self.failing_clicks -= 1;
            return Err(SessionError::Command(
                "element is not attached to the page document".to_string(),
            ));
        }

        let href = self.read(element, |node| node.value().attr("href").map(str::to_string))?;
        if let Some(page) = href.as_deref().and_then(Self::target_page) {
            if (1..=self.pages.len()).contains(&page) {
                ::log::trace!("Replay moving from page {} to {}", self.current + 1, page);
                self.current = page - 1;
            }
        }
        Ok(())
    }

    async fn close(self) -> Result<(), SessionError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
