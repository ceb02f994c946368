//! Builders for replayed grid pages.

use crate::config::GridConfig;
use crate::session::FixtureSession;

pub const GRID_URL: &str = "https://example.org/ActiveTenders.aspx";

/// One data row; `page` and `index` make the title, and so the dedup key, unique
pub fn row(page: usize, index: usize) -> String {
    let class = if index % 2 == 0 { "rgAltRow" } else { "rgRow" };
    format!(
        r#"<tr class="{class}">
            <td>Tender Notice</td><td>Tender {page}-{index}</td><td>Works</td>
            <td>01/10/2026</td><td>15/11/2026</td><td>Department {page}</td><td></td>
            <td><a href="Docs/{page}-{index}.pdf">Notice</a></td>
            <td><a href="Bids/{page}-{index}.pdf">Documents</a></td>
        </tr>"#
    )
}

/// Ten distinct rows for `page`
pub fn rows(page: usize) -> Vec<String> {
    (1..=10).map(|i| row(page, i)).collect()
}

/// A full document with the given rows and pager markup
pub fn grid_page(rows: &[String], pager: &str) -> String {
    format!(
        r#"<html><body>
            <table class="rgMasterTable"><tbody>{}</tbody></table>
            <div class="rgPager">{pager}</div>
        </body></html>"#,
        rows.join("\n")
    )
}

/// Next-page control targeting `page`
pub fn next_control(page: usize) -> String {
    format!(r##"<a class="rgPageNext" title="Next Page" href="#page-{page}"></a>"##)
}

/// Numbered links for `pages`
pub fn numbered_links(pages: impl IntoIterator<Item = usize>) -> String {
    pages
        .into_iter()
        .map(|p| format!(r##"<a href="#page-{p}"><span>{p}</span></a>"##))
        .collect()
}

/// Pages chained by next controls; the last page has none
pub fn chained(pages: Vec<Vec<String>>) -> Vec<String> {
    let count = pages.len();
    pages
        .iter()
        .enumerate()
        .map(|(i, rows)| {
            let pager = if i + 1 < count { next_control(i + 2) } else { String::new() };
            grid_page(rows, &pager)
        })
        .collect()
}

pub fn session(pages: Vec<String>) -> FixtureSession {
    FixtureSession::new(GRID_URL, pages).unwrap()
}

pub fn config() -> GridConfig {
    GridConfig::new(GRID_URL)
}
