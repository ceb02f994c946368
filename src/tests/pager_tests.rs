use super::fixtures::{config, grid_page, next_control, numbered_links, rows, session};
use crate::error::ScrapeError;
use crate::pager::{Pager, PagerState, Strategy};
use crate::session::{BrowserSession, FixtureSession};

async fn state_of(session: &FixtureSession) -> PagerState {
    PagerState::new(session.snapshot("tr.rgRow, tr.rgAltRow").await.unwrap())
}

#[tokio::test(start_paused = true)]
async fn test_detects_numbered_window() {
    let session = session(vec![grid_page(&rows(1), &numbered_links(1..=5))]);

    let pager = Pager::detect(&session, &config()).await.unwrap();
    assert_eq!(pager.strategy(), Strategy::Numbered { next: 2, max: 5 });
}

#[tokio::test(start_paused = true)]
async fn test_single_number_means_next_control() {
    let pager_html = format!("{}{}", numbered_links([1]), next_control(2));
    let session = session(vec![grid_page(&rows(1), &pager_html)]);

    let pager = Pager::detect(&session, &config()).await.unwrap();
    assert_eq!(pager.strategy(), Strategy::NextControl);
}

#[tokio::test(start_paused = true)]
async fn test_rotated_window_falls_back_to_next_control() {
    // Page 2's window no longer shows a link to page 3
    let pages = vec![
        grid_page(&rows(1), &numbered_links(1..=3)),
        grid_page(&rows(2), &format!("{}{}", numbered_links([1, 2]), next_control(3))),
        grid_page(&rows(3), ""),
    ];
    let mut session = session(pages);
    let mut pager = Pager::detect(&session, &config()).await.unwrap();

    let state = state_of(&session).await;
    let first = pager.advance(&mut session, &state).await.unwrap();
    assert!(first.advanced);
    assert_eq!(session.current_page(), 2);
    assert_ne!(first.snapshot, state.snapshot());

    let state = PagerState::new(first.snapshot);
    let second = pager.advance(&mut session, &state).await.unwrap();
    assert!(second.advanced);
    assert_eq!(session.current_page(), 3);
    assert_eq!(pager.strategy(), Strategy::NextControl);

    let state = PagerState::new(second.snapshot);
    let third = pager.advance(&mut session, &state).await.unwrap();
    assert!(!third.advanced);
    assert_eq!(third.snapshot, state.snapshot());
}

#[tokio::test(start_paused = true)]
async fn test_textual_next_fallback() {
    for label in ["»", "›", "NEXT", " next "] {
        let pager_html = format!(r##"<a href="#page-2">{label}</a>"##);
        let mut session = session(vec![
            grid_page(&rows(1), &pager_html),
            grid_page(&rows(2), ""),
        ]);
        let mut pager = Pager::new(&config(), Strategy::NextControl);

        let state = state_of(&session).await;
        let advance = pager.advance(&mut session, &state).await.unwrap();

        assert!(advance.advanced, "label {label:?} was not recognised");
        assert_eq!(session.current_page(), 2);
    }
}

#[tokio::test(start_paused = true)]
async fn test_fixed_selectors_win_over_text() {
    let pager_html = format!(r##"<a href="#page-3">next</a>{}"##, next_control(2));
    let mut session = session(vec![
        grid_page(&rows(1), &pager_html),
        grid_page(&rows(2), ""),
        grid_page(&rows(3), ""),
    ]);
    let mut pager = Pager::new(&config(), Strategy::NextControl);

    let state = state_of(&session).await;
    pager.advance(&mut session, &state).await.unwrap();
    assert_eq!(session.current_page(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_no_control_is_not_an_error() {
    let mut session = session(vec![grid_page(&rows(1), r#"<a href="/help">Help</a>"#)]);
    let mut pager = Pager::new(&config(), Strategy::NextControl);

    let state = state_of(&session).await;
    let advance = pager.advance(&mut session, &state).await.unwrap();

    assert!(!advance.advanced);
    assert_eq!(session.clicks(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_single_click_failure_is_retried() {
    let mut session = session(vec![
        grid_page(&rows(1), &next_control(2)),
        grid_page(&rows(2), ""),
    ])
    .with_failing_clicks(1);
    let mut pager = Pager::new(&config(), Strategy::NextControl);

    let state = state_of(&session).await;
    let advance = pager.advance(&mut session, &state).await.unwrap();

    assert!(advance.advanced);
    assert_eq!(session.clicks(), 2);
    assert_eq!(session.current_page(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_repeated_click_failure_is_a_fault() {
    let mut session = session(vec![
        grid_page(&rows(1), &numbered_links(1..=2)),
        grid_page(&rows(2), ""),
    ])
    .with_failing_clicks(2);
    let mut pager = Pager::detect(&session, &config()).await.unwrap();

    let state = state_of(&session).await;
    let err = pager.advance(&mut session, &state).await.unwrap_err();

    match err {
        ScrapeError::PagerFault { action, .. } => assert_eq!(action, "click page 2"),
        other => panic!("unexpected error: {other}"),
    }
}
