mod common;

use std::sync::mpsc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tempfile::tempdir;
use tunedash::charts::ChartKind;
use tunedash::upload::UploadBrowser;
use tunedash::{App, AppEvent, OpenOptions, Screen};

fn new_app() -> (App, mpsc::Receiver<AppEvent>) {
    let (tx, rx) = mpsc::channel();
    (App::new(tx), rx)
}

fn press(app: &mut App, code: KeyCode) -> Option<AppEvent> {
    app.event(&AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
}

/// Press a key and chase any events the handler schedules, the way the
/// main loop does.
fn press_and_follow(app: &mut App, code: KeyCode) {
    let mut event = press(app, code);
    while let Some(e) = event.take() {
        event = app.event(&e);
    }
}

#[test]
fn test_upload_to_explore_workflow() {
    let dir = tempdir().unwrap();
    let path = common::write_catalog(dir.path(), "catalog.csv", common::FULL_CATALOG);
    let (mut app, _rx) = new_app();

    assert_eq!(app.session.screen, Screen::Landing);
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.session.screen, Screen::Upload);

    common::open_dataset(&mut app, &path, OpenOptions::new());
    let dataset = app.dataset.as_ref().expect("dataset should be loaded");
    assert_eq!(dataset.height(), 4);
    assert_eq!(app.genre_values, vec!["All", "Jazz", "Pop", "Rock"]);
    assert_eq!(app.charts, ChartKind::ALL.to_vec());
    assert!(app.load_error.is_none());

    press(&mut app, KeyCode::Char('g'));
    assert_eq!(app.session.screen, Screen::Explore);

    let kpis = app.kpis();
    assert_eq!(kpis.revenue, 65.0);
    assert_eq!(kpis.plays, 650.0);
    assert_eq!(kpis.listeners, 230.0);
}

#[test]
fn test_genre_navigation_is_clamped() {
    let dir = tempdir().unwrap();
    let path = common::write_catalog(dir.path(), "catalog.csv", common::FULL_CATALOG);
    let (mut app, _rx) = new_app();
    press(&mut app, KeyCode::Enter);
    common::open_dataset(&mut app, &path, OpenOptions::new());
    press(&mut app, KeyCode::Char('g'));

    assert_eq!(app.selected_genre(), "All");
    press(&mut app, KeyCode::Down);
    assert_eq!(app.selected_genre(), "Jazz");
    assert_eq!(app.kpis().revenue, 5.0);

    press(&mut app, KeyCode::Down);
    assert_eq!(app.selected_genre(), "Pop");
    assert_eq!(app.kpis().revenue, 20.0);

    press(&mut app, KeyCode::Down);
    assert_eq!(app.selected_genre(), "Rock");
    assert_eq!(app.kpis().revenue, 40.0);
    assert_eq!(app.kpis().plays, 400.0);

    // Clamped at the last genre
    press(&mut app, KeyCode::Down);
    assert_eq!(app.selected_genre(), "Rock");

    for _ in 0..5 {
        press(&mut app, KeyCode::Up);
    }
    assert_eq!(app.selected_genre(), "All");
    assert_eq!(app.kpis().revenue, 65.0);
}

#[test]
fn test_back_and_regenerate_keep_dataset_and_selection() {
    let dir = tempdir().unwrap();
    let path = common::write_catalog(dir.path(), "catalog.csv", common::FULL_CATALOG);
    let (mut app, _rx) = new_app();
    press(&mut app, KeyCode::Enter);
    common::open_dataset(&mut app, &path, OpenOptions::new());
    press(&mut app, KeyCode::Char('g'));
    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Right);
    assert_eq!(app.selected_genre(), "Jazz");

    press(&mut app, KeyCode::Esc);
    assert_eq!(app.session.screen, Screen::Upload);
    assert!(app.dataset.is_some());
    assert_eq!(app.selected_genre(), "Jazz");

    press(&mut app, KeyCode::Char('g'));
    assert_eq!(app.session.screen, Screen::Explore);
    assert_eq!(app.selected_genre(), "Jazz");
    assert_eq!(app.chart_index, 1);
}

#[test]
fn test_conclusion_resets_on_each_generate() {
    let dir = tempdir().unwrap();
    let path = common::write_catalog(dir.path(), "catalog.csv", common::FULL_CATALOG);
    let (mut app, _rx) = new_app();
    press(&mut app, KeyCode::Enter);
    common::open_dataset(&mut app, &path, OpenOptions::new());
    press(&mut app, KeyCode::Char('g'));

    assert!(!app.session.conclusion_visible);
    press(&mut app, KeyCode::Char('c'));
    assert!(app.session.conclusion_visible);

    press(&mut app, KeyCode::Esc);
    assert!(app.session.conclusion_visible);
    press(&mut app, KeyCode::Char('g'));
    assert!(!app.session.conclusion_visible);
}

#[test]
fn test_generate_without_dataset_stays_on_upload() {
    let (mut app, _rx) = new_app();
    press(&mut app, KeyCode::Enter);
    press(&mut app, KeyCode::Char('g'));
    assert_eq!(app.session.screen, Screen::Upload);
}

#[test]
fn test_failed_load_keeps_previous_dataset() {
    let dir = tempdir().unwrap();
    let path = common::write_catalog(dir.path(), "catalog.csv", common::FULL_CATALOG);
    let (mut app, _rx) = new_app();
    press(&mut app, KeyCode::Enter);
    common::open_dataset(&mut app, &path, OpenOptions::new());
    assert!(app.dataset.is_some());

    common::open_dataset(&mut app, &dir.path().join("missing.csv"), OpenOptions::new());
    assert!(app.load_error.is_some());
    let dataset = app.dataset.as_ref().expect("previous dataset kept");
    assert_eq!(dataset.height(), 4);
}

#[test]
fn test_partial_columns_reduce_charts() {
    let dir = tempdir().unwrap();
    let path = common::write_catalog(
        dir.path(),
        "songs.csv",
        "Top Songs,Plays by Song\nAnthem,40\nBloom,60\n",
    );
    let (mut app, _rx) = new_app();
    press(&mut app, KeyCode::Enter);
    common::open_dataset(&mut app, &path, OpenOptions::new());

    assert_eq!(app.charts, vec![ChartKind::PlaysBySong]);
    assert!(app.genre_values.is_empty());
    assert_eq!(app.selected_genre(), "All");

    press(&mut app, KeyCode::Char('g'));
    let kpis = app.kpis();
    assert_eq!(kpis.revenue, 0.0);
    assert_eq!(kpis.plays, 0.0);
}

#[test]
fn test_chart_cycling_wraps() {
    let dir = tempdir().unwrap();
    let path = common::write_catalog(dir.path(), "catalog.csv", common::FULL_CATALOG);
    let (mut app, _rx) = new_app();
    press(&mut app, KeyCode::Enter);
    common::open_dataset(&mut app, &path, OpenOptions::new());
    press(&mut app, KeyCode::Char('g'));

    assert_eq!(app.chart_index, 0);
    for _ in 0..ChartKind::ALL.len() {
        press(&mut app, KeyCode::Right);
    }
    assert_eq!(app.chart_index, 0);

    press(&mut app, KeyCode::Left);
    assert_eq!(app.chart_index, ChartKind::ALL.len() - 1);
}

#[test]
fn test_ctrl_c_exits_from_any_screen() {
    let dir = tempdir().unwrap();
    let path = common::write_catalog(dir.path(), "catalog.csv", common::FULL_CATALOG);
    let ctrl_c = AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));

    let (mut app, _rx) = new_app();
    assert!(matches!(app.event(&ctrl_c), Some(AppEvent::Exit)));

    press(&mut app, KeyCode::Enter);
    assert!(matches!(app.event(&ctrl_c), Some(AppEvent::Exit)));

    common::open_dataset(&mut app, &path, OpenOptions::new());
    press(&mut app, KeyCode::Char('g'));
    // Plain c shows the conclusion; with control it still exits
    assert!(matches!(app.event(&ctrl_c), Some(AppEvent::Exit)));
}

#[test]
fn test_browser_enter_opens_selected_file() {
    let dir = tempdir().unwrap();
    common::write_catalog(dir.path(), "catalog.csv", common::FULL_CATALOG);
    let (mut app, _rx) = new_app();
    app.browser = UploadBrowser::new(Some(dir.path().to_path_buf()));

    press(&mut app, KeyCode::Enter);
    assert_eq!(app.session.screen, Screen::Upload);

    // First row is `..`; the catalog file sits below it.
    press(&mut app, KeyCode::Down);
    press_and_follow(&mut app, KeyCode::Enter);

    let dataset = app.dataset.as_ref().expect("dataset opened via browser");
    assert_eq!(dataset.height(), 4);
    assert!(dataset.path.ends_with("catalog.csv"));
}
