use std::fs;
use std::path::{Path, PathBuf};

use tunedash::{App, AppEvent, OpenOptions};

/// Catalog export carrying every recognized column.
pub const FULL_CATALOG: &str = "\
Genre,Revenue,Plays,Listeners,Top Songs,Plays by Song,Country,Date
Rock,10,100,50,Anthem,40,United States,2024-01-01
Pop,20,200,90,Bloom,60,Japan,2024-01-02
Rock,30,300,70,Cinders,80,Germany,2024-01-03
Jazz,5,50,20,Drift,15,France,2024-01-04
";

/// Write `contents` under `dir` and return the file's path.
pub fn write_catalog(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("Failed to write test catalog");
    path
}

/// Run an Open through the app, following the follow-up events the app
/// schedules, the way the main loop would.
pub fn open_dataset(app: &mut App, path: &Path, options: OpenOptions) {
    let mut event = Some(AppEvent::Open(path.to_path_buf(), options));
    while let Some(e) = event.take() {
        event = app.event(&e);
    }
}
