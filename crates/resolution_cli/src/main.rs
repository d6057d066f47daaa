//! CLI smoke and inspection entry point.
//!
//! # Responsibility
//! - Verify `resolution_core` linkage without the Flutter runtime.
//! - Print the resolutions stored in a database file, one per line.
//!
//! Usage: `resolution_cli [DB_PATH]`

use resolution_core::{core_version, open_db, ResolutionStore, SqliteKeyValueStore};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("resolution_core version={}", core_version());

    let Some(db_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    let conn = match open_db(&db_path) {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("failed to open `{db_path}`: {err}");
            return ExitCode::FAILURE;
        }
    };
    let store = ResolutionStore::new(SqliteKeyValueStore::new(&conn));

    // try_load so unreadable data is reported instead of shown as empty.
    let resolutions = match store.try_load() {
        Ok(resolutions) => resolutions,
        Err(err) => {
            eprintln!("stored data is unreadable: {err}");
            return ExitCode::FAILURE;
        }
    };

    println!("resolutions={}", resolutions.len());
    for resolution in &resolutions {
        let progress = resolution.progress();
        println!(
            "{}\t{}\t{}/{}\t{}",
            resolution.id,
            resolution.completion_status().as_str(),
            progress.completed,
            progress.total,
            resolution.title
        );
    }
    ExitCode::SUCCESS
}
