// Peek: live Markdown preview panel for pull-request descriptions
// Replays a script of page events (JSON lines) through the host page, the
// preview surface and the popup, then prints the final state as JSON.

mod event_loop;
mod host;
mod panel;
mod popup;
mod route;
mod settings;
mod surface;
mod tests;

use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use peek_core::{KeyValueStore, Viewport};

use event_loop::{App, ScriptEvent};
use settings::{JsonFileStore, MemoryStore};

const START_LOCATION: &str = "about:blank";
const START_VIEWPORT: Viewport = Viewport::new(1280, 800);

#[derive(Debug, Parser)]
#[command(
    name = "peek",
    about = "Replay page events through the Markdown preview panel and print its final state",
    version
)]
struct Cli {
    /// Keep settings in memory instead of the config dir.
    #[arg(long)]
    memory: bool,

    /// Script of JSON-line events. Read from stdin when omitted.
    script: Option<PathBuf>,
}

/// Feed every script line into `app`. Blank lines and `#` comments are
/// skipped; lines that do not parse are logged and skipped.
fn replay(app: &mut App, input: impl BufRead) -> io::Result<usize> {
    let mut applied = 0;
    for (index, line) in input.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match serde_json::from_str::<ScriptEvent>(line) {
            Ok(event) => {
                app.apply(event);
                applied += 1;
            }
            Err(e) => log::warn!("line {}: skipping unreadable event: {}", index + 1, e),
        }
    }
    app.settle();
    Ok(applied)
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();

    let store: Box<dyn KeyValueStore> = if cli.memory {
        Box::new(MemoryStore::new())
    } else {
        Box::new(JsonFileStore::open())
    };
    let mut app = App::new(START_LOCATION, START_VIEWPORT, store);

    let result = match &cli.script {
        Some(path) => std::fs::File::open(path)
            .and_then(|file| replay(&mut app, BufReader::new(file))),
        None => replay(&mut app, io::stdin().lock()),
    };
    match result {
        Ok(applied) => log::info!("replayed {} event(s)", applied),
        Err(e) => {
            log::error!("Failed to read script: {}", e);
            return ExitCode::FAILURE;
        }
    }

    match serde_json::to_string_pretty(&app.snapshot()) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Failed to serialize snapshot: {}", e);
            ExitCode::FAILURE
        }
    }
}
