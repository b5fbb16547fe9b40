// SPDX-License-Identifier: MIT OR Apache-2.0
//! Folio Player - headless portfolio timeline player
//!
//! Replays scripted scroll and navigation input against the portfolio scenes:
//! - Loading counter
//! - Scroll-scrubbed master timeline (hero, welcome, about, skills, projects)
//! - Project showcase slides
//!
//! ## Output
//!
//! One JSON record per frame on stdout. Logs go to stderr.
//!
//! ```text
//! folio_player [settings.ron]
//! folio_player --init settings.ron
//! ```

mod error;
mod scenes;
mod session;
mod settings;

use error::PlayerError;
use session::Session;
use settings::PlayerSettings;
use std::path::Path;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("folio_player=info,folio_sequencer=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting Folio Player v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run() {
        tracing::error!("Player failed: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), PlayerError> {
    let mut args = std::env::args().skip(1);
    let settings = match args.next().as_deref() {
        Some("--init") => {
            let path = args.next().unwrap_or_else(|| "folio_player.ron".to_string());
            PlayerSettings::default().save(Path::new(&path))?;
            tracing::info!(%path, "Wrote default settings");
            return Ok(());
        }
        Some(path) => PlayerSettings::load(Path::new(path))?,
        None => {
            tracing::info!("No settings file given, using defaults");
            PlayerSettings::default()
        }
    };

    let mut session = Session::new(&settings)?;
    let stdout = std::io::stdout();
    let mut out = std::io::BufWriter::new(stdout.lock());
    let report = session.run(&settings.script, &mut out)?;

    tracing::info!(
        frames = report.frames,
        playhead = report.playhead,
        label = report.label.as_deref().unwrap_or("-"),
        slide = report.slide.as_deref().unwrap_or("-"),
        rejected = report.rejected_steps,
        "Playback finished"
    );
    Ok(())
}
