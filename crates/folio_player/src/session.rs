// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scripted playback session.
//!
//! A session owns the three portfolio timelines, feeds them the scripted
//! input one frame at a time and writes one JSON record per frame.

use crate::error::PlayerError;
use crate::scenes;
use crate::settings::{PlayerSettings, ScriptStep};
use folio_sequencer::{
    DriverConfig, DriverEvent, DriverState, ProgressDriver, ProgressSource, ScrollRange, Snapshot, SourceEvent,
    SyntheticCounter, TriggerBinder, ZoneEventKind,
};
use serde::Serialize;
use std::io::Write;

/// State of one driven timeline after a frame
#[derive(Debug, Clone, Serialize)]
pub struct StageRecord {
    /// Play-head in timeline seconds
    pub playhead: f32,
    /// Progress as a whole percentage
    pub percent: u32,
    /// Driver state
    pub state: DriverState,
    /// Last label at or before the play-head
    pub label: Option<String>,
    /// Driver events raised during the frame
    pub events: Vec<DriverEvent>,
    /// Visual state, if snapshots are enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Snapshot>,
}

impl StageRecord {
    fn capture(driver: &ProgressDriver, events: Vec<DriverEvent>, with_snapshot: bool) -> Self {
        Self {
            playhead: driver.playhead(),
            percent: driver.percent(),
            state: driver.state(),
            label: driver.current_label().map(|l| l.name),
            events,
            snapshot: with_snapshot.then(|| driver.snapshot()),
        }
    }
}

/// One line of player output
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FrameRecord {
    /// Frame of the loading phase
    Loading {
        /// Frame number
        frame: u64,
        /// Loading counter value
        counter: u32,
        /// Loading bar timeline
        bar: StageRecord,
    },
    /// Frame of the main phase
    Frame {
        /// Frame number
        frame: u64,
        /// Scroll offset
        scroll: f32,
        /// Master timeline
        master: StageRecord,
        /// Project showcase timeline
        showcase: StageRecord,
    },
}

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    /// Frames written
    pub frames: u64,
    /// Final master play-head
    pub playhead: f32,
    /// Final master label
    pub label: Option<String>,
    /// Final showcase label
    pub slide: Option<String>,
    /// Script steps that were rejected
    pub rejected_steps: usize,
}

struct LoadingPhase {
    bar: ProgressDriver,
    counter: SyntheticCounter,
    max_frames: u64,
}

impl LoadingPhase {
    fn advance(&mut self, dt: f32) -> Result<(), PlayerError> {
        if let Some(progress) = self.counter.on_event(&SourceEvent::Frame { dt }) {
            self.bar.scrub(progress)?;
        }
        self.bar.tick(dt);
        Ok(())
    }
}

/// Replays scripted input against the portfolio timelines
pub struct Session {
    master: TriggerBinder,
    showcase: ProgressDriver,
    loading: Option<LoadingPhase>,
    frame_time: f32,
    frame: u64,
    scroll: f32,
    emit_snapshots: bool,
    rejected_steps: usize,
}

impl Session {
    /// Build the timelines and bind their sources
    pub fn new(settings: &PlayerSettings) -> Result<Self, PlayerError> {
        let frame_time = settings.frame_time();

        let master_timeline = scenes::build_master(&settings.content, settings.seed)?;
        let zones = scenes::scene_zones(&master_timeline)?;
        let mut master_driver = ProgressDriver::new(master_timeline, settings.driver);
        for zone in zones {
            master_driver.add_zone(zone)?;
        }
        let mut master = TriggerBinder::new(master_driver);
        master.bind(ScrollRange::new(settings.scroll.start, settings.scroll.length))?;

        let mut showcase = ProgressDriver::new(
            scenes::build_showcase(&settings.content.projects)?,
            settings.showcase,
        );
        showcase.bind()?;
        if let Err(e) = showcase.go_to(&scenes::slide_label(0)) {
            tracing::debug!("Showcase has no first slide: {e}");
        }

        let loading = if settings.loading.duration > 0.0 {
            let mut bar = ProgressDriver::new(scenes::build_loading()?, DriverConfig::default());
            bar.bind()?;
            Some(LoadingPhase {
                bar,
                counter: SyntheticCounter::new(settings.loading.target, settings.loading.duration),
                max_frames: (settings.loading.duration / frame_time).ceil() as u64 + 1,
            })
        } else {
            None
        };

        tracing::info!(
            duration = master.driver().timeline().duration(),
            slides = settings.content.projects.len(),
            "Session ready"
        );

        Ok(Self {
            master,
            showcase,
            loading,
            frame_time,
            frame: 0,
            scroll: settings.scroll.start,
            emit_snapshots: settings.emit_snapshots,
            rejected_steps: 0,
        })
    }

    /// Run the loading phase, then every script step, writing one line per frame
    pub fn run(&mut self, script: &[ScriptStep], out: &mut impl Write) -> Result<SessionReport, PlayerError> {
        self.run_loading(out)?;
        for step in script {
            self.apply(step, out)?;
        }
        out.flush()?;
        Ok(self.report())
    }

    /// Summary of the session so far
    pub fn report(&self) -> SessionReport {
        SessionReport {
            frames: self.frame,
            playhead: self.master.driver().playhead(),
            label: self.master.driver().current_label().map(|l| l.name),
            slide: self.showcase.current_label().map(|l| l.name),
            rejected_steps: self.rejected_steps,
        }
    }

    fn run_loading(&mut self, out: &mut impl Write) -> Result<(), PlayerError> {
        let Some(mut phase) = self.loading.take() else {
            return Ok(());
        };
        tracing::info!("Loading");

        for _ in 0..phase.max_frames {
            phase.advance(self.frame_time)?;
            self.frame += 1;

            let events = phase.bar.take_events();
            let record = FrameRecord::Loading {
                frame: self.frame,
                counter: phase.counter.value(),
                bar: StageRecord::capture(&phase.bar, events, self.emit_snapshots),
            };
            write_record(out, &record)?;
            if phase.counter.is_finished() {
                break;
            }
        }

        phase.bar.unbind();
        tracing::info!(frames = self.frame, "Loading finished");
        Ok(())
    }

    fn apply(&mut self, step: &ScriptStep, out: &mut impl Write) -> Result<(), PlayerError> {
        tracing::debug!(?step, "Script step");
        match step {
            ScriptStep::Scroll { to, over } => {
                let frames = self.frames_for(*over).max(1);
                let from = self.scroll;
                for i in 1..=frames {
                    let t = i as f32 / frames as f32;
                    self.advance(Some(from + (to - from) * t), out)?;
                }
            }
            ScriptStep::Wait(seconds) => {
                for _ in 0..self.frames_for(*seconds) {
                    self.advance(None, out)?;
                }
            }
            ScriptStep::GoTo(label) => {
                if let Err(e) = self.master.go_to(label) {
                    tracing::warn!(%label, "Rejected seek: {e}");
                    self.rejected_steps += 1;
                }
            }
            ScriptStep::NextSlide => self.change_slide(true),
            ScriptStep::PreviousSlide => self.change_slide(false),
            ScriptStep::Teardown => {
                let master = self.master.teardown();
                let showcase = self.showcase.unbind();
                tracing::info!(master, showcase, "Torn down");
            }
        }
        Ok(())
    }

    fn change_slide(&mut self, forward: bool) {
        let result = if forward {
            self.showcase.go_to_next()
        } else {
            self.showcase.go_to_previous()
        };
        match result {
            Ok(Some(slide)) => tracing::info!(%slide, "Showing slide"),
            Ok(None) => tracing::debug!("No slides to show"),
            Err(e) => {
                tracing::warn!("Rejected slide change: {e}");
                self.rejected_steps += 1;
            }
        }
    }

    fn frames_for(&self, seconds: f32) -> u64 {
        if !seconds.is_finite() || seconds <= 0.0 {
            return 0;
        }
        (seconds / self.frame_time).round() as u64
    }

    fn advance(&mut self, scroll: Option<f32>, out: &mut impl Write) -> Result<(), PlayerError> {
        if let Some(offset) = scroll {
            self.scroll = offset;
            self.master.dispatch(&SourceEvent::Scroll { offset })?;
        }
        self.master.dispatch(&SourceEvent::Frame { dt: self.frame_time })?;
        self.showcase.tick(self.frame_time);
        self.frame += 1;

        let master_events = self.master.take_events();
        log_scene_changes(&master_events);
        let showcase_events = self.showcase.take_events();
        let record = FrameRecord::Frame {
            frame: self.frame,
            scroll: self.scroll,
            master: StageRecord::capture(self.master.driver(), master_events, self.emit_snapshots),
            showcase: StageRecord::capture(&self.showcase, showcase_events, self.emit_snapshots),
        };
        write_record(out, &record)
    }
}

fn log_scene_changes(events: &[DriverEvent]) {
    for event in events {
        if let DriverEvent::Zone(zone) = event {
            match zone.kind {
                ZoneEventKind::Enter | ZoneEventKind::EnterBack => {
                    tracing::info!(scene = %zone.zone, "Entered scene");
                }
                ZoneEventKind::Leave | ZoneEventKind::LeaveBack => {
                    tracing::debug!(scene = %zone.zone, "Left scene");
                }
            }
        }
    }
}

fn write_record(out: &mut impl Write, record: &FrameRecord) -> Result<(), PlayerError> {
    serde_json::to_writer(&mut *out, record)?;
    writeln!(out)?;
    Ok(())
}
