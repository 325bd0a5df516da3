use crate::cues::{FileCuePlayer, DEFAULT_BLEEP, DEFAULT_BUZZ};
use crate::host::HeadlessSurface;
use crate::queue::{nanos, EventQueue};
use crate::sim::{PlayerSim, SubjectSim};
use anyhow::{Context, Result};
use clap::Parser;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info, warn};
use vidchoice_core::{ControlId, TrialResult};
use vidchoice_media::{ExtensionResolver, PreloadCache};
use vidchoice_render::PanelRenderer;
use vidchoice_timing::{HighPrecisionTimer, ManualTimer, Timer};
use vidchoice_trial::{TrialConfig, TrialController, TrialEvent};

/// Height of the response panel snapshot
const PANEL_HEIGHT: u32 = 88;

/// How long after start a premature click lands
const EARLY_CLICK_AFTER: Duration = Duration::from_millis(100);

fn parse_control(s: &str) -> Result<ControlId, String> {
    match s.to_ascii_lowercase().as_str() {
        "left" | "0" => Ok(ControlId::Left),
        "right" | "1" => Ok(ControlId::Right),
        other => Err(format!("expected left or right, got {other:?}")),
    }
}

fn parse_duration_s(s: &str) -> Result<f64, String> {
    let secs: f64 = s.parse().map_err(|e: std::num::ParseFloatError| e.to_string())?;
    if secs.is_finite() && secs > 0.0 {
        Ok(secs)
    } else {
        Err(format!("duration must be a positive number of seconds, got {s}"))
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "vidchoice",
    version,
    about = "Runs one video two-choice trial against a simulated player and participant"
)]
pub struct Args {
    /// Trial configuration as JSON; a demo trial is used when omitted
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Simulated clip duration in seconds
    #[arg(long, default_value_t = 4.0, value_parser = parse_duration_s)]
    pub duration: f64,

    /// Interval between position updates in milliseconds
    #[arg(long, default_value_t = 250, value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_ms: u64,

    /// Metadata arrives without a duration
    #[arg(long)]
    pub no_duration: bool,

    /// The player never reports anything
    #[arg(long)]
    pub stall: bool,

    /// Mean simulated reaction time in milliseconds
    #[arg(long, default_value_t = 650)]
    pub rt_mean_ms: u64,

    #[arg(long, default_value_t = 250)]
    pub rt_spread_ms: u64,

    /// Always answer with this control (left or right)
    #[arg(long, value_parser = parse_control)]
    pub respond: Option<ControlId>,

    /// Click once before the response window opens
    #[arg(long)]
    pub early_click: bool,

    /// Follow the answer with a click on the other control
    #[arg(long)]
    pub double_click: bool,

    #[arg(long)]
    pub seed: Option<u64>,

    /// Abandon the trial after this many milliseconds unless a response is required
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Wait in wall-clock time instead of advancing a virtual clock
    #[arg(long)]
    pub realtime: bool,

    /// Write a PNG of the response panel while feedback is showing
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Write the result record here as JSON
    #[arg(long)]
    pub out: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_BLEEP)]
    pub bleep: PathBuf,

    #[arg(long, default_value = DEFAULT_BUZZ)]
    pub buzz: PathBuf,
}

pub struct App {
    args: Args,
    config: TrialConfig,
}

impl App {
    pub fn new(args: Args) -> Result<Self> {
        let config = match &args.config {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("reading trial config {}", path.display()))?;
                TrialConfig::from_json(&json)
                    .with_context(|| format!("invalid trial config {}", path.display()))?
            }
            None => Self::demo_config(),
        };
        Ok(Self { args, config })
    }

    fn demo_config() -> TrialConfig {
        TrialConfig::new(["stimuli/clip01.mp4", "stimuli/clip01.webm"])
            .with_choices("dog", "cat")
            .with_expected_answer("dog")
            .with_prompt("Which animal was shown?")
    }

    pub fn run(self) -> Result<()> {
        println!("=== VIDEO CHOICE TRIAL ===");
        println!("Platform: {}", std::env::consts::OS);
        println!("Stimulus: {}", self.config.stimulus.join(", "));
        println!(
            "Clock: {}\n",
            if self.args.realtime { "wall" } else { "virtual" }
        );

        self.preload()?;
        let result = if self.args.realtime {
            self.run_trial(HighPrecisionTimer::new())?
        } else {
            self.run_trial(ManualTimer::new())?
        };

        match result {
            Some(record) => {
                let json = serde_json::to_string_pretty(&record)?;
                println!("{json}");
                if let Some(path) = &self.args.out {
                    fs::write(path, &json)
                        .with_context(|| format!("writing result to {}", path.display()))?;
                    println!("Results saved to {}", path.display());
                }
            }
            None => println!("Trial ended without a response; nothing recorded."),
        }
        Ok(())
    }

    /// Loads the first stimulus into the preload cache when it exists on disk
    fn preload(&self) -> Result<()> {
        let Some(first) = self.config.stimulus.first() else {
            return Ok(());
        };
        let path = Path::new(first);
        if !path.is_file() {
            debug!("{first} not on disk, will stream by extension");
            return Ok(());
        }
        let bytes = fs::read(path).with_context(|| format!("preloading {first}"))?;
        info!("Preloaded {first} ({} bytes)", bytes.len());
        PreloadCache::global().insert(first, bytes);
        Ok(())
    }

    fn player(&self) -> PlayerSim {
        let mut player = PlayerSim::new(self.args.duration, Duration::from_millis(self.args.tick_ms));
        player.report_duration = !self.args.no_duration;
        player.loop_playback = self.config.loop_playback;
        player.stalled = self.args.stall;
        player
    }

    fn subject(&self) -> SubjectSim {
        let seed = self.args.seed.unwrap_or_else(rand::random);
        info!("Subject seed {seed}");
        let mut subject = SubjectSim::new(
            seed,
            Duration::from_millis(self.args.rt_mean_ms),
            Duration::from_millis(self.args.rt_spread_ms),
        );
        subject.choice = self.args.respond;
        subject.double_click = self.args.double_click;
        subject
    }

    /// Drives one trial to completion and returns its record, if any
    pub fn run_trial<T: Timer<Timestamp = u64>>(&self, timer: T) -> Result<Option<TrialResult>> {
        let queue = Rc::new(RefCell::new(EventQueue::default()));
        let mut surface = HeadlessSurface::new(timer.clone(), Rc::clone(&queue));
        if let Some(path) = &self.args.snapshot {
            let renderer = PanelRenderer::new(self.config.width, PANEL_HEIGHT)?;
            surface = surface.with_snapshot(renderer, path.clone());
        }
        let cues = FileCuePlayer::new(&self.args.bleep, &self.args.buzz);

        let finished: Rc<RefCell<Option<TrialResult>>> = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&finished);
        let mut trial = TrialController::new(self.config.clone(), timer.clone(), surface, cues)?;
        trial.start(&ExtensionResolver::global(), move |record| {
            *sink.borrow_mut() = Some(record);
        })?;

        let start = timer.now();
        self.player().schedule(start, &mut queue.borrow_mut());
        let mut subject = self.subject();
        if self.args.early_click {
            let control = subject.choose();
            let due = start.saturating_add(nanos(EARLY_CLICK_AFTER));
            queue.borrow_mut().push_at(due, TrialEvent::Response(control));
        }

        let deadline = self
            .args
            .timeout_ms
            .map(|ms| start.saturating_add(nanos(Duration::from_millis(ms))));
        let mut timeout_ignored = false;
        let mut answered = false;

        loop {
            let next = queue.borrow_mut().pop();
            let Some((due, event)) = next else {
                if !trial.is_done() {
                    warn!(phase = ?trial.phase(), "no further events, abandoning trial");
                    trial.teardown();
                }
                break;
            };

            if let Some(limit) = deadline.filter(|limit| due > *limit) {
                if self.config.allows_external_timeout() {
                    timer.sleep(Duration::from_nanos(limit.saturating_sub(timer.now())));
                    warn!(phase = ?trial.phase(), "timed out after {:?}", self.args.timeout_ms);
                    trial.teardown();
                    break;
                }
                if !timeout_ignored {
                    info!("response required, ignoring timeout");
                    timeout_ignored = true;
                }
            }

            let now = timer.now();
            if due > now {
                timer.sleep(Duration::from_nanos(due - now));
            }
            trial.handle_event(event);

            if !answered && trial.surface().controls_enabled() {
                answered = true;
                let control = subject.respond(timer.now(), &mut queue.borrow_mut());
                debug!(?control, "subject will respond");
            }
            if trial.is_done() {
                break;
            }
        }
        drop(trial);

        let record = finished.borrow_mut().take();
        Ok(record)
    }
}
