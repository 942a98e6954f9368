use anyhow::Result;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::{Duration, Instant};

use foodshare::{Analysis, AnalysisState};

const TICK: Duration = Duration::from_millis(120);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiMode {
    Auto,
    Plain,
    Pretty,
}

/// Progress reporting on stderr; stdout stays reserved for JSON output.
#[derive(Clone, Debug)]
pub struct Ui {
    pretty: bool,
}

impl Ui {
    pub fn from_args(ui_flag: Option<&str>, is_tty: bool, stdout_redirected: bool) -> Self {
        let mode = match ui_flag {
            Some("plain") => UiMode::Plain,
            Some("pretty") => UiMode::Pretty,
            _ => UiMode::Auto,
        };
        let pretty = is_tty
            && match mode {
                UiMode::Pretty => true,
                UiMode::Auto => !stdout_redirected,
                UiMode::Plain => false,
            };
        Self { pretty }
    }

    /// Report a synchronous step; it completes when the guard drops.
    pub fn stage(&self, name: &str) -> StageGuard {
        StageGuard(Some(Progress::begin(name, self.pretty)))
    }

    /// Show a busy indicator for as long as `analysis` is awaiting its result.
    pub fn follow(&self, analysis: &Analysis, name: &str) -> Result<AnalysisState> {
        let progress = Progress::begin(name, self.pretty);
        let state = loop {
            let state = analysis.wait_timeout(TICK)?;
            if state != AnalysisState::AwaitingResult {
                break state;
            }
        };
        progress.end(!matches!(state, AnalysisState::Failed(_)));
        Ok(state)
    }
}

struct Progress {
    name: String,
    started: Instant,
    spinner: Option<ProgressBar>,
}

impl Progress {
    fn begin(name: &str, pretty: bool) -> Self {
        let spinner = if pretty {
            let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
            bar.set_style(
                ProgressStyle::with_template("{spinner} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            bar.set_message(format!("{name}…"));
            bar.enable_steady_tick(TICK);
            Some(bar)
        } else {
            eprintln!("==> {name}");
            None
        };
        Self {
            name: name.to_string(),
            started: Instant::now(),
            spinner,
        }
    }

    fn end(self, ok: bool) {
        let elapsed = self.started.elapsed();
        let took = if elapsed < Duration::from_secs(1) {
            format!("{}ms", elapsed.as_millis())
        } else {
            format!("{:.2}s", elapsed.as_secs_f64())
        };
        let line = format!("{} {} ({took})", if ok { "✔" } else { "✘" }, self.name);
        match self.spinner {
            Some(bar) => bar.finish_with_message(line),
            None => eprintln!("{line}"),
        }
    }
}

pub struct StageGuard(Option<Progress>);

impl Drop for StageGuard {
    fn drop(&mut self) {
        if let Some(progress) = self.0.take() {
            progress.end(true);
        }
    }
}
