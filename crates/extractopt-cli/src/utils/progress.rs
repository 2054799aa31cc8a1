use extractopt::engine::progress::{Progress, ProgressCallback};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

/// Renders pipeline progress on stderr: a spinner per phase, switching to a bar
/// while trees are trained or grid points evaluated.
#[derive(Clone)]
pub struct CliProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr())
    }

    /// A handler whose bar is never drawn, for `--quiet` runs.
    pub fn hidden() -> Self {
        Self::with_draw_target(ProgressDrawTarget::hidden())
    }

    fn with_draw_target(target: ProgressDrawTarget) -> Self {
        let pb = ProgressBar::with_draw_target(Some(0), target).with_style(spinner_style());
        pb.finish_and_clear();
        Self {
            pb: Arc::new(Mutex::new(pb)),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let shared = self.pb.clone();
        Box::new(move |event: Progress| match shared.lock() {
            Ok(pb) => apply(&pb, event),
            Err(_) => warn!("Progress bar mutex was poisoned. Cannot update progress."),
        })
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies one pipeline event to the bar. The current phase name is kept as the
/// bar message so the counting bar and the final tick both show it.
fn apply(pb: &ProgressBar, event: Progress) {
    match event {
        Progress::PhaseStart { name } => {
            pb.reset();
            pb.set_length(0);
            pb.set_style(spinner_style());
            pb.set_message(name);
            pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
        }
        Progress::TaskStart { total_steps } => {
            pb.disable_steady_tick();
            pb.set_length(total_steps);
            pb.set_position(0);
            pb.set_style(bar_style());
        }
        Progress::TaskIncrement => pb.inc(1),
        Progress::TaskFinish => {
            if let Some(total) = pb.length() {
                pb.set_position(total);
            }
        }
        Progress::PhaseFinish => {
            pb.disable_steady_tick();
            let phase = pb.message();
            pb.finish_with_message(format!("✓ {phase}"));
        }
        Progress::Message(text) => pb.println(format!("  {text}")),
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {msg}")
        .expect("Failed to create spinner style template")
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{msg:<22} [{bar:40.cyan/blue}] {pos}/{len} ({elapsed_secs})")
        .expect("Failed to create bar style template")
        .with_key(
            "elapsed_secs",
            |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                let _ = write!(w, "{:.1}s", state.elapsed().as_secs_f64());
            },
        )
        .progress_chars("=>-")
}
