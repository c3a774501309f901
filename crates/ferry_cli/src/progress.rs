//! Progress rendering for export runs.
//!
//! Two modes, selected by TTY detection:
//! - Interactive mode (TTY): one animated indicatif bar per project
//! - Logging mode (non-TTY): structured logging using tracing
//!
//! Both implement the library's [`ProgressSink`] protocol: the progress pool
//! polls every reporter and hands the renderer a snapshot frame; rendering
//! never blocks the export tasks.

use std::collections::HashMap;
use std::sync::Mutex;

use console::Term;
use ferry::{ProgressSink, ProgressSnapshot};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Progress renderer that handles both interactive and logging modes.
pub enum ProgressRenderer {
    /// Interactive progress bars for TTY.
    Interactive(InteractiveRenderer),
    /// Structured logging for non-TTY (CI, pipes).
    Logging(LoggingRenderer),
}

impl ProgressRenderer {
    /// Create a new renderer, auto-detecting TTY mode.
    pub fn new() -> Self {
        if Term::stdout().is_term() {
            Self::Interactive(InteractiveRenderer::new())
        } else {
            Self::Logging(LoggingRenderer::new())
        }
    }
}

impl Default for ProgressRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ProgressRenderer {
    fn render(&self, snapshots: &[ProgressSnapshot]) {
        match self {
            Self::Interactive(r) => r.render(snapshots),
            Self::Logging(r) => r.render(snapshots),
        }
    }

    fn done(&self, snapshots: &[ProgressSnapshot]) {
        match self {
            Self::Interactive(r) => r.done(snapshots),
            Self::Logging(r) => r.done(snapshots),
        }
    }
}

/// Interactive renderer using indicatif.
///
/// One bar per project, created on the first frame that mentions it, driven
/// to the reporter's tick count on every frame, finished with its final
/// label (`SKIPPED`, `FAILED: ...`, or a checkmark) once the reporter is.
pub struct InteractiveRenderer {
    multi: MultiProgress,
    bars: Mutex<HashMap<String, ProgressBar>>,
}

impl InteractiveRenderer {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
        }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:.bold.cyan} [{bar:20.cyan/blue}] {pos}/{len} {msg}")
            .expect("Invalid template")
            .progress_chars("█▓░")
    }

    fn finish_message(snapshot: &ProgressSnapshot) -> String {
        if snapshot.label.is_empty() {
            "✓ exported".to_string()
        } else {
            snapshot.label.clone()
        }
    }

    fn render(&self, snapshots: &[ProgressSnapshot]) {
        let mut bars = self.bars.lock().unwrap_or_else(|e| e.into_inner());

        for snapshot in snapshots {
            let bar = bars.entry(snapshot.name.clone()).or_insert_with(|| {
                let bar = self.multi.add(ProgressBar::new(snapshot.total));
                bar.set_style(Self::bar_style());
                bar.set_prefix(format!("{:12}", snapshot.name));
                bar
            });

            if bar.is_finished() {
                continue;
            }

            bar.set_position(snapshot.current);
            if snapshot.finished {
                bar.finish_with_message(Self::finish_message(snapshot));
            } else {
                bar.set_message(snapshot.label.clone());
            }
        }
    }

    fn done(&self, snapshots: &[ProgressSnapshot]) {
        self.render(snapshots);
    }
}

impl Default for InteractiveRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Logging renderer using tracing for structured output.
///
/// Emits one event per observed state change rather than one per poll, so
/// piped output stays readable.
pub struct LoggingRenderer {
    seen: Mutex<HashMap<String, (u64, String)>>,
}

impl LoggingRenderer {
    pub fn new() -> Self {
        Self {
            seen: Mutex::new(HashMap::new()),
        }
    }

    fn render(&self, snapshots: &[ProgressSnapshot]) {
        let mut seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());

        for snapshot in snapshots {
            let state = (snapshot.current, snapshot.label.clone());
            if seen.get(&snapshot.name) == Some(&state) {
                continue;
            }
            seen.insert(snapshot.name.clone(), state);

            tracing::info!(
                project = %snapshot.name,
                step = snapshot.current,
                total = snapshot.total,
                status = %snapshot.label,
                "progress"
            );
        }
    }

    fn done(&self, snapshots: &[ProgressSnapshot]) {
        self.render(snapshots);
        tracing::info!(projects = snapshots.len(), "all export tasks finished");
    }
}

impl Default for LoggingRenderer {
    fn default() -> Self {
        Self::new()
    }
}
