use std::collections::BTreeMap;
use std::time::Instant;

/// Observer for per-frame pipeline events.
///
/// Use cases report through this trait so the CLI can print progress while
/// tests stay silent.
pub trait PipelineLogger: Send {
    /// Report frame-level progress. `total` is 0 for live sources.
    fn progress(&mut self, current: usize, total: usize);

    /// Record how long a named pipeline stage took for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a per-frame metric (e.g. subject count, volume level).
    fn metric(&mut self, name: &str, value: f64);

    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Running sum of one named series; only totals are kept.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Series {
    count: usize,
    sum: f64,
}

impl Series {
    fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Reports through the `log` facade: a progress line every
/// `throttle_frames` frames, and at the end one line per timed stage and
/// per metric, plus throughput.
pub struct StdoutPipelineLogger {
    throttle_frames: usize,
    timings: BTreeMap<String, Series>,
    metrics: BTreeMap<String, Series>,
    start_time: Instant,
    frames_seen: usize,
}

impl StdoutPipelineLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: BTreeMap::new(),
            metrics: BTreeMap::new(),
            start_time: Instant::now(),
            frames_seen: 0,
        }
    }

    fn summary_lines(&self, elapsed_ms: f64) -> Vec<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return Vec::new();
        }

        let frames = self.frames_seen;
        let mut lines = vec![format!(
            "Run summary: {frames} frames in {:.1}s",
            elapsed_ms / 1000.0
        )];
        for (stage, series) in &self.timings {
            let share = if elapsed_ms > 0.0 {
                series.sum / elapsed_ms * 100.0
            } else {
                0.0
            };
            lines.push(format!(
                "  {stage:8} {:6.1}ms/frame  {:7.0}ms  {share:4.1}%",
                series.mean(),
                series.sum
            ));
        }
        for (name, series) in &self.metrics {
            lines.push(format!("  {name:8} mean {:.1}", series.mean()));
        }
        if frames > 0 && elapsed_ms > 0.0 {
            lines.push(format!(
                "  {:.1} frames/s",
                frames as f64 / (elapsed_ms / 1000.0)
            ));
        }
        lines
    }

    #[cfg(test)]
    pub(crate) fn timing_count(&self, stage: &str) -> usize {
        self.timings.get(stage).map_or(0, |s| s.count)
    }

    /// Mean of a recorded metric, `None` if it was never reported.
    #[cfg(test)]
    pub(crate) fn metric_mean(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).map(Series::mean)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.frames_seen = self.frames_seen.max(current);
        let due = current % self.throttle_frames == 0;
        if total == 0 {
            if due {
                log::info!("{current} frames");
            }
        } else if due || current == total {
            let pct = current as f64 / total as f64 * 100.0;
            log::info!("{current}/{total} frames ({pct:.0}%)");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics.entry(name.to_string()).or_default().push(value);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        let lines = self.summary_lines(self.start_time.elapsed().as_secs_f64() * 1000.0);
        if !lines.is_empty() {
            log::info!("{}", lines.join("\n"));
        }
    }
}
