//! Named stopwatches
//!
//! Names follow `<topic>` or `<topic>:<task>`, e.g. `run`,
//! `run:initialization`, `iteration-2:symbolic-execution`. Every stopwatch
//! becomes one `TimeRecord`; the step is the order in which stopwatches
//! were first started.

use std::time::{Duration, Instant};

use equiv_storage::TimeRecord;

#[derive(Debug, Clone)]
struct Stopwatch {
    name: String,
    accumulated: Duration,
    running_since: Option<Instant>,
}

impl Stopwatch {
    fn elapsed(&self) -> Duration {
        self.accumulated
            + self
                .running_since
                .map(|since| since.elapsed())
                .unwrap_or_default()
    }
}

/// Registry of stopwatches for one run
#[derive(Debug, Clone, Default)]
pub struct Stopwatches {
    watches: Vec<Stopwatch>,
}

impl Stopwatches {
    pub fn new() -> Self {
        Self::default()
    }

    fn find_mut(&mut self, name: &str) -> Option<&mut Stopwatch> {
        self.watches.iter_mut().find(|w| w.name == name)
    }

    fn find(&self, name: &str) -> Option<&Stopwatch> {
        self.watches.iter().find(|w| w.name == name)
    }

    /// Start (or resume) a stopwatch
    pub fn start(&mut self, name: &str) {
        match self.find_mut(name) {
            Some(watch) => {
                if watch.running_since.is_none() {
                    watch.running_since = Some(Instant::now());
                }
            }
            None => self.watches.push(Stopwatch {
                name: name.to_string(),
                accumulated: Duration::ZERO,
                running_since: Some(Instant::now()),
            }),
        }
    }

    /// Stop a stopwatch and return its total time; zero if it never started
    pub fn stop(&mut self, name: &str) -> Duration {
        match self.find_mut(name) {
            Some(watch) => {
                if let Some(since) = watch.running_since.take() {
                    watch.accumulated += since.elapsed();
                }
                watch.accumulated
            }
            None => Duration::ZERO,
        }
    }

    pub fn elapsed(&self, name: &str) -> Option<Duration> {
        self.find(name).map(Stopwatch::elapsed)
    }

    pub fn is_running(&self, name: &str) -> bool {
        self.find(name)
            .is_some_and(|w| w.running_since.is_some())
    }

    /// Stop every stopwatch that is still running
    pub fn stop_all(&mut self) {
        for watch in &mut self.watches {
            if let Some(since) = watch.running_since.take() {
                watch.accumulated += since.elapsed();
            }
        }
    }

    /// One record per stopwatch; running ones are marked missing
    pub fn time_records(&self, benchmark: &str, tool: &str) -> Vec<TimeRecord> {
        self.watches
            .iter()
            .enumerate()
            .map(|(i, watch)| {
                let (topic, task) = match watch.name.split_once(':') {
                    Some((topic, task)) => (topic, task),
                    None => (watch.name.as_str(), ""),
                };
                TimeRecord {
                    benchmark: benchmark.to_string(),
                    tool: tool.to_string(),
                    topic: topic.to_string(),
                    task: task.to_string(),
                    runtime: watch.elapsed().as_secs_f64(),
                    step: i as u32 + 1,
                    is_missing: watch.running_since.is_some(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_split_topic_and_task() {
        let mut watches = Stopwatches::new();
        watches.start("run");
        watches.start("run:initialization");
        watches.stop("run:initialization");
        watches.start("iteration-1:symbolic-execution");

        let records = watches.time_records("b", "CEGAR");
        let keys: Vec<_> = records
            .iter()
            .map(|r| (r.topic.as_str(), r.task.as_str(), r.step, r.is_missing))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("run", "", 1, true),
                ("run", "initialization", 2, false),
                ("iteration-1", "symbolic-execution", 3, true),
            ]
        );
    }

    #[test]
    fn test_stop_accumulates_and_resumes() {
        let mut watches = Stopwatches::new();
        assert_eq!(watches.stop("never"), Duration::ZERO);

        watches.start("a");
        std::thread::sleep(Duration::from_millis(5));
        let first = watches.stop("a");
        assert!(first >= Duration::from_millis(5));
        assert!(!watches.is_running("a"));

        watches.start("a");
        watches.stop_all();
        assert!(watches.elapsed("a").unwrap() >= first);
    }
}
