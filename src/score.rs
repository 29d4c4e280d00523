use crate::util::{mean, std_dev};

/// Final read-only figures for a finished session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Summary {
    pub average_ms: f64,
    pub std_dev_ms: f64,
    pub score: i64,
}

impl Summary {
    pub fn average_secs(&self) -> f64 {
        self.average_ms / 1000.0
    }
}

/// Fold the recorded latencies and idle penalties into a summary.
///
/// Idle misses do not get their own samples; each one adds the full
/// punishment to an existing latency, walking the recorded hits round-robin
/// (`results[i % hits]`). Carried over from the original scoring rules.
pub fn finalize(
    results: &[f64],
    hits: usize,
    misses: usize,
    idle_misses: usize,
    idle_punishment_ms: f64,
) -> Summary {
    let mut adjusted = results.to_vec();

    if hits > 0 {
        for i in 0..idle_misses {
            adjusted[i % hits] += idle_punishment_ms;
        }
    }

    Summary {
        average_ms: mean(&adjusted).unwrap_or(0.0),
        std_dev_ms: std_dev(&adjusted).unwrap_or(0.0),
        score: hits as i64 - misses as i64,
    }
}
