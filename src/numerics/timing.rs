#![allow(unused)]
use std::cell::RefCell;
use std::time::Duration;

/// Wall-clock breakdown of one forward pass.
#[derive(Default, Clone, Debug)]
pub struct TimingStats {
    pub assembly_times: Vec<Duration>,
    pub factorization_times: Vec<Duration>,
    pub solve_times: Vec<Duration>,
    pub total_time: Duration,
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

impl TimingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn n_frequencies(&self) -> usize {
        self.assembly_times.len()
    }

    #[cfg(feature = "timing")]
    pub fn report(&self) {
        if self.assembly_times.is_empty() {
            return;
        }

        let assembly: Duration = self.assembly_times.iter().sum();
        let factorization: Duration = self.factorization_times.iter().sum();
        let solve: Duration = self.solve_times.iter().sum();
        let overhead = self
            .total_time
            .saturating_sub(assembly + factorization + solve);
        let n = self.n_frequencies() as f64;

        tracing::info!(
            total_ms = millis(self.total_time),
            assembly_ms = millis(assembly),
            factorization_ms = millis(factorization),
            solve_ms = millis(solve),
            overhead_ms = millis(overhead),
            avg_factorization_ms = millis(factorization) / n,
            frequencies = self.n_frequencies(),
            "forward timing summary"
        );

        for (i, ((a, f), s)) in self
            .assembly_times
            .iter()
            .zip(&self.factorization_times)
            .zip(&self.solve_times)
            .enumerate()
        {
            tracing::debug!(
                frequency_index = i,
                assembly_ms = millis(*a),
                factorization_ms = millis(*f),
                solve_ms = millis(*s),
                "frequency timing"
            );
        }
    }

    #[cfg(not(feature = "timing"))]
    pub fn report(&self) {}
}

#[cfg(feature = "timing")]
thread_local! {
    static TIMING_STATS: RefCell<TimingStats> = RefCell::new(TimingStats::new());
}

#[cfg(feature = "timing")]
pub fn reset_timing() {
    TIMING_STATS.with(|stats| {
        *stats.borrow_mut() = TimingStats::new();
    });
}

#[cfg(not(feature = "timing"))]
pub fn reset_timing() {}

#[cfg(feature = "timing")]
fn record<F, R>(f: F, slot: fn(&mut TimingStats) -> &mut Vec<Duration>) -> R
where
    F: FnOnce() -> R,
{
    let start = std::time::Instant::now();
    let result = f();
    let elapsed = start.elapsed();
    TIMING_STATS.with(|stats| {
        slot(&mut stats.borrow_mut()).push(elapsed);
    });
    result
}

#[cfg(feature = "timing")]
pub fn record_assembly<F: FnOnce() -> R, R>(f: F) -> R {
    record(f, |s| &mut s.assembly_times)
}

#[cfg(feature = "timing")]
pub fn record_factorization<F: FnOnce() -> R, R>(f: F) -> R {
    record(f, |s| &mut s.factorization_times)
}

#[cfg(feature = "timing")]
pub fn record_solve<F: FnOnce() -> R, R>(f: F) -> R {
    record(f, |s| &mut s.solve_times)
}

#[cfg(not(feature = "timing"))]
pub fn record_assembly<F: FnOnce() -> R, R>(f: F) -> R {
    f()
}

#[cfg(not(feature = "timing"))]
pub fn record_factorization<F: FnOnce() -> R, R>(f: F) -> R {
    f()
}

#[cfg(not(feature = "timing"))]
pub fn record_solve<F: FnOnce() -> R, R>(f: F) -> R {
    f()
}

#[cfg(feature = "timing")]
pub fn finalize_timing(total_time: Duration) -> TimingStats {
    TIMING_STATS.with(|stats| {
        let mut s = stats.borrow_mut();
        s.total_time = total_time;
        s.clone()
    })
}

#[cfg(not(feature = "timing"))]
pub fn finalize_timing(_total_time: Duration) -> TimingStats {
    TimingStats::new()
}

pub fn finalize_and_report(total_time: Duration) {
    finalize_timing(total_time).report();
}

#[cfg(all(test, feature = "timing"))]
mod tests {
    use super::*;

    #[test]
    fn records_each_stage() {
        reset_timing();
        let x = record_assembly(|| 2);
        let y = record_factorization(|| 3);
        let z = record_solve(|| x * y);
        assert_eq!(z, 6);
        let stats = finalize_timing(Duration::from_millis(1));
        assert_eq!(stats.n_frequencies(), 1);
        assert_eq!(stats.factorization_times.len(), 1);
        assert_eq!(stats.solve_times.len(), 1);
    }
}
