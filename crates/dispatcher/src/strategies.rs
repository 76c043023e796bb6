use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rand::Rng;
use tracing::debug;

use transports_core::{DialOutcome, DialStrategy, OptimizerResult, ResolverSettings, StrategyKind};

fn untried(len: usize, tried: &[usize]) -> impl Iterator<Item = usize> + '_ {
    (0..len).filter(move |index| !tried.contains(index))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Map a strategy name onto its policy over `dialer_count` candidates.
pub fn build_strategy(
    name: &str,
    dialer_count: usize,
    settings: &ResolverSettings,
) -> OptimizerResult<Arc<dyn DialStrategy>> {
    settings.check()?;
    let kind: StrategyKind = name.parse()?;
    let strategy: Arc<dyn DialStrategy> = match kind {
        StrategyKind::First => Arc::new(FirstStrategy::new(dialer_count)),
        StrategyKind::Random => Arc::new(RandomStrategy::new(dialer_count)),
        StrategyKind::Rotate => Arc::new(RotateStrategy::new(dialer_count)),
        StrategyKind::Track => Arc::new(TrackStrategy::new(dialer_count)),
        StrategyKind::MinimizeDialDuration => Arc::new(MinimizeDialDurationStrategy::new(
            dialer_count,
            settings.latency_smoothing,
            settings.failure_penalty(),
        )),
    };
    debug!("构建选择策略: {} (传输数量: {})", kind, dialer_count);
    Ok(strategy)
}

pub struct FirstStrategy {
    len: usize,
}

impl FirstStrategy {
    pub fn new(len: usize) -> Self {
        Self { len }
    }
}

impl DialStrategy for FirstStrategy {
    fn name(&self) -> &str {
        StrategyKind::First.as_str()
    }

    fn choose(&self, tried: &[usize]) -> Option<usize> {
        untried(self.len, tried).next()
    }

    fn report(&self, _index: usize, _outcome: DialOutcome) {}
}

pub struct RandomStrategy {
    len: usize,
}

impl RandomStrategy {
    pub fn new(len: usize) -> Self {
        Self { len }
    }
}

impl DialStrategy for RandomStrategy {
    fn name(&self) -> &str {
        StrategyKind::Random.as_str()
    }

    fn choose(&self, tried: &[usize]) -> Option<usize> {
        let candidates: Vec<usize> = untried(self.len, tried).collect();
        if candidates.is_empty() {
            return None;
        }
        let index = candidates[rand::rng().random_range(0..candidates.len())];
        debug!("随机策略选择传输: {}/{}", index, self.len);
        Some(index)
    }

    fn report(&self, _index: usize, _outcome: DialOutcome) {}
}

/// Round-robin over a shared cursor advanced on every choice.
pub struct RotateStrategy {
    len: usize,
    cursor: AtomicUsize,
}

impl RotateStrategy {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            cursor: AtomicUsize::new(0),
        }
    }

    fn advance(&self) -> usize {
        let len = self.len;
        // The closure always returns Some, so both arms carry the previous value.
        self.cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                Some((current + 1) % len)
            })
            .unwrap_or_else(|current| current)
    }
}

impl DialStrategy for RotateStrategy {
    fn name(&self) -> &str {
        StrategyKind::Rotate.as_str()
    }

    fn choose(&self, tried: &[usize]) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        for _ in 0..self.len {
            let index = self.advance();
            if !tried.contains(&index) {
                debug!("轮询策略选择传输: {}/{}", index, self.len);
                return Some(index);
            }
        }
        None
    }

    fn report(&self, _index: usize, _outcome: DialOutcome) {}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackRecord {
    pub successes: u64,
    pub failures: u64,
}

impl TrackRecord {
    /// Laplace-smoothed success rate; an untried dialer scores 0.5.
    pub fn score(&self) -> f64 {
        (self.successes as f64 + 1.0) / ((self.successes + self.failures) as f64 + 2.0)
    }
}

/// Weighted-random choice biased toward dialers with a better success history.
pub struct TrackStrategy {
    records: Mutex<Vec<TrackRecord>>,
}

impl TrackStrategy {
    pub fn new(len: usize) -> Self {
        Self {
            records: Mutex::new(vec![TrackRecord::default(); len]),
        }
    }

    pub fn record(&self, index: usize) -> Option<TrackRecord> {
        lock(&self.records).get(index).copied()
    }
}

impl DialStrategy for TrackStrategy {
    fn name(&self) -> &str {
        StrategyKind::Track.as_str()
    }

    fn choose(&self, tried: &[usize]) -> Option<usize> {
        let weighted: Vec<(usize, f64)> = {
            let records = lock(&self.records);
            untried(records.len(), tried)
                .map(|index| (index, records[index].score()))
                .collect()
        };
        let (last, _) = *weighted.last()?;

        let total: f64 = weighted.iter().map(|(_, score)| score).sum();
        let mut draw = rand::rng().random::<f64>() * total;
        for (index, score) in &weighted {
            if draw < *score {
                debug!("跟踪策略选择传输: {} (得分: {:.3})", index, score);
                return Some(*index);
            }
            draw -= score;
        }
        Some(last)
    }

    fn report(&self, index: usize, outcome: DialOutcome) {
        let mut records = lock(&self.records);
        if let Some(record) = records.get_mut(index) {
            if outcome.is_success() {
                record.successes += 1;
            } else {
                record.failures += 1;
            }
        }
    }
}

/// Lowest smoothed dial latency wins; dialers without a sample go first.
pub struct MinimizeDialDurationStrategy {
    smoothing: f64,
    failure_penalty: Duration,
    estimates: Mutex<Vec<Option<Duration>>>,
}

impl MinimizeDialDurationStrategy {
    pub fn new(len: usize, smoothing: f64, failure_penalty: Duration) -> Self {
        Self {
            smoothing,
            failure_penalty,
            estimates: Mutex::new(vec![None; len]),
        }
    }

    pub fn estimate(&self, index: usize) -> Option<Duration> {
        lock(&self.estimates).get(index).copied().flatten()
    }

    /// Exponential smoothing of `previous` toward `sample`. A weight outside
    /// (0, 1] that yields no representable duration keeps the raw sample.
    fn blend(&self, previous: Duration, sample: Duration) -> Duration {
        let secs = previous.as_secs_f64() * (1.0 - self.smoothing)
            + sample.as_secs_f64() * self.smoothing;
        Duration::try_from_secs_f64(secs).unwrap_or(sample)
    }
}

impl DialStrategy for MinimizeDialDurationStrategy {
    fn name(&self) -> &str {
        StrategyKind::MinimizeDialDuration.as_str()
    }

    fn choose(&self, tried: &[usize]) -> Option<usize> {
        let estimates = lock(&self.estimates);
        let candidates = untried(estimates.len(), tried);

        // `None` orders before any `Some`, so untried dialers are explored first.
        let index = candidates.min_by_key(|index| estimates[*index])?;
        debug!(
            "最短拨号耗时策略选择传输: {} (估计耗时: {:?})",
            index, estimates[index]
        );
        Some(index)
    }

    fn report(&self, index: usize, outcome: DialOutcome) {
        let sample = match outcome {
            DialOutcome::Success { elapsed } => elapsed,
            DialOutcome::Failure { elapsed } => elapsed.max(self.failure_penalty),
        };

        let mut estimates = lock(&self.estimates);
        if let Some(estimate) = estimates.get_mut(index) {
            *estimate = Some(match *estimate {
                None => sample,
                Some(previous) => self.blend(previous, sample),
            });
        }
    }
}
