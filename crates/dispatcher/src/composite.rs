use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, warn};

use transports_core::{
    Connection, DialError, DialOutcome, DialResult, DialStrategy, Dialer, OptimizerError,
    OptimizerResult, ResolverSettings,
};

/// 组合拨号器：通过策略在多个传输之间选择
///
/// 自身实现 [`Dialer`]，因此可以作为普通传输出现在另一个组合中。
///
/// Each call to [`Dialer::dial`] tries at most `max_attempts` distinct
/// candidates. The outcome of every finished attempt, including one cut off
/// by `attempt_timeout`, is reported to the strategy. A dial future dropped
/// by the caller reports nothing.
///
/// A candidate that reports a [`Dialer::dial_budget`] (a nested composite)
/// gets that budget instead of `attempt_timeout` when it is larger, so its
/// own fallback runs to completion.
pub struct CompositeDialer {
    name: String,
    dialers: Vec<Arc<dyn Dialer>>,
    strategy: Arc<dyn DialStrategy>,
    max_attempts: usize,
    attempt_timeout: Duration,
    budget: Duration,
}

impl CompositeDialer {
    pub fn new(
        dialers: Vec<Arc<dyn Dialer>>,
        strategy: Arc<dyn DialStrategy>,
        settings: &ResolverSettings,
    ) -> OptimizerResult<Self> {
        settings.check()?;
        if dialers.is_empty() {
            return Err(OptimizerError::EmptyTransportList);
        }

        let attempt_timeout = settings.attempt_timeout();
        let max_attempts = settings.max_attempts.max(1);
        let per_attempt = dialers
            .iter()
            .filter_map(|dialer| dialer.dial_budget())
            .fold(attempt_timeout, Duration::max);
        let budget = per_attempt.saturating_mul(u32::try_from(max_attempts).unwrap_or(u32::MAX));

        Ok(Self {
            name: format!("Optimizer({})", strategy.name()),
            dialers,
            strategy,
            max_attempts,
            attempt_timeout,
            budget,
        })
    }

    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    pub fn dialers(&self) -> &[Arc<dyn Dialer>] {
        &self.dialers
    }

    pub fn len(&self) -> usize {
        self.dialers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dialers.is_empty()
    }

    fn limit_for(&self, dialer: &dyn Dialer) -> Duration {
        dialer
            .dial_budget()
            .map_or(self.attempt_timeout, |budget| budget.max(self.attempt_timeout))
    }

    async fn attempt(
        &self,
        index: usize,
        dialer: &dyn Dialer,
        address: &str,
    ) -> DialResult<Connection> {
        let limit = self.limit_for(dialer);
        let start = Instant::now();
        let result = tokio::time::timeout(limit, dialer.dial(address)).await;
        let elapsed = start.elapsed();

        match result {
            Ok(Ok(connection)) => {
                self.strategy.report(index, DialOutcome::Success { elapsed });
                debug!(
                    "{} 通过 {} 拨号成功, 耗时 {:?}",
                    self.name,
                    dialer.name(),
                    elapsed
                );
                Ok(connection)
            }
            Ok(Err(e)) => {
                self.strategy.report(index, DialOutcome::Failure { elapsed });
                warn!("{} 通过 {} 拨号失败: {}", self.name, dialer.name(), e);
                Err(e)
            }
            Err(_) => {
                self.strategy.report(index, DialOutcome::Failure { elapsed });
                warn!("{} 通过 {} 拨号超时", self.name, dialer.name());
                Err(DialError::Timeout {
                    dialer: dialer.name().to_string(),
                    after: limit,
                })
            }
        }
    }
}

#[async_trait]
impl Dialer for CompositeDialer {
    fn name(&self) -> &str {
        &self.name
    }

    fn dial_budget(&self) -> Option<Duration> {
        Some(self.budget)
    }

    async fn dial(&self, address: &str) -> DialResult<Connection> {
        let mut tried = Vec::with_capacity(self.max_attempts);
        let mut last_error = None;

        while tried.len() < self.max_attempts {
            let Some(index) = self.strategy.choose(&tried) else {
                break;
            };
            let Some(dialer) = self.dialers.get(index) else {
                warn!("{} 策略返回越界索引 {}", self.name, index);
                break;
            };
            tried.push(index);

            match self.attempt(index, dialer.as_ref(), address).await {
                Ok(connection) => return Ok(connection),
                Err(e) => last_error = Some(e),
            }
        }

        match last_error {
            None => Err(DialError::NoCandidates),
            Some(e) if tried.len() == 1 => Err(e),
            Some(e) => Err(DialError::Exhausted {
                attempts: tried.len(),
                last: Box::new(e),
            }),
        }
    }
}
