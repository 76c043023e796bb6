use std::time::Duration;

/// 一次拨号尝试的结果，回报给策略用于更新状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialOutcome {
    Success { elapsed: Duration },
    Failure { elapsed: Duration },
}

impl DialOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DialOutcome::Success { .. })
    }

    pub fn elapsed(&self) -> Duration {
        match self {
            DialOutcome::Success { elapsed } | DialOutcome::Failure { elapsed } => *elapsed,
        }
    }
}
