use std::fmt;
use std::str::FromStr;

use crate::OptimizerError;

/// 选择策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    First,
    Random,
    Rotate,
    Track,
    MinimizeDialDuration,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 5] = [
        StrategyKind::First,
        StrategyKind::Random,
        StrategyKind::Rotate,
        StrategyKind::Track,
        StrategyKind::MinimizeDialDuration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::First => "first",
            StrategyKind::Random => "random",
            StrategyKind::Rotate => "rotate",
            StrategyKind::Track => "track",
            StrategyKind::MinimizeDialDuration => "minimizeDialDuration",
        }
    }
}

impl FromStr for StrategyKind {
    type Err = OptimizerError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| OptimizerError::unknown_strategy(name))
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
