use crate::models::DialOutcome;

/// 拨号选择策略
///
/// 策略在组合拨号器持有的有序拨号器列表上按索引工作。
/// 有状态的策略在内部同步，`choose` 与 `report` 都只在短临界区内修改状态，
/// 拨号本身从不持有锁。
pub trait DialStrategy: Send + Sync {
    fn name(&self) -> &str;

    /// Pick the next candidate, skipping indices in `tried`.
    ///
    /// `tried` holds the indices already attempted during the current dial.
    /// Returns `None` once every candidate has been tried.
    fn choose(&self, tried: &[usize]) -> Option<usize>;

    /// Feed back the outcome of a completed attempt on `index`.
    fn report(&self, index: usize, outcome: DialOutcome);
}
