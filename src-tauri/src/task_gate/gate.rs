//! 任务闸门实现

use std::collections::HashSet;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

/// 闸门释放策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatePolicy {
    /// 操作结束（成功、失败、panic 或被取消）后释放键，允许之后再次执行
    #[default]
    SingleFlight,
    /// 键在闸门生命周期内只执行一次，永不释放
    OneShot,
}

/// 一次调用的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome<T> {
    /// 本次调用执行了操作，携带操作的返回值
    Completed(T),
    /// 同一个键已被占用，操作未执行
    Skipped,
}

impl<T> GateOutcome<T> {
    /// 检查操作是否被执行
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// 检查操作是否被跳过
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }

    /// 取出操作的返回值
    pub fn into_completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Skipped => None,
        }
    }
}

/// 单飞任务闸门
///
/// 检查与标记在同一个同步临界区内完成，中间没有挂起点，
/// 因此多个任务同时调用 [`TaskGate::run`] 时只有第一个会执行操作。
#[derive(Debug, Default)]
pub struct TaskGate {
    running: Mutex<HashSet<String>>,
    policy: GatePolicy,
}

impl TaskGate {
    /// 创建使用 [`GatePolicy::SingleFlight`] 的闸门
    pub fn new() -> Self {
        Self::with_policy(GatePolicy::SingleFlight)
    }

    /// 使用指定策略创建闸门
    pub fn with_policy(policy: GatePolicy) -> Self {
        Self {
            running: Mutex::new(HashSet::new()),
            policy,
        }
    }

    /// 获取释放策略
    pub fn policy(&self) -> GatePolicy {
        self.policy
    }

    /// 在闸门保护下执行操作
    ///
    /// 如果 `key` 已被标记为运行中，立即返回 [`GateOutcome::Skipped`]，
    /// 不调用 `operation` 也不等待任何东西。
    ///
    /// 操作的错误不会被吞掉：返回值原样放在 [`GateOutcome::Completed`] 中。
    ///
    /// # Examples
    ///
    /// ```
    /// use focuskeeper_lib::task_gate::{GatePolicy, TaskGate};
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let gate = TaskGate::with_policy(GatePolicy::OneShot);
    /// assert!(gate.run("intro", || async {}).await.is_completed());
    /// assert!(gate.run("intro", || async {}).await.is_skipped());
    /// # }
    /// ```
    pub async fn run<F, Fut, T>(&self, key: &str, operation: F) -> GateOutcome<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        if !self.try_acquire(key) {
            tracing::debug!(key = %key, "Task already running, skipping");
            return GateOutcome::Skipped;
        }

        // 守卫在 drop 时释放键，覆盖 panic 和 future 被取消的情况
        let _guard = RunningGuard { gate: self, key };

        let output = operation().await;

        // 同一轮调度中发起的调用必须看到键仍被占用，即使操作首次 poll 就完成
        tokio::task::yield_now().await;

        GateOutcome::Completed(output)
    }

    /// 检查键是否被标记为运行中
    pub fn is_running(&self, key: &str) -> bool {
        self.lock().contains(key)
    }

    /// 当前被标记的键数量
    pub fn running_count(&self) -> usize {
        self.lock().len()
    }

    fn try_acquire(&self, key: &str) -> bool {
        self.lock().insert(key.to_string())
    }

    fn release(&self, key: &str) {
        self.lock().remove(key);
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        // 临界区内不会 panic，中毒时直接沿用内部数据
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct RunningGuard<'a> {
    gate: &'a TaskGate,
    key: &'a str,
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        if self.gate.policy == GatePolicy::SingleFlight {
            self.gate.release(self.key);
        }
    }
}
