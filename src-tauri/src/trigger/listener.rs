//! 热键监听器
//!
//! 消费热键按下事件，并根据通知生命周期在"已武装"和"已解除"之间切换：
//!
//! - 收到 `Created`：取消按下事件订阅，通知界面打开期间热键不会触发
//! - 收到 `Dismissed`：重新订阅按下事件
//!
//! 启动时如果没有打开的通知，初始状态为已武装。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch, Mutex};

use super::actions::{ErrorReporter, FocusActions, TriggerRoute};
use super::error::{FailureClass, SetupError};
use crate::config::TriggerConfig;
use crate::events::{EventBus, NotificationEvent, ShortcutPressed};
use crate::hotkey::{SettingsStore, ShortcutBackend, ShortcutCoordinator};
use crate::notification::NotificationCenter;
use crate::task_gate::{GateOutcome, TaskGate};
use crate::utils::error::AppError;

/// 热键触发动作在任务闸门中使用的键
pub const TRIGGER_TASK_KEY: &str = "shortcut-trigger";

/// 启动重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 最大尝试次数（至少一次）
    pub attempts: u32,
    /// 两次尝试之间的间隔
    pub delay: Duration,
}

impl From<&TriggerConfig> for RetryPolicy {
    fn from(config: &TriggerConfig) -> Self {
        Self {
            attempts: config.setup_retry_attempts,
            delay: config.setup_retry_delay(),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&TriggerConfig::default())
    }
}

/// 触发分发器
///
/// 每次按下都在任务闸门下执行路由后的动作，连续快速按下时
/// 同一时刻最多只有一个动作在执行。动作结束后闸门键继续占用
/// `cooldown`，即使动作本身不需要等待，一串按下也只会触发一次。
pub struct TriggerDispatcher<A, E> {
    gate: Arc<TaskGate>,
    actions: Arc<A>,
    reporter: Arc<E>,
    cooldown: Duration,
}

impl<A, E> Clone for TriggerDispatcher<A, E> {
    fn clone(&self) -> Self {
        Self {
            gate: Arc::clone(&self.gate),
            actions: Arc::clone(&self.actions),
            reporter: Arc::clone(&self.reporter),
            cooldown: self.cooldown,
        }
    }
}

impl<A: FocusActions, E: ErrorReporter> TriggerDispatcher<A, E> {
    /// 创建新的分发器，不设冷却时间
    pub fn new(gate: Arc<TaskGate>, actions: Arc<A>, reporter: Arc<E>) -> Self {
        Self {
            gate,
            actions,
            reporter,
            cooldown: Duration::ZERO,
        }
    }

    /// 设置动作结束后继续占用闸门的时间
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// 处理一次按下
    ///
    /// 动作失败时记录日志并立即上报给用户
    pub async fn handle_press(&self) -> GateOutcome<Option<TriggerRoute>> {
        let actions = Arc::clone(&self.actions);
        let reporter = Arc::clone(&self.reporter);
        let cooldown = self.cooldown;

        let outcome = self
            .gate
            .run(TRIGGER_TASK_KEY, || async move {
                let route = actions.route();
                tracing::debug!(?route, "Handling shortcut press");

                let result = match route {
                    TriggerRoute::CompleteTutorial => actions.complete_tutorial().await,
                    TriggerRoute::StartOrResumeSession => actions.start_or_resume_session().await,
                };

                let handled = match result {
                    Ok(()) => Some(route),
                    Err(e) => {
                        let error = AppError::Action(e);
                        tracing::error!(error = %error, "Shortcut action failed");
                        reporter.report(&error.context());
                        None
                    }
                };

                if !cooldown.is_zero() {
                    tokio::time::sleep(cooldown).await;
                }
                handled
            })
            .await;

        if outcome.is_skipped() {
            tracing::debug!("Shortcut action already running, press ignored");
        }
        outcome
    }

    /// 在后台任务中处理一次按下
    pub fn dispatch(&self) {
        let dispatcher = self.clone();
        tokio::spawn(async move {
            dispatcher.handle_press().await;
        });
    }

    /// 上报启动错误
    pub fn report_setup_error(&self, error: SetupError) {
        self.reporter.report(&AppError::Setup(error).context());
    }
}

/// 热键监听器
///
/// 丢弃时停止后台任务，对应前端组件卸载时取消所有监听
pub struct ShortcutListener {
    stop_tx: Option<mpsc::Sender<()>>,
    armed_rx: watch::Receiver<bool>,
}

impl ShortcutListener {
    /// 初始化协调器并启动监听
    ///
    /// 原生注册失败时协调器仍处于已初始化状态，监听照常启动以便用户
    /// 之后更换热键，错误会直接上报给用户。其余错误原样返回。
    pub async fn start<B, S, A, E>(
        coordinator: &ShortcutCoordinator<B, S>,
        notifications: &NotificationCenter,
        dispatcher: TriggerDispatcher<A, E>,
    ) -> Result<Self, SetupError>
    where
        B: ShortcutBackend,
        S: SettingsStore,
        A: FocusActions,
        E: ErrorReporter,
    {
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(SetupError::NoRuntime);
        }

        // 先订阅，初始化期间到达的通知事件会留在队列中
        let notification_rx = notifications.subscribe();

        match coordinator.initialize().await {
            Ok(report) => {
                if let Some(e) = &report.store_error {
                    tracing::warn!(error = %e, hotkey = %report.binding, "Shortcut running without saved settings");
                }
            }
            Err(e) if coordinator.is_initialized().await => {
                let error = SetupError::from(e);
                tracing::error!(error = %error, "Shortcut registration failed, listening anyway");
                dispatcher.report_setup_error(error);
            }
            Err(e) => return Err(e.into()),
        }

        // 上一次启动尝试失败后打开的通知只能从通知中心的记录得知
        let armed = notifications.active_count().await == 0;
        let press_bus = coordinator.press_bus();
        let press_rx = armed.then(|| press_bus.subscribe());
        let (stop_tx, stop_rx) = mpsc::channel::<()>(1);
        let (armed_tx, armed_rx) = watch::channel(armed);

        tokio::spawn(listen(
            press_bus,
            press_rx,
            notification_rx,
            stop_rx,
            armed_tx,
            dispatcher,
        ));

        tracing::info!(armed, "ShortcutListener started");
        Ok(Self {
            stop_tx: Some(stop_tx),
            armed_rx,
        })
    }

    /// 启动监听，良性失败时按策略重试
    ///
    /// - `Benign`：只记录错误日志，等待后重试
    /// - `Surfaced`：记录日志并上报用户，不再重试
    pub async fn start_with_retry<B, S, A, E>(
        coordinator: &ShortcutCoordinator<B, S>,
        notifications: &NotificationCenter,
        dispatcher: TriggerDispatcher<A, E>,
        policy: RetryPolicy,
    ) -> Option<Self>
    where
        B: ShortcutBackend,
        S: SettingsStore,
        A: FocusActions,
        E: ErrorReporter,
    {
        let attempts = policy.attempts.max(1);

        for attempt in 1..=attempts {
            let error = match Self::start(coordinator, notifications, dispatcher.clone()).await {
                Ok(listener) => return Some(listener),
                Err(e) => e,
            };

            match error.class() {
                FailureClass::Benign => {
                    tracing::error!(attempt, attempts, error = %error, "Shortcut setup hit a transient failure");
                    if attempt < attempts {
                        tokio::time::sleep(policy.delay).await;
                    }
                }
                FailureClass::Surfaced => {
                    tracing::error!(attempt, error = %error, "Shortcut setup failed");
                    dispatcher.report_setup_error(error);
                    return None;
                }
            }
        }

        tracing::warn!(attempts, "Giving up on shortcut setup");
        None
    }

    /// 当前是否已武装
    pub fn armed(&self) -> bool {
        *self.armed_rx.borrow()
    }

    /// 订阅武装状态变化
    pub fn watch_armed(&self) -> watch::Receiver<bool> {
        self.armed_rx.clone()
    }

    /// 停止监听
    pub async fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(()).await;
        }
    }
}

impl Drop for ShortcutListener {
    fn drop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.try_send(());
        }
    }
}

async fn next_press(rx: &mut Option<mpsc::Receiver<ShortcutPressed>>) -> Option<ShortcutPressed> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn listen<A: FocusActions, E: ErrorReporter>(
    press_bus: Arc<EventBus<ShortcutPressed>>,
    mut press_rx: Option<mpsc::Receiver<ShortcutPressed>>,
    mut notification_rx: mpsc::Receiver<NotificationEvent>,
    mut stop_rx: mpsc::Receiver<()>,
    armed_tx: watch::Sender<bool>,
    dispatcher: TriggerDispatcher<A, E>,
) {
    loop {
        tokio::select! {
            Some(ShortcutPressed) = next_press(&mut press_rx) => {
                dispatcher.dispatch();
            }
            event = notification_rx.recv() => match event {
                Some(NotificationEvent::Created { id }) => {
                    press_rx = None;
                    armed_tx.send_replace(false);
                    tracing::debug!(id = %id, "Notification opened, shortcut disarmed");
                }
                Some(NotificationEvent::Dismissed { id }) => {
                    if press_rx.is_none() {
                        press_rx = Some(press_bus.subscribe());
                    }
                    armed_tx.send_replace(true);
                    tracing::debug!(id = %id, "Notification dismissed, shortcut re-armed");
                }
                None => {
                    tracing::debug!("Notification channel closed");
                    break;
                }
            },
            _ = stop_rx.recv() => {
                tracing::debug!("ShortcutListener stopped");
                break;
            }
        }
    }

    armed_tx.send_replace(false);
}

/// 监听器持有者
///
/// 放入 Tauri 状态中，保证监听器与应用同生命周期
#[derive(Default)]
pub struct ListenerHolder {
    listener: Mutex<Option<ShortcutListener>>,
}

impl ListenerHolder {
    /// 创建空的持有者
    pub fn new() -> Self {
        Self::default()
    }

    /// 保存监听器，替换掉的旧监听器会被停止
    pub async fn set(&self, listener: ShortcutListener) {
        if let Some(mut previous) = self.listener.lock().await.replace(listener) {
            previous.stop().await;
        }
    }

    /// 停止并移除监听器
    pub async fn stop(&self) {
        if let Some(mut listener) = self.listener.lock().await.take() {
            listener.stop().await;
        }
    }
}
