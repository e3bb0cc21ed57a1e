//! 全局热键协调器
//!
//! 负责唯一一个全局热键的注册、持久化与按下事件发布。
//!
//! 所有操作都在同一把异步锁下串行执行，读取与写入 [`RegistrationState`]
//! 之间不会被其他操作插入。

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{mpsc, Mutex};

use super::backend::{HotkeyHandler, KeyState, ShortcutBackend};
use super::binding::ShortcutBinding;
use super::error::{HotkeyError, HotkeyResult, StoreError, StoreResult};
use super::store::{SettingsStore, SHORTCUT_STORE_KEY};
use crate::events::{EventBus, ShortcutPressed};

/// 协调器生命周期阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorPhase {
    /// 尚未初始化，或已调用 `unregister_all`
    Uninitialized,
    /// 已加载绑定并完成注册
    Registered,
    /// 存储不可用，使用默认绑定运行
    Degraded,
}

/// 注册状态
///
/// 只由 [`ShortcutCoordinator`] 持有和修改
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationState {
    /// 当前生效的绑定
    pub current: ShortcutBinding,
    /// 是否已完成初始化
    pub initialized: bool,
    /// 是否因存储失败而使用默认绑定
    pub degraded: bool,
}

impl RegistrationState {
    fn new(current: ShortcutBinding) -> Self {
        Self {
            current,
            initialized: false,
            degraded: false,
        }
    }

    /// 获取生命周期阶段
    pub fn phase(&self) -> CoordinatorPhase {
        match (self.initialized, self.degraded) {
            (false, _) => CoordinatorPhase::Uninitialized,
            (true, false) => CoordinatorPhase::Registered,
            (true, true) => CoordinatorPhase::Degraded,
        }
    }
}

/// 注册前的重新同步结果
///
/// 原生设施的注册状态可能与协调器记录的状态不一致（例如上次进程残留），
/// 注册前会检查旧绑定和新绑定，已注册的先注销。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResyncReport {
    /// 被清理的残留注册
    pub stale_cleared: Vec<ShortcutBinding>,
}

/// 初始化结果
#[derive(Debug, Clone, PartialEq)]
pub struct InitReport {
    /// 生效的绑定
    pub binding: ShortcutBinding,
    /// 加载存储时的错误（存在时协调器处于降级模式）
    pub store_error: Option<StoreError>,
    /// 注册前被清理的残留注册
    pub stale_cleared: Vec<ShortcutBinding>,
    /// 调用前是否已经初始化
    pub already_initialized: bool,
}

impl InitReport {
    /// 检查是否处于降级模式
    pub fn is_degraded(&self) -> bool {
        self.store_error.is_some()
    }
}

/// 更新结果
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// 新绑定与当前绑定相同，未做任何操作
    Unchanged,
    /// 已切换到新绑定
    Updated {
        /// 新绑定是否已写入存储
        persisted: bool,
        /// 注册前被清理的残留注册
        stale_cleared: Vec<ShortcutBinding>,
    },
}

/// 全局热键协调器
///
/// # Examples
///
/// ```ignore
/// use focuskeeper_lib::hotkey::{ShortcutCoordinator, TauriSettingsStore, TauriShortcutBackend};
///
/// let coordinator = ShortcutCoordinator::new(
///     TauriShortcutBackend::new(app.handle()),
///     TauriSettingsStore::new(app.handle(), "settings.json"),
/// );
/// coordinator.initialize().await?;
/// let mut presses = coordinator.subscribe();
/// ```
pub struct ShortcutCoordinator<B, S> {
    backend: B,
    store: S,
    store_key: String,
    default_binding: ShortcutBinding,
    state: Mutex<RegistrationState>,
    press_bus: Arc<EventBus<ShortcutPressed>>,
}

impl<B: ShortcutBackend, S: SettingsStore> ShortcutCoordinator<B, S> {
    /// 创建新的协调器，使用默认存储键和默认绑定
    pub fn new(backend: B, store: S) -> Self {
        let default_binding = ShortcutBinding::default();
        Self {
            backend,
            store,
            store_key: SHORTCUT_STORE_KEY.to_string(),
            state: Mutex::new(RegistrationState::new(default_binding.clone())),
            default_binding,
            press_bus: Arc::new(EventBus::new()),
        }
    }

    /// 设置存储键
    pub fn with_store_key(mut self, key: impl Into<String>) -> Self {
        self.store_key = key.into();
        self
    }

    /// 设置默认绑定
    pub fn with_default_binding(mut self, binding: ShortcutBinding) -> Self {
        self.state.get_mut().current = binding.clone();
        self.default_binding = binding;
        self
    }

    /// 获取默认绑定
    pub fn default_binding(&self) -> &ShortcutBinding {
        &self.default_binding
    }

    /// 订阅热键按下事件
    ///
    /// 丢弃返回的接收器即取消订阅
    pub fn subscribe(&self) -> mpsc::Receiver<ShortcutPressed> {
        self.press_bus.subscribe()
    }

    /// 获取按下事件总线
    pub fn press_bus(&self) -> Arc<EventBus<ShortcutPressed>> {
        Arc::clone(&self.press_bus)
    }

    /// 获取生命周期阶段
    pub async fn phase(&self) -> CoordinatorPhase {
        self.state.lock().await.phase()
    }

    /// 检查是否已初始化
    pub async fn is_initialized(&self) -> bool {
        self.state.lock().await.initialized
    }

    /// 从存储加载绑定
    ///
    /// 键不存在、值无效或存储出错时回退到默认绑定；内存状态随之更新。
    /// 不会返回错误。
    pub async fn load_shortcut(&self) -> ShortcutBinding {
        let mut state = self.state.lock().await;

        let binding = match self.read_binding() {
            Ok(Some(binding)) => binding,
            Ok(None) => {
                tracing::debug!("No saved shortcut, using default");
                self.default_binding.clone()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load shortcut, using default");
                self.default_binding.clone()
            }
        };

        state.current = binding.clone();
        binding
    }

    /// 初始化协调器
    ///
    /// 幂等：已初始化时直接返回。依次打开存储、加载绑定、注册热键。
    ///
    /// - 存储被锁定时返回 [`StoreError::Locked`]，不标记为已初始化，稍后可重试
    /// - 其他存储错误进入降级模式：使用默认绑定并照常注册
    /// - 原生注册失败时返回错误，但仍标记为已初始化，以便之后通过更新修复
    pub async fn initialize(&self) -> HotkeyResult<InitReport> {
        let mut state = self.state.lock().await;

        if state.initialized {
            return Ok(InitReport {
                binding: state.current.clone(),
                store_error: None,
                stale_cleared: Vec::new(),
                already_initialized: true,
            });
        }

        let loaded = self.store.open().and_then(|()| self.read_binding());
        let (binding, store_error) = match loaded {
            Ok(Some(binding)) => (binding, None),
            Ok(None) => (self.default_binding.clone(), None),
            Err(e) if e.is_transient() => {
                tracing::warn!(error = %e, "Settings store is busy, initialization deferred");
                return Err(e.into());
            }
            Err(e) => {
                tracing::warn!(error = %e, "Settings store unavailable, falling back to default shortcut");
                (self.default_binding.clone(), Some(e))
            }
        };

        state.current = binding.clone();
        state.degraded = store_error.is_some();

        let registration = self.register_binding(None, &binding);
        state.initialized = true;

        let resync = registration.inspect_err(|e| {
            tracing::error!(hotkey = %binding, error = %e, "Failed to register global shortcut");
        })?;

        tracing::info!(
            hotkey = %binding,
            degraded = state.degraded,
            "Shortcut coordinator initialized"
        );

        Ok(InitReport {
            binding,
            store_error,
            stale_cleared: resync.stale_cleared,
            already_initialized: false,
        })
    }

    /// 更新全局热键
    ///
    /// 依次执行：注销旧绑定（尽力而为）、持久化新绑定、注册新绑定。
    /// 新绑定注册失败时恢复旧绑定的注册和存储值。
    pub async fn update_shortcut(&self, binding: ShortcutBinding) -> HotkeyResult<UpdateOutcome> {
        let mut state = self.state.lock().await;

        if !state.initialized {
            tracing::error!(hotkey = %binding, "Cannot update shortcut before initialization");
            return Err(HotkeyError::NotInitialized);
        }

        if state.current == binding {
            tracing::debug!(hotkey = %binding, "Shortcut unchanged");
            return Ok(UpdateOutcome::Unchanged);
        }

        let previous = state.current.clone();

        if let Err(e) = self.backend.unregister(&previous) {
            tracing::warn!(hotkey = %previous, error = %e, "Failed to unregister previous shortcut");
        }

        let persisted = match self.persist(&binding) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(hotkey = %binding, error = %e, "Failed to persist shortcut");
                false
            }
        };

        match self.register_binding(Some(&previous), &binding) {
            Ok(resync) => {
                state.current = binding.clone();
                if persisted {
                    state.degraded = false;
                }

                tracing::info!(from = %previous, to = %binding, persisted, "Shortcut updated");
                Ok(UpdateOutcome::Updated {
                    persisted,
                    stale_cleared: resync.stale_cleared,
                })
            }
            Err(e) => {
                tracing::error!(hotkey = %binding, error = %e, "Failed to register new shortcut, restoring previous");
                self.restore(&previous, persisted);
                Err(e)
            }
        }
    }

    /// 恢复默认绑定
    pub async fn reset_to_default(&self) -> HotkeyResult<UpdateOutcome> {
        self.update_shortcut(self.default_binding.clone()).await
    }

    /// 获取当前绑定
    ///
    /// 初始化之前调用会记录警告并返回默认绑定
    pub async fn current_shortcut(&self) -> ShortcutBinding {
        let state = self.state.lock().await;

        if !state.initialized {
            tracing::warn!("Shortcut requested before initialization, returning default");
            return self.default_binding.clone();
        }

        state.current.clone()
    }

    /// 注销当前绑定并回到未初始化状态
    pub async fn unregister_all(&self) {
        let mut state = self.state.lock().await;

        if state.initialized {
            if let Err(e) = self.backend.unregister(&state.current) {
                tracing::warn!(hotkey = %state.current, error = %e, "Failed to unregister shortcut");
            }
        }

        state.initialized = false;
        state.degraded = false;
        tracing::info!("Shortcut coordinator reset");
    }

    fn read_binding(&self) -> StoreResult<Option<ShortcutBinding>> {
        let Some(value) = self.store.get(&self.store_key)? else {
            return Ok(None);
        };

        match serde_json::from_value::<ShortcutBinding>(value) {
            Ok(binding) => Ok(Some(binding)),
            Err(e) => {
                tracing::warn!(key = %self.store_key, error = %e, "Ignoring invalid saved shortcut");
                Ok(None)
            }
        }
    }

    fn persist(&self, binding: &ShortcutBinding) -> StoreResult<()> {
        self.store
            .set(&self.store_key, Value::String(binding.raw().to_string()))?;
        self.store.save()
    }

    /// 重新同步后注册
    ///
    /// 顺序固定：检查旧绑定、检查新绑定、注册新绑定
    fn register_binding(
        &self,
        previous: Option<&ShortcutBinding>,
        candidate: &ShortcutBinding,
    ) -> HotkeyResult<ResyncReport> {
        let mut report = ResyncReport::default();

        let previous = previous.filter(|p| *p != candidate);
        for binding in previous.into_iter().chain(std::iter::once(candidate)) {
            match self.backend.is_registered(binding) {
                Ok(true) => match self.backend.unregister(binding) {
                    Ok(()) => {
                        tracing::warn!(hotkey = %binding, "Cleared stale shortcut registration");
                        report.stale_cleared.push(binding.clone());
                    }
                    Err(e) => {
                        tracing::warn!(hotkey = %binding, error = %e, "Failed to clear stale registration");
                    }
                },
                Ok(false) => {}
                Err(e) => {
                    tracing::debug!(hotkey = %binding, error = %e, "Could not query registration");
                }
            }
        }

        self.backend.register(candidate, self.press_handler())?;
        Ok(report)
    }

    fn restore(&self, previous: &ShortcutBinding, persisted_new: bool) {
        if let Err(e) = self.register_binding(None, previous) {
            tracing::error!(hotkey = %previous, error = %e, "Failed to restore previous shortcut");
        }

        if persisted_new {
            if let Err(e) = self.persist(previous) {
                tracing::warn!(hotkey = %previous, error = %e, "Failed to restore saved shortcut");
            }
        }
    }

    fn press_handler(&self) -> HotkeyHandler {
        let bus = Arc::clone(&self.press_bus);
        Arc::new(move |state| {
            if state == KeyState::Pressed {
                let listeners = bus.emit(ShortcutPressed);
                tracing::debug!(listeners, "Global shortcut pressed");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_state_phase() {
        let mut state = RegistrationState::new(ShortcutBinding::default());
        assert_eq!(state.phase(), CoordinatorPhase::Uninitialized);

        state.initialized = true;
        assert_eq!(state.phase(), CoordinatorPhase::Registered);

        state.degraded = true;
        assert_eq!(state.phase(), CoordinatorPhase::Degraded);

        state.initialized = false;
        assert_eq!(state.phase(), CoordinatorPhase::Uninitialized);
    }

    #[test]
    fn test_init_report_degraded() {
        let report = InitReport {
            binding: ShortcutBinding::default(),
            store_error: Some(StoreError::NotOpen),
            stale_cleared: Vec::new(),
            already_initialized: false,
        };
        assert!(report.is_degraded());
    }
}
