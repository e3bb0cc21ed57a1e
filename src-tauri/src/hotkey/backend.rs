//! 原生热键注册接口
//!
//! 协调器只通过 [`ShortcutBackend`] 与原生热键设施交互，
//! 生产环境使用 `tauri-plugin-global-shortcut`。

use std::sync::Arc;

use tauri::{AppHandle, Runtime};
use tauri_plugin_global_shortcut::{GlobalShortcutExt, Shortcut, ShortcutState};

use super::binding::ShortcutBinding;
use super::error::{HotkeyError, HotkeyResult};

/// 热键的按下/松开状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    /// 按下
    Pressed,
    /// 松开
    Released,
}

impl From<ShortcutState> for KeyState {
    fn from(state: ShortcutState) -> Self {
        match state {
            ShortcutState::Pressed => Self::Pressed,
            ShortcutState::Released => Self::Released,
        }
    }
}

/// 热键事件处理器类型
pub type HotkeyHandler = Arc<dyn Fn(KeyState) + Send + Sync>;

/// 原生热键设施
pub trait ShortcutBackend: Send + Sync {
    /// 注册热键，按下和松开时都会调用 `handler`
    fn register(&self, binding: &ShortcutBinding, handler: HotkeyHandler) -> HotkeyResult<()>;

    /// 注销热键
    ///
    /// 热键未注册时可能返回错误，调用方应视为非致命
    fn unregister(&self, binding: &ShortcutBinding) -> HotkeyResult<()>;

    /// 检查热键当前是否已注册
    fn is_registered(&self, binding: &ShortcutBinding) -> HotkeyResult<bool>;
}

/// 基于 `tauri-plugin-global-shortcut` 的实现
pub struct TauriShortcutBackend<R: Runtime> {
    app: AppHandle<R>,
}

impl<R: Runtime> TauriShortcutBackend<R> {
    /// 创建新的后端
    pub fn new(app: &AppHandle<R>) -> Self {
        Self { app: app.clone() }
    }
}

impl<R: Runtime> ShortcutBackend for TauriShortcutBackend<R> {
    fn register(&self, binding: &ShortcutBinding, handler: HotkeyHandler) -> HotkeyResult<()> {
        let shortcut = parse_shortcut(binding)?;

        self.app
            .global_shortcut()
            .on_shortcut(shortcut, move |_app, _shortcut, event| {
                handler(KeyState::from(event.state));
            })
            .map_err(|e| HotkeyError::RegistrationFailed {
                hotkey: binding.raw().to_string(),
                reason: e.to_string(),
            })?;

        tracing::info!(hotkey = %binding, "Registered global shortcut");
        Ok(())
    }

    fn unregister(&self, binding: &ShortcutBinding) -> HotkeyResult<()> {
        let shortcut = parse_shortcut(binding)?;

        self.app
            .global_shortcut()
            .unregister(shortcut)
            .map_err(|e| HotkeyError::UnregistrationFailed {
                hotkey: binding.raw().to_string(),
                reason: e.to_string(),
            })?;

        tracing::info!(hotkey = %binding, "Unregistered global shortcut");
        Ok(())
    }

    fn is_registered(&self, binding: &ShortcutBinding) -> HotkeyResult<bool> {
        let shortcut = parse_shortcut(binding)?;
        Ok(self.app.global_shortcut().is_registered(shortcut))
    }
}

/// 解析热键绑定为插件的 Shortcut
fn parse_shortcut(binding: &ShortcutBinding) -> HotkeyResult<Shortcut> {
    binding
        .raw()
        .parse::<Shortcut>()
        .map_err(|_| HotkeyError::InvalidFormat(binding.raw().to_string()))
}
