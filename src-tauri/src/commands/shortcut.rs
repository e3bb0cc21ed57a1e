//! 全局热键相关的 Tauri 命令

use std::sync::Arc;

use serde::Serialize;
use tauri::{command, AppHandle, Manager, Runtime};

use crate::hotkey::{ShortcutBinding, TauriShortcutCoordinator, UpdateOutcome};
use crate::utils::error::AppError;

/// 返回给前端的热键信息
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortcutInfo {
    /// 原始绑定字符串，例如 `CommandOrControl+E`
    pub shortcut: String,
    /// 逐个按键的显示符号
    pub display_parts: Vec<String>,
    /// 拼接后的显示文本
    pub display: String,
    /// 是否为默认绑定
    pub is_default: bool,
}

impl ShortcutInfo {
    /// 生成热键信息，`default` 为协调器当前使用的默认绑定
    pub fn new(binding: &ShortcutBinding, default: &ShortcutBinding) -> Self {
        Self {
            shortcut: binding.raw().to_string(),
            display_parts: binding.display_parts(),
            display: binding.display(),
            is_default: binding == default,
        }
    }
}

fn coordinator<R: Runtime>(app: &AppHandle<R>) -> Result<Arc<TauriShortcutCoordinator<R>>, String> {
    app.try_state::<Arc<TauriShortcutCoordinator<R>>>()
        .map(|state| Arc::clone(&state))
        .ok_or_else(|| "Shortcut coordinator not available".to_string())
}

fn user_error(error: impl Into<AppError>) -> String {
    error.into().user_message()
}

/// 获取当前热键
#[command]
pub async fn get_shortcut<R: Runtime>(app: AppHandle<R>) -> Result<String, String> {
    let coordinator = coordinator(&app)?;
    Ok(coordinator.current_shortcut().await.raw().to_string())
}

/// 获取当前热键的显示信息
#[command]
pub async fn get_shortcut_display<R: Runtime>(app: AppHandle<R>) -> Result<ShortcutInfo, String> {
    let coordinator = coordinator(&app)?;
    let binding = coordinator.current_shortcut().await;
    Ok(ShortcutInfo::new(&binding, coordinator.default_binding()))
}

/// 更新全局热键
///
/// 返回新的热键信息；绑定未变化时原样返回
#[command]
pub async fn update_shortcut<R: Runtime>(
    app: AppHandle<R>,
    shortcut: String,
) -> Result<ShortcutInfo, String> {
    let binding = ShortcutBinding::parse(&shortcut).map_err(user_error)?;
    let coordinator = coordinator(&app)?;

    match coordinator.update_shortcut(binding.clone()).await {
        Ok(UpdateOutcome::Updated { persisted: false, .. }) => {
            tracing::warn!(hotkey = %binding, "Shortcut active but not saved");
        }
        Ok(_) => {}
        Err(e) => {
            tracing::error!(hotkey = %binding, error = %e, "update_shortcut command failed");
            return Err(user_error(e));
        }
    }

    Ok(ShortcutInfo::new(&binding, coordinator.default_binding()))
}

/// 恢复默认热键
#[command]
pub async fn reset_shortcut<R: Runtime>(app: AppHandle<R>) -> Result<ShortcutInfo, String> {
    let coordinator = coordinator(&app)?;

    coordinator.reset_to_default().await.map_err(|e| {
        tracing::error!(error = %e, "reset_shortcut command failed");
        user_error(e)
    })?;

    let default = coordinator.default_binding();
    Ok(ShortcutInfo::new(default, default))
}
