//! 配置相关的 Tauri 命令
//!
//! 提供前端调用的配置管理命令。热键本身通过 `update_shortcut` 修改，
//! 这里的 `shortcut.default_binding` 只影响之后的启动和恢复默认。

use std::sync::Arc;

use tauri::{command, AppHandle, Manager, Runtime};

use crate::config::{AppConfig, ConfigError, ConfigManager, GlobalConfig};
use crate::utils::error::AppError;

fn user_error(error: ConfigError) -> String {
    let error = AppError::from(error);
    tracing::error!(code = ?error.code(), error = %error, "Config command failed");
    error.user_message()
}

/// 获取当前配置
#[command]
pub fn get_config<R: Runtime>(app: AppHandle<R>) -> Result<AppConfig, String> {
    let config = app
        .try_state::<Arc<GlobalConfig>>()
        .ok_or("Config not initialized")?;

    Ok((*config.get()).clone())
}

/// 保存配置
#[command]
pub fn save_config<R: Runtime>(app: AppHandle<R>, config: AppConfig) -> Result<(), String> {
    ConfigManager::save(&app, &config).map_err(user_error)?;

    if let Some(global) = app.try_state::<Arc<GlobalConfig>>() {
        global.update(config);
    }

    tracing::info!("Config saved via command");
    Ok(())
}

/// 重置配置为默认值
#[command]
pub fn reset_config<R: Runtime>(app: AppHandle<R>) -> Result<AppConfig, String> {
    let config = ConfigManager::reset(&app).map_err(user_error)?;

    if let Some(global) = app.try_state::<Arc<GlobalConfig>>() {
        global.update(config.clone());
    }

    tracing::info!("Config reset via command");
    Ok(config)
}
