//! 应用配置模块
//!
//! 提供应用程序配置的加载、保存和管理功能
//!
//! # 配置存储位置
//!
//! - Windows: `%APPDATA%/com.focuskeeper.app/config.json`
//! - macOS: `~/Library/Application Support/com.focuskeeper.app/config.json`
//! - Linux: `~/.config/com.focuskeeper.app/config.json`
//!
//! 用户选择的热键不在这里，而是保存在设置存储（`settings.json`）中。
//!
//! # 使用示例
//!
//! ```ignore
//! use focuskeeper_lib::config::{AppConfig, ConfigManager};
//!
//! let mut config = ConfigManager::load(&app_handle)?;
//! config.trigger.setup_retry_attempts = 5;
//! ConfigManager::save(&app_handle, &config)?;
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use tauri::{AppHandle, Manager, Runtime};
use thiserror::Error;

use crate::hotkey::{ShortcutBinding, DEFAULT_STORE_FILE, SHORTCUT_STORE_KEY};
use crate::task_gate::GatePolicy;
use crate::utils::error::AppError;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 序列化/反序列化错误
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// 写入配置文件失败
    #[error("Failed to write config: {0}")]
    Save(#[source] std::io::Error),

    /// 路径错误
    #[error("Path error: {0}")]
    Path(String),
}

/// 配置结果类型
pub type ConfigResult<T> = Result<T, ConfigError>;

/// 应用配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 热键配置
    pub shortcut: ShortcutConfig,
    /// 热键触发配置
    pub trigger: TriggerConfig,
}

/// 热键配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortcutConfig {
    /// 设置存储文件名
    pub store_file: String,
    /// 保存热键使用的键
    pub store_key: String,
    /// 首次运行或存储不可用时使用的热键
    pub default_binding: ShortcutBinding,
}

impl Default for ShortcutConfig {
    fn default() -> Self {
        Self {
            store_file: DEFAULT_STORE_FILE.to_string(),
            store_key: SHORTCUT_STORE_KEY.to_string(),
            default_binding: ShortcutBinding::default(),
        }
    }
}

/// 热键触发配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// 触发动作的闸门策略
    pub gate_policy: GatePolicy,
    /// 监听器启动遇到暂时性错误时的最大尝试次数
    pub setup_retry_attempts: u32,
    /// 两次尝试之间的间隔（毫秒）
    pub setup_retry_delay_ms: u64,
    /// 触发动作完成后继续占用闸门的时间（毫秒），吸收连续按下
    pub press_cooldown_ms: u64,
    /// 新手引导页面的路由
    pub tutorial_location: String,
}

impl TriggerConfig {
    /// 获取重试间隔
    pub fn setup_retry_delay(&self) -> Duration {
        Duration::from_millis(self.setup_retry_delay_ms)
    }

    /// 获取按下冷却时间
    pub fn press_cooldown(&self) -> Duration {
        Duration::from_millis(self.press_cooldown_ms)
    }
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            gate_policy: GatePolicy::SingleFlight,
            setup_retry_attempts: 3,
            setup_retry_delay_ms: 500,
            press_cooldown_ms: 300,
            tutorial_location: "/onboarding/tutorial".to_string(),
        }
    }
}

/// 配置管理器
///
/// 提供配置的加载、保存和管理功能
pub struct ConfigManager;

impl ConfigManager {
    /// 加载配置
    ///
    /// 从配置文件加载配置，如果文件不存在则返回默认配置
    pub fn load<R: Runtime>(app: &AppHandle<R>) -> ConfigResult<AppConfig> {
        let path = Self::config_path(app)?;

        tracing::debug!(path = %path.display(), "Loading config");

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: AppConfig = serde_json::from_str(&content)?;
            tracing::info!(path = %path.display(), "Config loaded successfully");
            Ok(config)
        } else {
            tracing::info!("Config file not found, using defaults");
            Ok(AppConfig::default())
        }
    }

    /// 保存配置
    pub fn save<R: Runtime>(app: &AppHandle<R>, config: &AppConfig) -> ConfigResult<()> {
        let path = Self::config_path(app)?;

        tracing::debug!(path = %path.display(), "Saving config");

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(ConfigError::Save)?;
            }
        }

        let content = serde_json::to_string_pretty(config)?;
        std::fs::write(&path, content).map_err(ConfigError::Save)?;

        tracing::info!(path = %path.display(), "Config saved successfully");
        Ok(())
    }

    /// 获取配置文件路径
    pub fn config_path<R: Runtime>(app: &AppHandle<R>) -> ConfigResult<PathBuf> {
        let app_config_dir = app
            .path()
            .app_config_dir()
            .map_err(|e| ConfigError::Path(e.to_string()))?;

        Ok(app_config_dir.join("config.json"))
    }

    /// 重置为默认配置
    pub fn reset<R: Runtime>(app: &AppHandle<R>) -> ConfigResult<AppConfig> {
        let config = AppConfig::default();
        Self::save(app, &config)?;
        tracing::info!("Config reset to defaults");
        Ok(config)
    }
}

/// 全局配置状态
///
/// 使用 ArcSwap 实现无锁读取
pub struct GlobalConfig {
    config: ArcSwap<AppConfig>,
}

impl GlobalConfig {
    /// 创建新的全局配置
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: ArcSwap::new(Arc::new(config)),
        }
    }

    /// 获取当前配置
    pub fn get(&self) -> Arc<AppConfig> {
        self.config.load_full()
    }

    /// 更新配置
    pub fn update(&self, config: AppConfig) {
        self.config.store(Arc::new(config));
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

/// 初始化配置系统
///
/// 加载配置并注册到应用状态。配置文件损坏时记录错误并使用默认配置，
/// 不阻止应用启动。
pub fn init_config<R: Runtime>(app: &AppHandle<R>) -> Arc<GlobalConfig> {
    tracing::info!("Initializing config system");

    let config = ConfigManager::load(app).unwrap_or_else(|e| {
        let error = AppError::from(e);
        tracing::error!(code = ?error.code(), error = %error, "Failed to load config, using defaults");
        AppConfig::default()
    });

    let global_config = Arc::new(GlobalConfig::new(config));
    app.manage(Arc::clone(&global_config));

    tracing::info!("Config system initialized");
    global_config
}
