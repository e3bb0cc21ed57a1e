//! 全局错误处理模块
//!
//! 提供统一的应用错误类型和用户友好的错误消息
//!
//! # 功能
//!
//! - 统一的 `AppError` 类型，聚合所有模块错误
//! - 用户友好的错误消息
//! - 错误代码用于前端处理
//! - 错误恢复建议
//!
//! # 使用示例
//!
//! ```
//! use focuskeeper_lib::hotkey::HotkeyError;
//! use focuskeeper_lib::utils::error::{AppError, ErrorCode};
//!
//! let err = AppError::from(HotkeyError::NotInitialized);
//! assert_eq!(err.code(), ErrorCode::HotkeyNotInitialized);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ConfigError;
use crate::hotkey::{HotkeyError, StoreError};
use crate::trigger::SetupError;

/// 应用错误类型
///
/// 聚合所有模块的错误类型，提供统一的错误处理接口
#[derive(Error, Debug)]
pub enum AppError {
    /// 热键错误
    #[error("Hotkey error: {0}")]
    Hotkey(#[from] HotkeyError),

    /// 启动热键监听失败
    #[error("Setup error: {0}")]
    Setup(#[from] SetupError),

    /// 配置错误
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// 热键触发的动作失败
    #[error("Action failed: {0:#}")]
    Action(#[from] anyhow::Error),
}

/// 错误代码
///
/// 用于前端识别和处理特定错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // 热键错误
    /// 热键格式无效
    HotkeyInvalidFormat,
    /// 热键注册失败（通常被系统或其他应用占用）
    HotkeyRegistrationFailed,
    /// 热键注销失败
    HotkeyUnregistrationFailed,
    /// 热键尚未初始化
    HotkeyNotInitialized,

    // 存储错误
    /// 设置存储被锁定
    StoreLocked,
    /// 设置存储只读
    StoreReadOnly,
    /// 设置存储不可用
    StoreUnavailable,

    // 配置错误
    /// 配置加载失败
    ConfigLoadFailed,
    /// 配置保存失败
    ConfigSaveFailed,
    /// 配置无效
    ConfigInvalid,

    // 通用错误
    /// 启动失败
    SetupFailed,
    /// 动作执行失败
    ActionFailed,
}

/// 错误上下文信息
///
/// 提供用户友好的错误信息和恢复建议
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// 错误代码
    pub code: ErrorCode,
    /// 用户友好的错误消息
    pub message: String,
    /// 详细错误信息（用于日志）
    pub detail: Option<String>,
    /// 恢复建议
    pub recovery_hint: Option<String>,
    /// 是否可恢复
    pub recoverable: bool,
}

impl ErrorContext {
    /// 创建新的错误上下文
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            detail: None,
            recovery_hint: None,
            recoverable: true,
        }
    }

    /// 设置详细信息
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// 设置恢复建议
    pub fn with_recovery_hint(mut self, hint: impl Into<String>) -> Self {
        self.recovery_hint = Some(hint.into());
        self
    }

    /// 标记为不可恢复
    pub fn not_recoverable(mut self) -> Self {
        self.recoverable = false;
        self
    }
}

fn store_code(error: &StoreError) -> ErrorCode {
    match error {
        StoreError::Locked(_) => ErrorCode::StoreLocked,
        StoreError::ReadOnly(_) => ErrorCode::StoreReadOnly,
        _ => ErrorCode::StoreUnavailable,
    }
}

fn hotkey_code(error: &HotkeyError) -> ErrorCode {
    match error {
        HotkeyError::InvalidFormat(_) => ErrorCode::HotkeyInvalidFormat,
        HotkeyError::RegistrationFailed { .. } => ErrorCode::HotkeyRegistrationFailed,
        HotkeyError::UnregistrationFailed { .. } => ErrorCode::HotkeyUnregistrationFailed,
        HotkeyError::NotInitialized => ErrorCode::HotkeyNotInitialized,
        HotkeyError::Store(store) => store_code(store),
    }
}

fn hotkey_message(error: &HotkeyError) -> String {
    match error {
        HotkeyError::InvalidFormat(hotkey) => format!("快捷键格式无效: {}", hotkey),
        HotkeyError::RegistrationFailed { hotkey, .. } => {
            format!("无法注册快捷键 {}，可能已被其他应用占用", hotkey)
        }
        HotkeyError::UnregistrationFailed { .. } => "无法注销旧的快捷键".to_string(),
        HotkeyError::NotInitialized => "快捷键尚未就绪，请稍后重试".to_string(),
        HotkeyError::Store(StoreError::Locked(_)) => "设置文件正被占用，请稍后重试".to_string(),
        HotkeyError::Store(StoreError::ReadOnly(_)) => "设置文件不可写入".to_string(),
        HotkeyError::Store(_) => "无法读取设置文件".to_string(),
    }
}

impl AppError {
    /// 获取错误代码
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Hotkey(e) => hotkey_code(e),
            AppError::Setup(SetupError::Hotkey(e)) => hotkey_code(e),
            AppError::Setup(_) => ErrorCode::SetupFailed,

            AppError::Config(ConfigError::Save(_)) => ErrorCode::ConfigSaveFailed,
            AppError::Config(ConfigError::Json(_)) => ErrorCode::ConfigInvalid,
            AppError::Config(ConfigError::Io(_) | ConfigError::Path(_)) => {
                ErrorCode::ConfigLoadFailed
            }

            AppError::Action(_) => ErrorCode::ActionFailed,
        }
    }

    /// 获取用户友好的错误消息
    ///
    /// 返回适合直接显示给用户的错误消息
    pub fn user_message(&self) -> String {
        match self {
            AppError::Hotkey(e) => hotkey_message(e),
            AppError::Setup(SetupError::Hotkey(e)) => hotkey_message(e),
            AppError::Setup(_) => "快捷键初始化失败".to_string(),

            AppError::Config(ConfigError::Save(_)) => "无法保存配置文件".to_string(),
            AppError::Config(ConfigError::Io(_)) => "无法读取配置文件".to_string(),
            AppError::Config(ConfigError::Json(_)) => "配置文件格式错误".to_string(),
            AppError::Config(ConfigError::Path(_)) => "无法定位配置目录".to_string(),

            AppError::Action(_) => "无法开始专注，请重试".to_string(),
        }
    }

    /// 获取完整的错误上下文
    pub fn context(&self) -> ErrorContext {
        let mut ctx = ErrorContext::new(self.code(), self.user_message())
            .with_detail(self.to_string());

        ctx.recovery_hint = self.recovery_hint();

        if !self.is_recoverable() {
            ctx = ctx.not_recoverable();
        }

        ctx
    }

    /// 获取恢复建议
    pub fn recovery_hint(&self) -> Option<String> {
        match self.code() {
            ErrorCode::HotkeyRegistrationFailed => {
                Some("请在设置中选择其他快捷键组合".to_string())
            }
            ErrorCode::HotkeyInvalidFormat => {
                Some("快捷键需要由修饰键和一个按键组成，例如 CommandOrControl+E".to_string())
            }
            ErrorCode::StoreReadOnly | ErrorCode::ConfigSaveFailed => {
                Some("请检查应用数据目录的写入权限".to_string())
            }
            ErrorCode::ConfigInvalid => Some("可以在设置中恢复默认配置".to_string()),
            _ => None,
        }
    }

    /// 检查错误是否可恢复
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, AppError::Config(_))
    }
}
