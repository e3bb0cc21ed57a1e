//! 热键相关错误类型

use std::io;

use thiserror::Error;

/// 热键相关错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HotkeyError {
    /// 无效的热键格式
    #[error("Invalid hotkey format: {0}")]
    InvalidFormat(String),

    /// 热键注册失败
    #[error("Failed to register hotkey '{hotkey}': {reason}")]
    RegistrationFailed { hotkey: String, reason: String },

    /// 热键注销失败
    #[error("Failed to unregister hotkey '{hotkey}': {reason}")]
    UnregistrationFailed { hotkey: String, reason: String },

    /// 协调器尚未初始化
    #[error("Shortcut coordinator is not initialized")]
    NotInitialized,

    /// 持久化存储错误
    #[error("Settings store error: {0}")]
    Store(#[from] StoreError),
}

impl HotkeyError {
    /// 检查是否为存储被锁定的暂时性错误
    pub fn is_store_locked(&self) -> bool {
        matches!(self, Self::Store(StoreError::Locked(_)))
    }
}

/// 热键模块的结果类型
pub type HotkeyResult<T> = Result<T, HotkeyError>;

/// 持久化键值存储错误
///
/// 根据底层 I/O 错误类型分类，而不是匹配错误消息文本
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// 存储文件被其他进程或任务锁定（暂时性，稍后重试即可）
    #[error("Settings store is locked: {0}")]
    Locked(String),

    /// 存储所在的文件系统只读或无写权限
    #[error("Settings store is read-only: {0}")]
    ReadOnly(String),

    /// 存储尚未打开
    #[error("Settings store is not open")]
    NotOpen,

    /// 其他 IO 错误
    #[error("Settings store IO error: {0}")]
    Io(String),

    /// 值无法序列化或反序列化
    #[error("Settings store serialization error: {0}")]
    Serialization(String),

    /// 存储后端的其他错误
    #[error("Settings store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// 检查是否为暂时性错误
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Locked(_))
    }
}

impl From<io::Error> for StoreError {
    fn from(error: io::Error) -> Self {
        let message = error.to_string();
        match error.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::ResourceBusy => Self::Locked(message),
            io::ErrorKind::ReadOnlyFilesystem | io::ErrorKind::PermissionDenied => {
                Self::ReadOnly(message)
            }
            _ => Self::Io(message),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<tauri_plugin_store::Error> for StoreError {
    fn from(error: tauri_plugin_store::Error) -> Self {
        match error {
            tauri_plugin_store::Error::Io(io_error) => Self::from(io_error),
            tauri_plugin_store::Error::Json(json_error) => Self::from(json_error),
            other => Self::Backend(other.to_string()),
        }
    }
}

/// 存储操作的结果类型
pub type StoreResult<T> = Result<T, StoreError>;
