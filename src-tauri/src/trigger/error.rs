//! 热键监听启动错误

use thiserror::Error;

use crate::hotkey::HotkeyError;

/// 失败分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// 已知的良性竞争（例如存储被锁定），只记录日志，稍后重试
    Benign,
    /// 需要告知用户的失败
    Surfaced,
}

/// 启动热键监听时的错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SetupError {
    /// 热键协调器初始化失败
    #[error("Shortcut setup failed: {0}")]
    Hotkey(#[from] HotkeyError),

    /// 当前上下文没有 tokio 运行时，无法启动监听任务
    #[error("No async runtime available for the shortcut listener")]
    NoRuntime,
}

impl SetupError {
    /// 获取失败分类
    pub fn class(&self) -> FailureClass {
        match self {
            Self::Hotkey(e) if e.is_store_locked() => FailureClass::Benign,
            _ => FailureClass::Surfaced,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hotkey::StoreError;

    #[test]
    fn test_locked_store_is_benign() {
        let error = SetupError::from(HotkeyError::Store(StoreError::Locked("db".into())));
        assert_eq!(error.class(), FailureClass::Benign);
    }

    #[test]
    fn test_other_failures_are_surfaced() {
        let error = SetupError::from(HotkeyError::Store(StoreError::ReadOnly("ro".into())));
        assert_eq!(error.class(), FailureClass::Surfaced);

        let error = SetupError::from(HotkeyError::RegistrationFailed {
            hotkey: "CommandOrControl+E".into(),
            reason: "occupied".into(),
        });
        assert_eq!(error.class(), FailureClass::Surfaced);

        assert_eq!(SetupError::NoRuntime.class(), FailureClass::Surfaced);
    }
}
