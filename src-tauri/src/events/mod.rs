//! 应用内事件模块
//!
//! 用类型化的 channel 替代按字符串命名的事件：生产者和消费者在编译期就对
//! 载荷类型达成一致。
//!
//! # 模块结构
//!
//! - `bus` - 通用的多订阅者事件总线
//!
//! # 事件
//!
//! - [`ShortcutPressed`] - 全局热键被按下（无载荷）
//! - [`NotificationEvent`] - 通知界面的创建与关闭

mod bus;

pub use bus::{EventBus, DEFAULT_LISTENER_CAPACITY};

use serde::Serialize;

/// 全局热键按下信号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortcutPressed;

/// 通知生命周期事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationEvent {
    /// 通知界面已显示
    Created { id: String },
    /// 通知界面已关闭
    Dismissed { id: String },
}

impl NotificationEvent {
    /// 创建 `Created` 事件
    pub fn created(id: impl Into<String>) -> Self {
        Self::Created { id: id.into() }
    }

    /// 创建 `Dismissed` 事件
    pub fn dismissed(id: impl Into<String>) -> Self {
        Self::Dismissed { id: id.into() }
    }
}
