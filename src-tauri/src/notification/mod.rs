//! 通知生命周期模块
//!
//! 前端在显示或关闭通知界面时上报，本模块记录当前打开的通知并把
//! [`NotificationEvent`] 发布给订阅者（例如热键监听器）。

use std::collections::HashSet;

use tokio::sync::{mpsc, Mutex};

use crate::events::{EventBus, NotificationEvent};

/// 通知中心
pub struct NotificationCenter {
    active: Mutex<HashSet<String>>,
    bus: EventBus<NotificationEvent>,
}

impl NotificationCenter {
    /// 创建新的通知中心
    pub fn new() -> Self {
        Self {
            active: Mutex::new(HashSet::new()),
            bus: EventBus::new(),
        }
    }

    /// 订阅通知事件
    pub fn subscribe(&self) -> mpsc::Receiver<NotificationEvent> {
        self.bus.subscribe()
    }

    /// 通知界面已显示
    pub async fn created(&self, id: impl Into<String>) {
        let id = id.into();
        let mut active = self.active.lock().await;

        if !active.insert(id.clone()) {
            tracing::debug!(id = %id, "Notification already active");
        }

        tracing::debug!(id = %id, active = active.len(), "Notification created");
        self.bus.emit(NotificationEvent::created(id));
    }

    /// 通知界面已关闭
    ///
    /// 未知的 ID 只记录日志，事件仍然发布
    pub async fn dismissed(&self, id: impl Into<String>) {
        let id = id.into();
        let mut active = self.active.lock().await;

        if !active.remove(&id) {
            tracing::warn!(id = %id, "Dismissed notification was not tracked as active");
        }

        tracing::debug!(id = %id, active = active.len(), "Notification dismissed");
        self.bus.emit(NotificationEvent::dismissed(id));
    }

    /// 当前打开的通知数量
    pub async fn active_count(&self) -> usize {
        self.active.lock().await.len()
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}
