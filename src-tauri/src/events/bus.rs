//! 事件总线
//!
//! 每个订阅者持有一个独立的 mpsc 接收器，丢弃接收器即取消订阅。

use arc_swap::ArcSwap;
use tokio::sync::mpsc::{self, error::TrySendError};

/// 每个订阅者的默认缓冲区大小
pub const DEFAULT_LISTENER_CAPACITY: usize = 32;

/// 多订阅者事件总线
///
/// 订阅者列表保存在 `ArcSwap` 中，`emit` 无锁且同步，
/// 可以在原生热键回调线程等非异步上下文中调用。
pub struct EventBus<E> {
    listeners: ArcSwap<Vec<mpsc::Sender<E>>>,
    capacity: usize,
}

impl<E: Clone + Send + 'static> EventBus<E> {
    /// 创建新的事件总线
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_LISTENER_CAPACITY)
    }

    /// 使用指定的订阅者缓冲区大小创建事件总线
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            listeners: ArcSwap::from_pointee(Vec::new()),
            capacity: capacity.max(1),
        }
    }

    /// 订阅事件
    ///
    /// # Examples
    ///
    /// ```
    /// use focuskeeper_lib::events::{EventBus, ShortcutPressed};
    ///
    /// let bus = EventBus::new();
    /// let mut rx = bus.subscribe();
    ///
    /// assert_eq!(bus.emit(ShortcutPressed), 1);
    /// assert_eq!(rx.try_recv().unwrap(), ShortcutPressed);
    /// ```
    pub fn subscribe(&self) -> mpsc::Receiver<E> {
        let (tx, rx) = mpsc::channel(self.capacity);
        self.listeners.rcu(|current| {
            let mut next = Vec::with_capacity(current.len() + 1);
            next.extend(current.iter().filter(|l| !l.is_closed()).cloned());
            next.push(tx.clone());
            next
        });
        rx
    }

    /// 发射事件给所有订阅者
    ///
    /// 返回成功投递的订阅者数量。缓冲区已满的订阅者会丢失这次事件，
    /// 已关闭的订阅者会被清理。
    pub fn emit(&self, event: E) -> usize {
        let listeners = self.listeners.load();
        let mut delivered = 0;
        let mut has_closed = false;

        for listener in listeners.iter() {
            match listener.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!("Event listener queue is full, dropping event");
                }
                Err(TrySendError::Closed(_)) => has_closed = true,
            }
        }

        if has_closed {
            self.cleanup();
        }

        delivered
    }

    /// 当前仍然存活的订阅者数量
    pub fn listener_count(&self) -> usize {
        self.listeners
            .load()
            .iter()
            .filter(|l| !l.is_closed())
            .count()
    }

    /// 移除已关闭的订阅者
    pub fn cleanup(&self) {
        self.listeners.rcu(|current| {
            current
                .iter()
                .filter(|l| !l.is_closed())
                .cloned()
                .collect::<Vec<_>>()
        });
    }
}

impl<E: Clone + Send + 'static> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}
