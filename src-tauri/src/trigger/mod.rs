//! 热键触发模块
//!
//! 把热键协调器、通知中心和任务闸门串起来：
//!
//! - `actions` - 热键触发后执行的动作与路由
//! - `error` - 监听启动错误及其分类
//! - `listener` - 按通知生命周期武装/解除的监听器
//!
//! # 使用示例
//!
//! ```ignore
//! use std::sync::Arc;
//! use focuskeeper_lib::task_gate::TaskGate;
//! use focuskeeper_lib::trigger::{RetryPolicy, ShortcutListener, TriggerDispatcher};
//!
//! let dispatcher = TriggerDispatcher::new(Arc::new(TaskGate::new()), actions, reporter);
//! let listener =
//!     ShortcutListener::start_with_retry(&coordinator, &notifications, dispatcher, RetryPolicy::default())
//!         .await;
//! ```

mod actions;
mod error;
mod listener;

pub use actions::{
    ErrorReporter, FocusActions, NavigationContext, TauriErrorReporter, TauriFocusActions,
    TriggerRoute, APP_ERROR_EVENT, FOCUS_START_EVENT, MAIN_WINDOW, TUTORIAL_COMPLETE_EVENT,
};
pub use error::{FailureClass, SetupError};
pub use listener::{
    ListenerHolder, RetryPolicy, ShortcutListener, TriggerDispatcher, TRIGGER_TASK_KEY,
};
