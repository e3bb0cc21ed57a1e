//! 热键触发的动作
//!
//! 热键按下后根据前端当前位置和新手引导状态决定走哪条流程，
//! 实际的专注会话逻辑在前端，这里只负责唤起窗口并发出事件。

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::Serialize;
use tauri::{AppHandle, Emitter, Manager, Runtime};

use crate::utils::error::ErrorContext;

/// 发给前端：完成新手引导
pub const TUTORIAL_COMPLETE_EVENT: &str = "tutorial:complete";

/// 发给前端：开始或继续专注会话
pub const FOCUS_START_EVENT: &str = "focus:start_or_resume";

/// 发给前端：需要提示用户的错误
pub const APP_ERROR_EVENT: &str = "app:error";

/// 主窗口标签
pub const MAIN_WINDOW: &str = "main";

/// 热键触发后的流程
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerRoute {
    /// 完成新手引导
    CompleteTutorial,
    /// 开始或继续专注会话
    StartOrResumeSession,
}

/// 前端导航上下文
///
/// 由前端通过命令上报当前路由和新手引导状态
pub struct NavigationContext {
    location: ArcSwap<String>,
    onboarding_complete: AtomicBool,
    tutorial_location: String,
}

impl NavigationContext {
    /// 创建新的导航上下文
    pub fn new(tutorial_location: impl Into<String>) -> Self {
        Self {
            location: ArcSwap::from_pointee(String::from("/")),
            onboarding_complete: AtomicBool::new(false),
            tutorial_location: tutorial_location.into(),
        }
    }

    /// 更新当前路由
    pub fn set_location(&self, location: impl Into<String>) {
        self.location.store(Arc::new(location.into()));
    }

    /// 获取当前路由
    pub fn location(&self) -> Arc<String> {
        self.location.load_full()
    }

    /// 更新新手引导完成状态
    pub fn set_onboarding_complete(&self, complete: bool) {
        self.onboarding_complete.store(complete, Ordering::SeqCst);
    }

    /// 新手引导是否已完成
    pub fn is_onboarding_complete(&self) -> bool {
        self.onboarding_complete.load(Ordering::SeqCst)
    }

    /// 决定热键触发后的流程
    ///
    /// # Examples
    ///
    /// ```
    /// use focuskeeper_lib::trigger::{NavigationContext, TriggerRoute};
    ///
    /// let nav = NavigationContext::new("/onboarding/tutorial");
    /// nav.set_location("/onboarding/tutorial");
    /// assert_eq!(nav.route(), TriggerRoute::CompleteTutorial);
    ///
    /// nav.set_onboarding_complete(true);
    /// assert_eq!(nav.route(), TriggerRoute::StartOrResumeSession);
    /// ```
    pub fn route(&self) -> TriggerRoute {
        let on_tutorial = self.location.load().as_str() == self.tutorial_location;
        if on_tutorial && !self.is_onboarding_complete() {
            TriggerRoute::CompleteTutorial
        } else {
            TriggerRoute::StartOrResumeSession
        }
    }
}

/// 热键触发的动作
pub trait FocusActions: Send + Sync + 'static {
    /// 决定流程
    fn route(&self) -> TriggerRoute;

    /// 完成新手引导
    fn complete_tutorial(&self) -> impl Future<Output = anyhow::Result<()>> + Send;

    /// 开始或继续专注会话
    fn start_or_resume_session(&self) -> impl Future<Output = anyhow::Result<()>> + Send;
}

/// 向用户展示错误
pub trait ErrorReporter: Send + Sync + 'static {
    /// 上报错误
    fn report(&self, context: &ErrorContext);
}

/// 基于 Tauri 窗口和事件的动作实现
pub struct TauriFocusActions<R: Runtime> {
    app: AppHandle<R>,
    navigation: Arc<NavigationContext>,
}

impl<R: Runtime> TauriFocusActions<R> {
    /// 创建新的动作实现
    pub fn new(app: &AppHandle<R>, navigation: Arc<NavigationContext>) -> Self {
        Self {
            app: app.clone(),
            navigation,
        }
    }

    fn show_main_window(&self) -> anyhow::Result<()> {
        let window = self
            .app
            .get_webview_window(MAIN_WINDOW)
            .ok_or_else(|| anyhow::anyhow!("main window not found"))?;

        window.show()?;
        window.unminimize()?;
        window.set_focus()?;
        Ok(())
    }
}

impl<R: Runtime> FocusActions for TauriFocusActions<R> {
    fn route(&self) -> TriggerRoute {
        self.navigation.route()
    }

    fn complete_tutorial(&self) -> impl Future<Output = anyhow::Result<()>> + Send {
        async move {
            tracing::info!("Completing tutorial from global shortcut");
            self.app.emit(TUTORIAL_COMPLETE_EVENT, ())?;
            Ok(())
        }
    }

    fn start_or_resume_session(&self) -> impl Future<Output = anyhow::Result<()>> + Send {
        async move {
            tracing::info!("Starting focus session from global shortcut");
            if let Err(e) = self.show_main_window() {
                tracing::warn!(error = %e, "Failed to show main window");
            }
            self.app.emit(FOCUS_START_EVENT, ())?;
            Ok(())
        }
    }
}

/// 通过 `app:error` 事件交给前端弹出提示
pub struct TauriErrorReporter<R: Runtime> {
    app: AppHandle<R>,
}

impl<R: Runtime> TauriErrorReporter<R> {
    /// 创建新的上报器
    pub fn new(app: &AppHandle<R>) -> Self {
        Self { app: app.clone() }
    }
}

impl<R: Runtime> ErrorReporter for TauriErrorReporter<R> {
    fn report(&self, context: &ErrorContext) {
        if let Err(e) = self.app.emit(APP_ERROR_EVENT, context) {
            tracing::warn!(error = %e, "Failed to emit error event");
        }
    }
}
