//! 前端导航状态上报命令

use std::sync::Arc;

use tauri::{command, AppHandle, Manager, Runtime};

use crate::trigger::NavigationContext;

fn navigation<R: Runtime>(app: &AppHandle<R>) -> Result<Arc<NavigationContext>, String> {
    app.try_state::<Arc<NavigationContext>>()
        .map(|state| Arc::clone(&state))
        .ok_or_else(|| "NavigationContext not available".to_string())
}

/// 上报当前路由
#[command]
pub fn set_navigation_location<R: Runtime>(app: AppHandle<R>, location: String) -> Result<(), String> {
    tracing::debug!(location = %location, "Navigation location changed");
    navigation(&app)?.set_location(location);
    Ok(())
}

/// 上报新手引导完成状态
#[command]
pub fn set_onboarding_complete<R: Runtime>(app: AppHandle<R>, complete: bool) -> Result<(), String> {
    navigation(&app)?.set_onboarding_complete(complete);
    tracing::info!(complete, "Onboarding state updated");
    Ok(())
}
