//! 通知生命周期相关的 Tauri 命令
//!
//! 前端在通知界面显示和关闭时调用，驱动热键监听器的武装/解除

use std::sync::Arc;

use tauri::{command, AppHandle, Manager, Runtime};

use crate::notification::NotificationCenter;

fn center<R: Runtime>(app: &AppHandle<R>) -> Result<Arc<NotificationCenter>, String> {
    app.try_state::<Arc<NotificationCenter>>()
        .map(|state| Arc::clone(&state))
        .ok_or_else(|| "NotificationCenter not available".to_string())
}

/// 通知界面已显示
#[command]
pub async fn notification_created<R: Runtime>(app: AppHandle<R>, id: String) -> Result<(), String> {
    center(&app)?.created(id).await;
    Ok(())
}

/// 通知界面已关闭
#[command]
pub async fn notification_dismissed<R: Runtime>(
    app: AppHandle<R>,
    id: String,
) -> Result<(), String> {
    center(&app)?.dismissed(id).await;
    Ok(())
}
