/// Tauri commands
pub mod commands;

/// Application configuration
pub mod config;

/// Typed in-process event bus
pub mod events;

/// Global shortcut coordinator
pub mod hotkey;

/// Notification lifecycle tracking
pub mod notification;

/// Single-flight task gate
pub mod task_gate;

/// Shortcut trigger listener
pub mod trigger;

/// Utility modules
pub mod utils;

use std::sync::Arc;

use tauri::{AppHandle, Manager, RunEvent, Wry};

use hotkey::{ShortcutCoordinator, TauriSettingsStore, TauriShortcutBackend, TauriShortcutCoordinator};
use notification::NotificationCenter;
use task_gate::TaskGate;
use trigger::{
    ListenerHolder, NavigationContext, RetryPolicy, ShortcutListener, TauriErrorReporter,
    TauriFocusActions, TriggerDispatcher,
};

/// 初始化热键相关状态并在后台启动监听
fn setup_shortcut(app: &AppHandle<Wry>) {
    let config = config::init_config(app).get();

    let coordinator: Arc<TauriShortcutCoordinator<Wry>> = Arc::new(
        ShortcutCoordinator::new(
            TauriShortcutBackend::new(app),
            TauriSettingsStore::new(app, config.shortcut.store_file.clone()),
        )
        .with_store_key(config.shortcut.store_key.clone())
        .with_default_binding(config.shortcut.default_binding.clone()),
    );
    let notifications = Arc::new(NotificationCenter::new());
    let navigation = Arc::new(NavigationContext::new(config.trigger.tutorial_location.clone()));
    let holder = Arc::new(ListenerHolder::new());

    app.manage(Arc::clone(&coordinator));
    app.manage(Arc::clone(&notifications));
    app.manage(Arc::clone(&navigation));
    app.manage(Arc::clone(&holder));

    let dispatcher = TriggerDispatcher::new(
        Arc::new(TaskGate::with_policy(config.trigger.gate_policy)),
        Arc::new(TauriFocusActions::new(app, navigation)),
        Arc::new(TauriErrorReporter::new(app)),
    )
    .with_cooldown(config.trigger.press_cooldown());
    let policy = RetryPolicy::from(&config.trigger);

    tauri::async_runtime::spawn(async move {
        match ShortcutListener::start_with_retry(&coordinator, &notifications, dispatcher, policy).await {
            Some(listener) => holder.set(listener).await,
            None => tracing::warn!("Global shortcut listener not running"),
        }
    });
}

fn shutdown(app: &AppHandle<Wry>) {
    let coordinator = app
        .try_state::<Arc<TauriShortcutCoordinator<Wry>>>()
        .map(|state| Arc::clone(&state));
    let holder = app
        .try_state::<Arc<ListenerHolder>>()
        .map(|state| Arc::clone(&state));

    tauri::async_runtime::block_on(async move {
        if let Some(holder) = holder {
            holder.stop().await;
        }
        if let Some(coordinator) = coordinator {
            coordinator.unregister_all().await;
        }
    });
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    utils::logging::init_logging();

    tauri::Builder::default()
        .plugin(tauri_plugin_global_shortcut::Builder::new().build())
        .plugin(tauri_plugin_store::Builder::default().build())
        .setup(|app| {
            setup_shortcut(app.handle());
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::shortcut::get_shortcut,
            commands::shortcut::get_shortcut_display,
            commands::shortcut::update_shortcut,
            commands::shortcut::reset_shortcut,
            commands::notification::notification_created,
            commands::notification::notification_dismissed,
            commands::navigation::set_navigation_location,
            commands::navigation::set_onboarding_complete,
            commands::config::get_config,
            commands::config::save_config,
            commands::config::reset_config,
        ])
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(|app, event| {
            if let RunEvent::Exit = event {
                tracing::info!("Application exiting");
                shutdown(app);
            }
        });
}
