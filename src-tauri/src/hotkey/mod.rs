//! 热键管理模块
//!
//! 提供唯一全局热键的注册、持久化和按下事件发布功能
//!
//! # 功能
//!
//! - 首次运行使用默认热键 `CommandOrControl+E`
//! - 启动时从设置存储加载用户绑定，存储不可用时降级为默认绑定
//! - 更新绑定时先注销旧绑定、持久化新绑定、再注册新绑定
//! - 热键按下时发布 [`ShortcutPressed`](crate::events::ShortcutPressed) 事件（松开不发布）
//!
//! # 使用方法
//!
//! ```ignore
//! use focuskeeper_lib::hotkey::{ShortcutCoordinator, TauriSettingsStore, TauriShortcutBackend};
//!
//! tauri::Builder::default()
//!     .setup(|app| {
//!         let coordinator = ShortcutCoordinator::new(
//!             TauriShortcutBackend::new(app.handle()),
//!             TauriSettingsStore::new(app.handle(), "settings.json"),
//!         );
//!         app.manage(std::sync::Arc::new(coordinator));
//!         Ok(())
//!     })
//! ```

mod backend;
mod binding;
mod coordinator;
mod error;
mod store;

pub use backend::{HotkeyHandler, KeyState, ShortcutBackend, TauriShortcutBackend};
pub use binding::{display_glyph, ShortcutBinding, DEFAULT_SHORTCUT, TOKEN_DELIMITER};
pub use coordinator::{
    CoordinatorPhase, InitReport, RegistrationState, ResyncReport, ShortcutCoordinator,
    UpdateOutcome,
};
pub use error::{HotkeyError, HotkeyResult, StoreError, StoreResult};
pub use store::{SettingsStore, TauriSettingsStore, DEFAULT_STORE_FILE, SHORTCUT_STORE_KEY};

/// 生产环境使用的协调器类型
pub type TauriShortcutCoordinator<R> =
    ShortcutCoordinator<TauriShortcutBackend<R>, TauriSettingsStore<R>>;
