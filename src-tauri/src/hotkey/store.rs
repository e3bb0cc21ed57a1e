//! 持久化设置存储
//!
//! 热键绑定保存在 `tauri-plugin-store` 管理的 JSON 文件中

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use serde_json::Value;
use tauri::{AppHandle, Runtime};
use tauri_plugin_store::{Store, StoreExt};

use super::error::{StoreError, StoreResult};

/// 默认存储文件名
pub const DEFAULT_STORE_FILE: &str = "settings.json";

/// 保存热键绑定使用的键
pub const SHORTCUT_STORE_KEY: &str = "globalShortcut";

/// 持久化键值存储
pub trait SettingsStore: Send + Sync {
    /// 打开（或重新加载）存储
    fn open(&self) -> StoreResult<()>;

    /// 读取值，键不存在时返回 `None`
    fn get(&self, key: &str) -> StoreResult<Option<Value>>;

    /// 写入值（仅内存，需要 [`SettingsStore::save`] 才会落盘）
    fn set(&self, key: &str, value: Value) -> StoreResult<()>;

    /// 写入磁盘
    fn save(&self) -> StoreResult<()>;
}

/// 基于 `tauri-plugin-store` 的实现
pub struct TauriSettingsStore<R: Runtime> {
    app: AppHandle<R>,
    file: String,
    store: ArcSwapOption<Store<R>>,
}

impl<R: Runtime> TauriSettingsStore<R> {
    /// 创建新的存储，此时尚未打开文件
    pub fn new(app: &AppHandle<R>, file: impl Into<String>) -> Self {
        Self {
            app: app.clone(),
            file: file.into(),
            store: ArcSwapOption::empty(),
        }
    }

    fn opened(&self) -> StoreResult<Arc<Store<R>>> {
        self.store.load_full().ok_or(StoreError::NotOpen)
    }
}

impl<R: Runtime> SettingsStore for TauriSettingsStore<R> {
    fn open(&self) -> StoreResult<()> {
        let store = self.app.store(self.file.as_str())?;
        self.store.store(Some(store));

        tracing::debug!(file = %self.file, "Settings store opened");
        Ok(())
    }

    fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        Ok(self.opened()?.get(key))
    }

    fn set(&self, key: &str, value: Value) -> StoreResult<()> {
        self.opened()?.set(key, value);
        Ok(())
    }

    fn save(&self) -> StoreResult<()> {
        self.opened()?.save()?;
        tracing::debug!(file = %self.file, "Settings store saved");
        Ok(())
    }
}
