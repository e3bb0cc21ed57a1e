//! 集成测试共用的假后端和假存储
//!
//! 两者共享同一份调用日志，便于断言跨组件的调用顺序

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use focuskeeper_lib::hotkey::{
    HotkeyError, HotkeyHandler, HotkeyResult, KeyState, SettingsStore, ShortcutBackend,
    ShortcutBinding, ShortcutCoordinator, StoreError, StoreResult,
};
use serde_json::Value;

/// 记录下来的一次调用
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Register(String),
    Unregister(String),
    IsRegistered(String),
    StoreOpen,
    StoreGet(String),
    StoreSet(String, Value),
    StoreSave,
}

impl Call {
    pub fn is_backend(&self) -> bool {
        matches!(
            self,
            Call::Register(_) | Call::Unregister(_) | Call::IsRegistered(_)
        )
    }
}

/// 共享调用日志
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    pub fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    /// 去掉只读查询后的调用
    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::IsRegistered(_) | Call::StoreGet(_)))
            .collect()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().unwrap().is_empty()
    }
}

#[derive(Default)]
struct BackendInner {
    // None 表示由其他进程残留的注册，没有处理器
    registered: HashMap<String, Option<HotkeyHandler>>,
    rejected: HashSet<String>,
}

/// 假的原生热键设施
#[derive(Clone, Default)]
pub struct FakeBackend {
    inner: Arc<Mutex<BackendInner>>,
    log: CallLog,
}

impl FakeBackend {
    pub fn new(log: CallLog) -> Self {
        Self {
            inner: Arc::default(),
            log,
        }
    }

    /// 模拟上次进程残留的注册
    pub fn preregister(&self, binding: &str) {
        self.inner
            .lock()
            .unwrap()
            .registered
            .insert(binding.to_string(), None);
    }

    /// 之后对该绑定的注册都会失败（例如被其他应用占用）
    pub fn reject(&self, binding: &str) {
        self.inner.lock().unwrap().rejected.insert(binding.to_string());
    }

    pub fn accept(&self, binding: &str) {
        self.inner.lock().unwrap().rejected.remove(binding);
    }

    pub fn registered(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.lock().unwrap().registered.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn is_active(&self, binding: &str) -> bool {
        self.inner.lock().unwrap().registered.contains_key(binding)
    }

    /// 模拟系统触发热键，返回是否找到处理器
    pub fn fire(&self, binding: &str, state: KeyState) -> bool {
        let handler = self
            .inner
            .lock()
            .unwrap()
            .registered
            .get(binding)
            .cloned()
            .flatten();

        match handler {
            Some(handler) => {
                handler(state);
                true
            }
            None => false,
        }
    }

    pub fn press(&self, binding: &str) -> bool {
        self.fire(binding, KeyState::Pressed)
    }
}

impl ShortcutBackend for FakeBackend {
    fn register(&self, binding: &ShortcutBinding, handler: HotkeyHandler) -> HotkeyResult<()> {
        self.log.push(Call::Register(binding.raw().to_string()));
        let mut inner = self.inner.lock().unwrap();

        if inner.rejected.contains(binding.raw()) {
            return Err(HotkeyError::RegistrationFailed {
                hotkey: binding.raw().to_string(),
                reason: "occupied by another application".to_string(),
            });
        }
        if inner.registered.contains_key(binding.raw()) {
            return Err(HotkeyError::RegistrationFailed {
                hotkey: binding.raw().to_string(),
                reason: "already registered".to_string(),
            });
        }

        inner
            .registered
            .insert(binding.raw().to_string(), Some(handler));
        Ok(())
    }

    fn unregister(&self, binding: &ShortcutBinding) -> HotkeyResult<()> {
        self.log.push(Call::Unregister(binding.raw().to_string()));

        match self.inner.lock().unwrap().registered.remove(binding.raw()) {
            Some(_) => Ok(()),
            None => Err(HotkeyError::UnregistrationFailed {
                hotkey: binding.raw().to_string(),
                reason: "not registered".to_string(),
            }),
        }
    }

    fn is_registered(&self, binding: &ShortcutBinding) -> HotkeyResult<bool> {
        self.log.push(Call::IsRegistered(binding.raw().to_string()));
        Ok(self.inner.lock().unwrap().registered.contains_key(binding.raw()))
    }
}

#[derive(Default)]
struct StoreInner {
    memory: HashMap<String, Value>,
    disk: HashMap<String, Value>,
    open_error: Option<StoreError>,
    save_error: Option<StoreError>,
    opens: usize,
}

/// 假的设置存储
#[derive(Clone, Default)]
pub struct FakeStore {
    inner: Arc<Mutex<StoreInner>>,
    log: CallLog,
}

impl FakeStore {
    pub fn new(log: CallLog) -> Self {
        Self {
            inner: Arc::default(),
            log,
        }
    }

    /// 预先写入磁盘的值
    pub fn with_saved(self, key: &str, value: Value) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.disk.insert(key.to_string(), value.clone());
            inner.memory.insert(key.to_string(), value);
        }
        self
    }

    pub fn fail_open(&self, error: StoreError) {
        self.inner.lock().unwrap().open_error = Some(error);
    }

    pub fn fail_save(&self, error: StoreError) {
        self.inner.lock().unwrap().save_error = Some(error);
    }

    pub fn heal(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.open_error = None;
        inner.save_error = None;
    }

    pub fn saved(&self, key: &str) -> Option<Value> {
        self.inner.lock().unwrap().disk.get(key).cloned()
    }

    pub fn opens(&self) -> usize {
        self.inner.lock().unwrap().opens
    }
}

impl SettingsStore for FakeStore {
    fn open(&self) -> StoreResult<()> {
        self.log.push(Call::StoreOpen);
        let mut inner = self.inner.lock().unwrap();
        inner.opens += 1;

        match inner.open_error.clone() {
            Some(e) => Err(e),
            None => {
                inner.memory = inner.disk.clone();
                Ok(())
            }
        }
    }

    fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        self.log.push(Call::StoreGet(key.to_string()));
        Ok(self.inner.lock().unwrap().memory.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> StoreResult<()> {
        self.log.push(Call::StoreSet(key.to_string(), value.clone()));
        self.inner
            .lock()
            .unwrap()
            .memory
            .insert(key.to_string(), value);
        Ok(())
    }

    fn save(&self) -> StoreResult<()> {
        self.log.push(Call::StoreSave);
        let mut inner = self.inner.lock().unwrap();

        if let Some(e) = inner.save_error.clone() {
            return Err(e);
        }
        inner.disk = inner.memory.clone();
        Ok(())
    }
}

pub type FakeCoordinator = ShortcutCoordinator<FakeBackend, FakeStore>;

/// 测试夹具：协调器及其假依赖
pub struct Fixture {
    pub coordinator: Arc<FakeCoordinator>,
    pub backend: FakeBackend,
    pub store: FakeStore,
    pub log: CallLog,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_store(|store| store)
    }

    pub fn with_store(configure: impl FnOnce(FakeStore) -> FakeStore) -> Self {
        let log = CallLog::default();
        let backend = FakeBackend::new(log.clone());
        let store = configure(FakeStore::new(log.clone()));
        let coordinator = Arc::new(ShortcutCoordinator::new(backend.clone(), store.clone()));

        Self {
            coordinator,
            backend,
            store,
            log,
        }
    }
}

pub fn binding(raw: &str) -> ShortcutBinding {
    ShortcutBinding::parse(raw).unwrap()
}

/// 让后台任务有机会运行
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}
