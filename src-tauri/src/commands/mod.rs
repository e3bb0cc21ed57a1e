//! Tauri 命令模块
//!
//! 提供前端可调用的 Tauri 命令
//!
//! # 模块结构
//!
//! - `config` - 配置管理命令
//! - `navigation` - 前端导航状态上报命令
//! - `notification` - 通知生命周期上报命令
//! - `shortcut` - 全局热键命令

pub mod config;
pub mod navigation;
pub mod notification;
pub mod shortcut;

pub use config::*;
pub use navigation::*;
pub use notification::*;
pub use shortcut::*;
