//! 热键绑定模块
//!
//! 定义全局热键的编码形式与显示形式

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::{HotkeyError, HotkeyResult};

/// 默认全局热键
pub const DEFAULT_SHORTCUT: &str = "CommandOrControl+E";

/// 编码形式中的分隔符
pub const TOKEN_DELIMITER: char = '+';

/// 已知按键记号对应的显示符号
const DISPLAY_GLYPHS: &[(&str, &str)] = &[
    ("CommandOrControl", "⌘"),
    ("Control", "⌃"),
    ("Option", "⌥"),
    ("Shift", "⇧"),
    ("ENTER", "↵"),
    ("SPACE", "⎵"),
];

/// 用户配置的全局热键
///
/// 以原生注册接口接受的字符串形式保存（例如 `"CommandOrControl+E"`），
/// 序列化时同样是这个字符串。
///
/// # Examples
///
/// ```
/// use focuskeeper_lib::hotkey::ShortcutBinding;
///
/// let binding: ShortcutBinding = "CommandOrControl+Shift+K".parse().unwrap();
/// assert_eq!(binding.display_parts(), vec!["⌘", "⇧", "K"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShortcutBinding {
    raw: String,
}

impl ShortcutBinding {
    /// 解析编码形式的热键
    ///
    /// 拒绝空字符串和空记号（例如 `"Shift+"`）
    pub fn parse(raw: &str) -> HotkeyResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() || raw.split(TOKEN_DELIMITER).any(|t| t.trim().is_empty()) {
            return Err(HotkeyError::InvalidFormat(raw.to_string()));
        }

        let raw = raw
            .split(TOKEN_DELIMITER)
            .map(str::trim)
            .collect::<Vec<_>>()
            .join("+");

        Ok(Self { raw })
    }

    /// 获取编码形式
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// 按顺序返回各个按键记号
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.raw.split(TOKEN_DELIMITER)
    }

    /// 获取显示形式
    ///
    /// 已知修饰键映射为符号，未知记号原样保留
    pub fn display_parts(&self) -> Vec<String> {
        self.tokens().map(|t| display_glyph(t).to_string()).collect()
    }

    /// 获取拼接后的显示字符串（例如 `"⌘E"`）
    pub fn display(&self) -> String {
        self.display_parts().concat()
    }
}

/// 将单个按键记号映射为显示符号
pub fn display_glyph(token: &str) -> &str {
    DISPLAY_GLYPHS
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, glyph)| *glyph)
        .unwrap_or(token)
}

impl Default for ShortcutBinding {
    fn default() -> Self {
        Self {
            raw: DEFAULT_SHORTCUT.to_string(),
        }
    }
}

impl FromStr for ShortcutBinding {
    type Err = HotkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ShortcutBinding {
    type Error = HotkeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ShortcutBinding> for String {
    fn from(binding: ShortcutBinding) -> Self {
        binding.raw
    }
}

impl fmt::Display for ShortcutBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
