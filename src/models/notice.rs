//! 提示消息
//!
//! 上传后重定向时，消息通过 cookie 带到下一次页面渲染

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// 提示消息 cookie 名称
pub const FLASH_COOKIE: &str = "flash_notices";

/// 消息级别
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Warning,
    Info,
    Error,
}

impl NoticeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeLevel::Success => "success",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Info => "info",
            NoticeLevel::Error => "error",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(NoticeLevel::Success),
            "warning" => Some(NoticeLevel::Warning),
            "info" => Some(NoticeLevel::Info),
            "error" => Some(NoticeLevel::Error),
            _ => None,
        }
    }
}

/// 一次性提示消息
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }
}

/// 编码为 cookie 值，格式: level=message&level=message
pub fn encode_notices(notices: &[Notice]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for notice in notices {
        serializer.append_pair(notice.level.as_str(), &notice.message);
    }
    serializer.finish()
}

/// 解析 cookie 值，无法识别的级别直接忽略
pub fn decode_notices(value: &str) -> Vec<Notice> {
    form_urlencoded::parse(value.as_bytes())
        .filter_map(|(level, message)| {
            NoticeLevel::parse(&level).map(|level| Notice::new(level, message.into_owned()))
        })
        .collect()
}
