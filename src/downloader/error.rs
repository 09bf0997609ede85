//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载“下载 → 解码 → 编码 → 写盘”链路中的所有错误来源，
//! 避免字符串拼接式错误处理。通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。
//!
//! 链路内部的任何失败都会原样返回给调用方，库本身不重试、不吞错。

/// 图片下载与保存统一错误类型。
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// 连接失败、HTTP 非 2xx、数据流读取中断、超时。
    #[error("网络错误：{0}")]
    Network(String),

    /// 响应体不是可解码的图片，或像素缓冲不合法。
    #[error("解码错误：{0}")]
    Decode(String),

    /// 目录创建、文件写入、编码输出失败。
    #[error("存储错误：{0}")]
    Storage(String),

    /// 调用方未获得写入共享图片目录的权限。
    #[error("权限不足：{0}")]
    PermissionDenied(String),

    #[error("URL 无效：{0}")]
    InvalidUrl(String),

    #[error("配置无效：{0}")]
    InvalidConfig(String),

    /// 后台阻塞任务异常退出（panic 或运行时关闭）。
    #[error("后台任务失败：{0}")]
    Task(String),
}

impl ImageError {
    /// 稳定的机器可读错误码，供宿主程序分支处理或展示。
    pub fn code(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Decode(_) => "decode",
            Self::Storage(_) => "storage",
            Self::PermissionDenied(_) => "permission_denied",
            Self::InvalidUrl(_) => "invalid_url",
            Self::InvalidConfig(_) => "invalid_config",
            Self::Task(_) => "task",
        }
    }
}

impl From<tokio::task::JoinError> for ImageError {
    fn from(error: tokio::task::JoinError) -> Self {
        Self::Task(error.to_string())
    }
}
