//! # 图片下载保存模块（downloader）
//!
//! ## 设计思路
//!
//! 将“下载 → 解码 → 编码 → 写盘”按职责拆分为多个子模块，避免单文件膨胀与耦合。
//!
//! - `service`：对外门面 `NasaDownloader`（可注入实例 + 兼容用共享实例）
//! - `handler`：编排整条处理流水线
//! - `loader`：负责 URL 校验、下载与解码
//! - `writer`：负责编码、文件命名与写盘
//! - `format`：输出格式目录
//! - `config/error/source`：配置、错误、中间数据模型
//!
//! ## 新同事快速上手
//!
//! ```text
//! 宿主程序
//!    ↓
//! service.rs（NasaDownloader，返回 Result<SavedFile, ImageError>）
//!    ↓
//! handler.rs（统一编排 + 阶段耗时日志）
//!    ├─ loader.rs（URL 校验 + 流式下载 + 签名探测 + 解码）
//!    └─ writer.rs（编码 + 时间戳命名 + 写盘）
//! ```
//!
//! 权限检查不在本模块内强制执行，调用方需先通过 `permission::PermissionGate` 确认。

mod config;
mod error;
mod format;
mod handler;
mod loader;
mod service;
mod source;
mod writer;

pub use config::{DownloaderConfig, DEFAULT_IMAGE_QUALITY, DEFAULT_SAVE_DIR_NAME, MAX_IMAGE_QUALITY};
pub use error::ImageError;
pub use format::SaveFormat;
pub use service::NasaDownloader;
pub use source::{DecodedImage, SavedFile};
pub use writer::{effective_quality, persist};

/// 内部核心编排器，外部通过 `NasaDownloader` 使用。
pub use handler::ImageHandler;
