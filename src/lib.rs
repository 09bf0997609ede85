//! # NASA 图片下载器 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 宿主程序（组合根）                        │
//! │                                                          │
//! │  PermissionGate ── 确认已授权                             │
//! │       ↓                                                  │
//! │  NasaDownloader ── download_image_from_url / save_bitmap │
//! └───────┼──────────────────────────────────────────────────┘
//!         ↓ Result<SavedFile, ImageError>
//! ┌───────┼──────────────────────────────────────────────────┐
//! │  ┌─ downloader ── 下载 · 解码 · 编码 · 写盘              │
//! │  ├─ media_index ─ 保存后通知平台媒体索引                  │
//! │  ├─ permission ── 平台版本分支的权限策略                  │
//! │  └─ storage ───── 图片目录解析与自动创建                  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`downloader`] | 从 URL 下载图片或接收内存图片，按 JPEG/PNG/WEBP 编码后写入图片目录 |
//! | [`media_index`] | 宿主挂接的媒体索引通知，每次保存成功后调用一次 |
//! | [`permission`] | 按平台版本选择所需存储权限，查询与发起授权请求 |
//! | [`storage`] | 图片根目录与保存目录的解析、按需创建 |

pub mod downloader;
pub mod media_index;
pub mod permission;
pub mod storage;

pub use downloader::{
    persist, DecodedImage, DownloaderConfig, ImageError, NasaDownloader, SaveFormat, SavedFile,
};
pub use media_index::MediaIndexHost;
pub use permission::{PermissionGate, PermissionHost, StorageAccessStrategy};
