//! 图片存储目录管理模块
//!
//! # 设计思路
//!
//! 统一管理图片的持久化存储路径：`<系统图片目录>/<save_dir_name>`，
//! 支持通过配置覆盖根目录，并在写入前按需自动创建。
//!
//! # 实现思路
//!
//! - 优先使用配置中的 `pictures_root`。
//! - 未设置时使用平台图片目录（`dirs::picture_dir`），再回退到 `~/Pictures`。
//! - 路径解析与目录创建分离：构造下载器时只解析，真正写入时才创建。
//! - 所有可能失败的操作均返回 `Result`，不使用 `expect()` / `unwrap()`。

use std::fs;
use std::path::{Path, PathBuf};

use crate::downloader::{DownloaderConfig, ImageError};

/// 解析图片根目录。
pub fn resolve_pictures_root(override_root: Option<&Path>) -> Result<PathBuf, ImageError> {
    if let Some(root) = override_root {
        return Ok(root.to_path_buf());
    }

    if let Some(dir) = dirs::picture_dir() {
        return Ok(dir);
    }

    dirs::home_dir()
        .map(|home| home.join("Pictures"))
        .ok_or_else(|| ImageError::Storage("无法确定系统图片目录".to_string()))
}

/// 解析保存目录（不创建）。
pub fn resolve_save_dir(config: &DownloaderConfig) -> Result<PathBuf, ImageError> {
    let root = resolve_pictures_root(config.pictures_root.as_deref())?;
    Ok(root.join(config.save_dir_name.trim()))
}

/// 确保目录存在，必要时递归创建。
pub fn ensure_dir(path: &Path) -> Result<(), ImageError> {
    if path.is_dir() {
        return Ok(());
    }

    fs::create_dir_all(path).map_err(|e| {
        ImageError::Storage(format!("创建目录 '{}' 失败: {}", path.display(), e))
    })?;
    log::debug!("📂 已创建保存目录: {}", path.display());
    Ok(())
}
