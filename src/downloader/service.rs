//! # 服务层（对外门面）
//!
//! ## 设计思路
//!
//! `NasaDownloader` 由调用方（组合根）显式构造并持有，替代全局单例：
//! 1. 生命周期清晰，由宿主程序统一管理
//! 2. 测试可创建独立实例，互不干扰
//! 3. 允许多个不同配置的实例并存
//!
//! 为兼容旧用法保留 `get_instance`：进程内首次调用的配置生效，之后的调用拿到同一实例。
//!
//! ## 实现思路
//!
//! - 两个入口：`download_image_from_url` 与 `save_bitmap`，各自返回一个 `Result`，
//!   每次调用恰好产生一个结果。
//! - 阻塞工作在后台线程池执行，结果回到调用方 `await` 的任务中。
//! - `spawn_*` 变体把整个调用派发到运行时，返回 `JoinHandle`。
//! - 不跟踪进行中的请求，不去重，不可取消；单次失败不影响实例后续使用。

use std::path::Path;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tokio::task::JoinHandle;

use super::source::{DecodedImage, SavedFile};
use super::{DownloaderConfig, ImageError, ImageHandler, SaveFormat};
use crate::media_index::MediaIndexHost;

static SHARED_INSTANCE: OnceCell<NasaDownloader> = OnceCell::new();

/// 图片下载与保存服务。
///
/// 克隆开销很小，内部共享同一个 `ImageHandler`。
#[derive(Clone)]
pub struct NasaDownloader {
    handler: Arc<ImageHandler>,
}

impl NasaDownloader {
    /// 使用默认配置创建服务（目录 `NasaDownloader`、质量 `100`）。
    pub fn new() -> Result<Self, ImageError> {
        Self::with_config(DownloaderConfig::default())
    }

    /// 使用自定义配置创建服务。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use nasa_downloader::{DownloaderConfig, NasaDownloader};
    ///
    /// let downloader = NasaDownloader::with_config(DownloaderConfig::new("Test", 80))?;
    /// # Ok::<(), nasa_downloader::ImageError>(())
    /// ```
    pub fn with_config(config: DownloaderConfig) -> Result<Self, ImageError> {
        Ok(Self {
            handler: Arc::new(ImageHandler::new(config)?),
        })
    }

    /// 使用自定义配置创建服务，并挂接媒体索引宿主。
    ///
    /// 每次保存成功后，宿主的 `scan` 会收到新文件路径一次。
    pub fn with_media_index(
        config: DownloaderConfig,
        host: Arc<dyn MediaIndexHost>,
    ) -> Result<Self, ImageError> {
        Ok(Self {
            handler: Arc::new(ImageHandler::new(config)?.with_media_index(host)),
        })
    }

    /// 进程级共享实例。
    ///
    /// 首次调用使用传入配置构造；之后的调用忽略传入配置，返回同一实例。
    /// 构造失败不会占用共享槽位，下次调用会重新尝试。
    pub fn get_instance(config: DownloaderConfig) -> Result<&'static NasaDownloader, ImageError> {
        let mut requested = Some(config);
        let instance = SHARED_INSTANCE.get_or_try_init(|| {
            let config = requested.take().unwrap_or_default();
            log::info!(
                "🧩 初始化共享下载器 - 目录: {} 质量: {}",
                config.save_dir_name,
                config.image_quality
            );
            Self::with_config(config)
        })?;

        if let Some(ignored) = requested {
            if &ignored != instance.config() {
                log::debug!("共享下载器已初始化，忽略新的配置：{:?}", ignored);
            }
        }

        Ok(instance)
    }

    pub fn config(&self) -> &DownloaderConfig {
        self.handler.config()
    }

    /// 图片最终写入的目录。
    pub fn save_dir(&self) -> &Path {
        self.handler.save_dir()
    }

    /// 下载 URL 指向的图片，按 `format` 重新编码后保存。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use nasa_downloader::{NasaDownloader, SaveFormat};
    ///
    /// # async fn demo() -> Result<(), nasa_downloader::ImageError> {
    /// let downloader = NasaDownloader::new()?;
    /// let saved = downloader
    ///     .download_image_from_url("https://example.com/a.png", SaveFormat::Jpeg)
    ///     .await?;
    /// println!("{}", saved.path().display());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn download_image_from_url(
        &self,
        url: &str,
        format: SaveFormat,
    ) -> Result<SavedFile, ImageError> {
        self.handler
            .download_and_save(url, format)
            .await
            .inspect_err(|err| log::debug!("下载保存失败 [{}]: {}", err.code(), err))
    }

    /// 保存一张已解码的内存图片。
    pub async fn save_bitmap(
        &self,
        image: DecodedImage,
        format: SaveFormat,
    ) -> Result<SavedFile, ImageError> {
        self.handler
            .save_decoded(image, format)
            .await
            .inspect_err(|err| log::debug!("内存图片保存失败 [{}]: {}", err.code(), err))
    }

    /// 把下载任务派发到当前 tokio 运行时。
    ///
    /// 必须在运行时上下文中调用。
    pub fn spawn_download_from_url(
        &self,
        url: impl Into<String>,
        format: SaveFormat,
    ) -> JoinHandle<Result<SavedFile, ImageError>> {
        let handler = Arc::clone(&self.handler);
        let url = url.into();
        tokio::spawn(async move { handler.download_and_save(&url, format).await })
    }

    /// 把内存图片保存任务派发到当前 tokio 运行时。
    pub fn spawn_save_bitmap(
        &self,
        image: DecodedImage,
        format: SaveFormat,
    ) -> JoinHandle<Result<SavedFile, ImageError>> {
        let handler = Arc::clone(&self.handler);
        tokio::spawn(async move { handler.save_decoded(image, format).await })
    }
}
