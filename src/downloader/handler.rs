//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `ImageHandler` 只负责流程编排，不关心调用方运行在什么上下文。
//! 处理链路固定为：
//! 1. 下载原始字节（仅 URL 路径）
//! 2. 解码为像素缓冲
//! 3. 编码并写盘
//!
//! ## 实现思路
//!
//! - 配置在构造时校验并冻结，之后只读，可被并发调用安全共享。
//! - 解码、编码、写盘都放到 `spawn_blocking`，网络读取走异步客户端。
//! - 记录 `load/decode/write/total` 阶段耗时，便于性能诊断。

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use super::source::{DecodedImage, SavedFile};
use super::{writer, DownloaderConfig, ImageError, SaveFormat};
use crate::media_index::MediaIndexHost;
use crate::storage;

/// 图片处理器。
///
/// 封装了冻结的配置、保存目录与 HTTP 客户端，并编排各子模块实现完整流程。
pub struct ImageHandler {
    pub(super) config: DownloaderConfig,
    pub(super) client: reqwest::Client,
    pub(super) save_dir: PathBuf,
    pub(super) media_index: Option<Arc<dyn MediaIndexHost>>,
}

impl ImageHandler {
    /// 根据配置创建处理器。
    ///
    /// 这里同时构建复用型 HTTP 客户端，减少每次请求的初始化开销。
    /// 保存目录只解析不创建，首次写入时才会创建。
    pub fn new(config: DownloaderConfig) -> Result<Self, ImageError> {
        config.validate()?;
        let save_dir = storage::resolve_save_dir(&config)?;
        let client = Self::build_http_client(&config)?;

        log::debug!(
            "⚙️ 图片处理器已创建 - 目录: {} 质量: {}",
            save_dir.display(),
            config.image_quality
        );

        Ok(Self {
            config,
            client,
            save_dir,
            media_index: None,
        })
    }

    /// 挂接媒体索引宿主，每次保存成功后通知一次。
    pub fn with_media_index(mut self, host: Arc<dyn MediaIndexHost>) -> Self {
        self.media_index = Some(host);
        self
    }

    pub fn config(&self) -> &DownloaderConfig {
        &self.config
    }

    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    /// URL 路径：下载 → 解码 → 编码 → 写盘。
    pub async fn download_and_save(
        &self,
        url: &str,
        format: SaveFormat,
    ) -> Result<SavedFile, ImageError> {
        let total_start = Instant::now();

        let load_start = Instant::now();
        let raw = self.load_from_url(url).await?;
        let load_elapsed = load_start.elapsed();

        let decode_start = Instant::now();
        let decoded = self.decode_raw(raw).await?;
        let decode_elapsed = decode_start.elapsed();

        let write_start = Instant::now();
        let saved = self.write_off_thread(decoded, format).await?;
        let write_elapsed = write_start.elapsed();

        log::info!(
            "✅ URL 图片处理完成 - load={}ms decode={}ms write={}ms total={}ms",
            load_elapsed.as_millis(),
            decode_elapsed.as_millis(),
            write_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(saved)
    }

    /// 内存图片路径：编码 → 写盘。
    pub async fn save_decoded(
        &self,
        image: DecodedImage,
        format: SaveFormat,
    ) -> Result<SavedFile, ImageError> {
        let write_start = Instant::now();
        let saved = self.write_off_thread(image, format).await?;

        log::info!(
            "✅ 内存图片保存完成 - write={}ms",
            write_start.elapsed().as_millis()
        );

        Ok(saved)
    }

    async fn write_off_thread(
        &self,
        image: DecodedImage,
        format: SaveFormat,
    ) -> Result<SavedFile, ImageError> {
        let directory = self.save_dir.clone();
        let quality = self.config.image_quality;
        let media_index = self.media_index.clone();

        tokio::task::spawn_blocking(move || {
            let saved = writer::persist(image, format, &directory, quality)?;
            if let Some(host) = media_index {
                log::debug!("🔎 通知媒体索引: {}", saved.path().display());
                host.scan(saved.path());
            }
            Ok(saved)
        })
        .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media_index::testing::RecordingMediaIndex;
    use image::{GenericImageView, ImageBuffer, Rgba};

    fn handler_in(root: &Path) -> ImageHandler {
        ImageHandler::new(DownloaderConfig::new("Test", 80).with_pictures_root(root))
            .expect("handler init failed")
    }

    fn black_pixels() -> DecodedImage {
        DecodedImage::from(ImageBuffer::from_pixel(3, 3, Rgba([0u8, 0, 0, 255])))
    }

    #[test]
    fn new_rejects_invalid_config() {
        let result = ImageHandler::new(DownloaderConfig::new("Test", 120));
        assert!(matches!(result, Err(ImageError::InvalidConfig(_))));
    }

    #[test]
    fn new_does_not_create_save_dir() {
        let temp = tempfile::tempdir().expect("tempdir");
        let handler = handler_in(temp.path());

        assert_eq!(handler.save_dir(), temp.path().join("Test"));
        assert!(!handler.save_dir().exists());
    }

    #[tokio::test]
    async fn save_decoded_writes_under_save_dir() {
        let temp = tempfile::tempdir().expect("tempdir");
        let handler = handler_in(temp.path());
        let image = DecodedImage::from(ImageBuffer::from_pixel(12, 9, Rgba([10u8, 20, 30, 255])));

        let saved = handler
            .save_decoded(image, SaveFormat::Webp)
            .await
            .expect("save should succeed");

        assert!(saved.path().starts_with(temp.path().join("Test")));
        assert!(saved.path().to_string_lossy().ends_with(".webp"));
        assert_eq!(image::open(saved.path()).expect("re-decode").dimensions(), (12, 9));
    }

    #[tokio::test]
    async fn media_index_is_notified_once_per_successful_save() {
        let temp = tempfile::tempdir().expect("tempdir");
        let index = Arc::new(RecordingMediaIndex::default());
        let handler = handler_in(temp.path()).with_media_index(index.clone());

        let first = handler
            .save_decoded(black_pixels(), SaveFormat::Png)
            .await
            .expect("first save");
        let second = handler
            .save_decoded(black_pixels(), SaveFormat::Jpeg)
            .await
            .expect("second save");

        let scanned = index.scanned.lock().expect("lock").clone();
        assert_eq!(scanned, vec![first.into_path(), second.into_path()]);
    }

    #[tokio::test]
    async fn media_index_is_not_notified_when_save_fails() {
        let temp = tempfile::tempdir().expect("tempdir");
        std::fs::write(temp.path().join("Test"), b"not a dir").expect("write blocker");
        let index = Arc::new(RecordingMediaIndex::default());
        let handler = handler_in(temp.path()).with_media_index(index.clone());

        let result = handler
            .save_decoded(black_pixels(), SaveFormat::Png)
            .await;

        assert!(matches!(result, Err(ImageError::Storage(_))));
        assert!(index.scanned.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn download_and_save_rejects_invalid_url_without_touching_disk() {
        let temp = tempfile::tempdir().expect("tempdir");
        let handler = handler_in(temp.path());

        let result = handler.download_and_save("", SaveFormat::Jpeg).await;

        assert!(matches!(result, Err(ImageError::InvalidUrl(_))));
        assert!(!handler.save_dir().exists());
    }
}
