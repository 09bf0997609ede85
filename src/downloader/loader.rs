//! # 下载与解码模块
//!
//! ## 设计思路
//!
//! 单次 GET 拉取图片字节并解码为像素缓冲。不重试、不缓存，默认不设超时，
//! 任何失败都直接映射为 `ImageError` 返回。
//!
//! ## 实现思路
//!
//! - URL：空值 / 解析失败 / 非 HTTP(S) 直接拒绝。
//! - 下载：流式读取响应体，前若干字节做文件签名探测，尽早拒绝明确的非图片内容。
//! - 解码：放到阻塞线程池执行，避免占用异步工作线程。

use std::time::Duration;

use super::source::{DecodedImage, RawImageData};
use super::{DownloaderConfig, ImageError, ImageHandler};

const STREAM_SIGNATURE_PROBE_BYTES: usize = 4096;
const BUFFER_INITIAL_CAPACITY: usize = 16 * 1024;
const BUFFER_MAX_PREALLOC: u64 = 64 * 1024 * 1024;

impl ImageHandler {
    /// 按配置构建复用型 HTTP 客户端。
    pub(super) fn build_http_client(config: &DownloaderConfig) -> Result<reqwest::Client, ImageError> {
        let mut builder = reqwest::Client::builder();

        if let Some(secs) = config.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = config.download_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        builder
            .build()
            .map_err(|e| ImageError::Network(format!("无法创建 HTTP 客户端：{}", e)))
    }

    /// 下载并解码单张图片。
    pub async fn fetch(&self, url: &str) -> Result<DecodedImage, ImageError> {
        let raw = self.load_from_url(url).await?;
        self.decode_raw(raw).await
    }

    /// 从 URL 加载图片原始字节。
    pub(super) async fn load_from_url(&self, url: &str) -> Result<RawImageData, ImageError> {
        let parsed = Self::parse_image_url(url)?;
        let redacted = Self::redact_url_for_log(parsed.as_str());
        log::info!("🌐 开始下载图片 - URL: {}", redacted);

        let bytes = self.download(parsed).await?;

        Ok(RawImageData {
            bytes,
            source_hint: redacted,
        })
    }

    /// 在阻塞线程池中解码原始字节。
    pub(super) async fn decode_raw(&self, raw: RawImageData) -> Result<DecodedImage, ImageError> {
        let RawImageData { bytes, source_hint } = raw;
        let decoded = tokio::task::spawn_blocking(move || DecodedImage::decode(&bytes)).await??;

        log::info!(
            "✅ 图片解码成功 - 来源: {} 尺寸: {}x{}",
            source_hint,
            decoded.width(),
            decoded.height()
        );

        Ok(decoded)
    }

    fn parse_image_url(url: &str) -> Result<reqwest::Url, ImageError> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(ImageError::InvalidUrl("URL 不能为空".to_string()));
        }

        let parsed = reqwest::Url::parse(trimmed)
            .map_err(|e| ImageError::InvalidUrl(format!("URL 格式错误：{}", e)))?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ImageError::InvalidUrl(format!(
                "仅支持 HTTP/HTTPS，当前：{}",
                parsed.scheme()
            )));
        }

        Ok(parsed)
    }

    async fn download(&self, url: reqwest::Url) -> Result<Vec<u8>, ImageError> {
        log::debug!("📡 发送 HTTP 请求...");
        let raw_url = url.to_string();

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "image/avif,image/webp,image/apng,image/*,*/*;q=0.8")
            .send()
            .await
            .map_err(|e| Self::map_reqwest_error(e, &raw_url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageError::Network(format!(
                "HTTP {}: {}",
                status.as_u16(),
                Self::status_message(status.as_u16())
            )));
        }

        let initial_capacity = response
            .content_length()
            .map(|len| len.min(BUFFER_MAX_PREALLOC) as usize)
            .filter(|len| *len > 0)
            .unwrap_or(BUFFER_INITIAL_CAPACITY);
        let mut buffer = Vec::with_capacity(initial_capacity);
        let mut response = response;
        let mut signature_checked = false;

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| Self::map_reqwest_error(e, &raw_url))?
        {
            buffer.extend_from_slice(&chunk);

            if !signature_checked {
                signature_checked =
                    Self::probe_image_signature(&buffer, STREAM_SIGNATURE_PROBE_BYTES)?;
            }
        }

        log::debug!("✅ 下载完成 - {} bytes", buffer.len());
        Ok(buffer)
    }

    /// 流式下载阶段的签名探测：尽早拒绝明确的非图片内容。
    ///
    /// 返回值：
    /// - `Ok(true)`：探测结束（已识别为图片，或已达探测上限交给解码器判断）
    /// - `Ok(false)`：当前字节不足以判断，继续下载
    /// - `Err(...)`：已识别为非图片
    fn probe_image_signature(bytes: &[u8], probe_limit: usize) -> Result<bool, ImageError> {
        if bytes.is_empty() {
            return Ok(false);
        }

        if let Some(kind) = infer::get(bytes) {
            if kind.matcher_type() != infer::MatcherType::Image {
                return Err(ImageError::Decode(format!(
                    "下载内容不是图片类型：{}",
                    kind.mime_type()
                )));
            }
            return Ok(true);
        }

        Ok(bytes.len() >= probe_limit)
    }

    /// 统一映射 reqwest 错误。
    fn map_reqwest_error(e: reqwest::Error, url: &str) -> ImageError {
        let err_msg = Self::sanitize_error_message_with_redacted_url(&e.to_string(), url);

        if e.is_timeout() {
            ImageError::Network(format!("下载超时：{}", err_msg))
        } else if e.is_connect() {
            ImageError::Network(format!("无法连接：{}", err_msg))
        } else if e.is_body() || e.is_decode() {
            ImageError::Network(format!("下载数据流读取失败：{}", err_msg))
        } else {
            ImageError::Network(format!("请求失败：{}", err_msg))
        }
    }

    pub(super) fn redact_url_for_log(url: &str) -> String {
        let Ok(parsed) = reqwest::Url::parse(url) else {
            return "<invalid-url>".to_string();
        };

        let host = parsed.host_str().unwrap_or("<unknown-host>");
        let port = parsed.port().map(|p| format!(":{}", p)).unwrap_or_default();
        let path = parsed.path();

        format!("{}://{}{}{}", parsed.scheme(), host, port, path)
    }

    fn sanitize_error_message_with_redacted_url(error_msg: &str, url: &str) -> String {
        let redacted = Self::redact_url_for_log(url);
        error_msg.replace(url, &redacted)
    }

    /// 常见 HTTP 状态码本地化文案。
    fn status_message(code: u16) -> &'static str {
        match code {
            404 => "未找到",
            403 => "访问被拒绝",
            500..=599 => "服务器错误",
            _ => "请求失败",
        }
    }
}
