//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入”和“流水线中间结果”解耦：
//! - `RawImageData` 表示已下载但未解码的字节
//! - `DecodedImage` 表示内存中的像素缓冲，由写盘阶段消费
//! - `SavedFile` 表示写盘结果，交给调用方后不再变更

use std::path::{Path, PathBuf};

use image::{DynamicImage, GenericImageView, RgbaImage};

use super::{ImageError, SaveFormat};

/// 下载阶段输出：原始字节与来源标识。
pub(crate) struct RawImageData {
    /// 原始图片字节。
    pub(crate) bytes: Vec<u8>,
    /// 来源提示（用于日志与诊断）。
    pub(crate) source_hint: String,
}

/// 已解码的像素缓冲。
///
/// 没有持久身份，归产生它的调用独占，交给写盘阶段后被消费。
#[derive(Debug, Clone)]
pub struct DecodedImage {
    inner: DynamicImage,
}

impl DecodedImage {
    /// 由 RGBA8 原始像素构建。
    ///
    /// `bytes` 长度必须等于 `width * height * 4`。
    pub fn from_rgba8(width: u32, height: u32, bytes: Vec<u8>) -> Result<Self, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::Decode(format!("图片尺寸无效：{}x{}", width, height)));
        }

        let actual = bytes.len();
        let buffer = RgbaImage::from_raw(width, height, bytes).ok_or_else(|| {
            ImageError::Decode(format!(
                "像素数据长度与尺寸不符：{}x{} 需要 {} 字节，实际 {} 字节",
                width,
                height,
                (width as u64) * (height as u64) * 4,
                actual
            ))
        })?;

        Ok(Self {
            inner: DynamicImage::ImageRgba8(buffer),
        })
    }

    /// 从内存中的已编码字节解码。
    pub fn decode(bytes: &[u8]) -> Result<Self, ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::Decode("图片内容为空".to_string()));
        }

        let inner = image::load_from_memory(bytes)
            .map_err(|e| ImageError::Decode(format!("图片解码失败：{}", e)))?;
        Ok(Self { inner })
    }

    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.inner.dimensions()
    }

    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.inner
    }

    pub fn into_dynamic(self) -> DynamicImage {
        self.inner
    }
}

impl From<DynamicImage> for DecodedImage {
    fn from(inner: DynamicImage) -> Self {
        Self { inner }
    }
}

impl From<RgbaImage> for DecodedImage {
    fn from(buffer: RgbaImage) -> Self {
        Self {
            inner: DynamicImage::ImageRgba8(buffer),
        }
    }
}

/// 写盘结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    path: PathBuf,
    format: SaveFormat,
    bytes_written: u64,
}

impl SavedFile {
    pub(crate) fn new(path: PathBuf, format: SaveFormat, bytes_written: u64) -> Self {
        Self {
            path,
            format,
            bytes_written,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }

    /// 文件名（`<毫秒时间戳><扩展名>`，冲突时带序号后缀）。
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|name| name.to_str())
    }

    pub fn format(&self) -> SaveFormat {
        self.format
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rgba8_accepts_matching_length() {
        let image = DecodedImage::from_rgba8(3, 2, vec![0; 3 * 2 * 4]).expect("valid buffer");
        assert_eq!(image.dimensions(), (3, 2));
    }

    #[test]
    fn from_rgba8_rejects_length_mismatch() {
        let result = DecodedImage::from_rgba8(3, 2, vec![0; 10]);
        assert!(matches!(result, Err(ImageError::Decode(_))));
    }

    #[test]
    fn from_rgba8_rejects_zero_dimension() {
        let result = DecodedImage::from_rgba8(0, 2, Vec::new());
        assert!(matches!(result, Err(ImageError::Decode(_))));
    }

    #[test]
    fn decode_rejects_empty_and_garbage() {
        assert!(matches!(DecodedImage::decode(&[]), Err(ImageError::Decode(_))));
        assert!(matches!(
            DecodedImage::decode(b"<html>not an image</html>"),
            Err(ImageError::Decode(_))
        ));
    }

    #[test]
    fn saved_file_exposes_file_name() {
        let saved = SavedFile::new(PathBuf::from("/tmp/Test/1700000000000.png"), SaveFormat::Png, 42);
        assert_eq!(saved.file_name(), Some("1700000000000.png"));
        assert_eq!(saved.format(), SaveFormat::Png);
        assert_eq!(saved.bytes_written(), 42);
    }
}
