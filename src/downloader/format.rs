//! # 输出格式目录
//!
//! 固定的三种输出格式，每种映射到文件扩展名与 `image` crate 的编码器标识。
//! 纯查表，无状态、无错误分支。

use super::ImageError;

/// 支持的保存格式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaveFormat {
    Jpeg,
    Png,
    Webp,
}

impl SaveFormat {
    pub const ALL: [SaveFormat; 3] = [SaveFormat::Jpeg, SaveFormat::Png, SaveFormat::Webp];

    /// 文件扩展名（含前导点）。
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => ".jpg",
            Self::Png => ".png",
            Self::Webp => ".webp",
        }
    }

    /// 编码器标识。
    pub fn encoder(self) -> image::ImageFormat {
        match self {
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Png => image::ImageFormat::Png,
            Self::Webp => image::ImageFormat::WebP,
        }
    }

    /// 是否为有损编码；只有有损编码会使用质量参数。
    pub fn is_lossy(self) -> bool {
        matches!(self, Self::Jpeg)
    }

    /// 从外部字符串解析格式。
    ///
    /// # 示例
    /// ```rust
    /// use nasa_downloader::SaveFormat;
    ///
    /// assert_eq!(SaveFormat::parse("JPG")?, SaveFormat::Jpeg);
    /// # Ok::<(), nasa_downloader::ImageError>(())
    /// ```
    pub fn parse(format: &str) -> Result<Self, ImageError> {
        match format.trim().trim_start_matches('.').to_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "webp" => Ok(Self::Webp),
            other => Err(ImageError::InvalidConfig(format!(
                "未知图片格式：{}（可选：jpeg / png / webp）",
                other
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }
}

impl std::fmt::Display for SaveFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
