//! # 配置模块
//!
//! ## 设计思路
//!
//! 所有可调参数集中到 `DownloaderConfig`，由调用方（组合根）构造并持有，
//! 交给 `NasaDownloader` 后即不可变。
//!
//! ## 实现思路
//!
//! - `Default` 给出与旧版单例一致的默认值：目录 `NasaDownloader`、质量 `100`。
//! - 支持从 JSON 文件加载，缺省字段回落到默认值。
//! - `validate` 在构造下载器前统一校验，越界质量直接拒绝而不是静默截断。

use std::fs;
use std::path::{Component, Path, PathBuf};

use super::ImageError;

pub const DEFAULT_SAVE_DIR_NAME: &str = "NasaDownloader";
pub const DEFAULT_IMAGE_QUALITY: u8 = 100;
pub const MAX_IMAGE_QUALITY: u8 = 100;

/// 下载器配置。
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DownloaderConfig {
    /// 图片根目录下的子目录名，只允许单级目录。
    pub save_dir_name: String,
    /// 输出质量（0~100），仅有损格式生效。
    pub image_quality: u8,
    /// 覆盖系统图片目录；为空时使用平台默认图片目录。
    pub pictures_root: Option<PathBuf>,
    /// 建立连接超时（秒）；为空表示不设置。
    pub connect_timeout_secs: Option<u64>,
    /// 整个下载请求的超时（秒）；为空表示不设置。
    pub download_timeout_secs: Option<u64>,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            save_dir_name: DEFAULT_SAVE_DIR_NAME.to_string(),
            image_quality: DEFAULT_IMAGE_QUALITY,
            pictures_root: None,
            connect_timeout_secs: None,
            download_timeout_secs: None,
        }
    }
}

impl DownloaderConfig {
    /// 按目录名与质量创建配置，其余字段取默认值。
    ///
    /// # 示例
    /// ```rust
    /// use nasa_downloader::DownloaderConfig;
    ///
    /// let config = DownloaderConfig::new("Test", 80);
    /// config.validate()?;
    /// # Ok::<(), nasa_downloader::ImageError>(())
    /// ```
    pub fn new(save_dir_name: impl Into<String>, image_quality: u8) -> Self {
        Self {
            save_dir_name: save_dir_name.into(),
            image_quality,
            ..Self::default()
        }
    }

    pub fn with_pictures_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.pictures_root = Some(root.into());
        self
    }

    /// 从 JSON 文件加载配置并校验。
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ImageError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ImageError::InvalidConfig(format!("无法读取配置文件 '{}'：{}", path.display(), e))
        })?;

        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ImageError> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| ImageError::InvalidConfig(format!("解析配置失败：{}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// 校验配置合法性。
    pub fn validate(&self) -> Result<(), ImageError> {
        if self.image_quality > MAX_IMAGE_QUALITY {
            return Err(ImageError::InvalidConfig(format!(
                "image_quality 必须在 0~{} 之间，当前：{}",
                MAX_IMAGE_QUALITY, self.image_quality
            )));
        }

        let name = self.save_dir_name.trim();
        if name.is_empty() {
            return Err(ImageError::InvalidConfig("save_dir_name 不能为空".to_string()));
        }

        let mut components = Path::new(name).components();
        let single_normal = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !single_normal {
            return Err(ImageError::InvalidConfig(format!(
                "save_dir_name 只能是单级目录名：{}",
                self.save_dir_name
            )));
        }

        if matches!(self.connect_timeout_secs, Some(0)) || matches!(self.download_timeout_secs, Some(0)) {
            return Err(ImageError::InvalidConfig("超时时间必须大于 0 秒".to_string()));
        }

        Ok(())
    }
}
