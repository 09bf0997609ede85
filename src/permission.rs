//! 存储权限检查模块
//!
//! # 设计思路
//!
//! 写入共享图片目录需要平台授权，而所需权限随平台版本不同：
//! - 新版本（API ≥ 33）只需要“读取媒体图片”权限
//! - 旧版本需要“读 + 写外部存储”两项权限
//!
//! 版本分支只在构造 `PermissionGate` 时探测一次，选出 `StorageAccessStrategy`，
//! 调用点不再散落条件判断。
//!
//! # 实现思路
//!
//! - `PermissionHost` 抽象平台能力（版本号、查询授权、发起授权请求），宿主实现它。
//! - `request_permissions` 只发起请求立即返回，授权结果由平台回调通知宿主，
//!   宿主收到回调后应重新调用 `is_permissions_granted`。
//! - 本模块不重试、不升级请求；下载器本身也不强制检查权限。

use crate::downloader::ImageError;

/// 启用分区媒体权限的平台版本。
pub const SCOPED_MEDIA_API_LEVEL: u32 = 33;

/// 发起授权请求时使用的固定请求码。
pub const PERMISSION_REQUEST_CODE: i32 = 453;

pub const READ_MEDIA_IMAGES: &str = "android.permission.READ_MEDIA_IMAGES";
pub const READ_EXTERNAL_STORAGE: &str = "android.permission.READ_EXTERNAL_STORAGE";
pub const WRITE_EXTERNAL_STORAGE: &str = "android.permission.WRITE_EXTERNAL_STORAGE";

/// 平台权限能力。
pub trait PermissionHost {
    /// 平台 API 版本号。
    fn api_level(&self) -> u32;

    /// 查询单项权限是否已授予。
    fn is_granted(&self, permission: &str) -> bool;

    /// 发起授权请求，立即返回。
    fn request(&self, permissions: &[&'static str], request_code: i32);
}

/// 存储访问策略。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageAccessStrategy {
    ScopedMedia,
    LegacyStorage,
}

impl StorageAccessStrategy {
    pub fn probe(api_level: u32) -> Self {
        if api_level >= SCOPED_MEDIA_API_LEVEL {
            Self::ScopedMedia
        } else {
            Self::LegacyStorage
        }
    }

    pub fn required_permissions(self) -> &'static [&'static str] {
        match self {
            Self::ScopedMedia => &[READ_MEDIA_IMAGES],
            Self::LegacyStorage => &[READ_EXTERNAL_STORAGE, WRITE_EXTERNAL_STORAGE],
        }
    }
}

/// 权限闸门。
pub struct PermissionGate<H> {
    host: H,
    strategy: StorageAccessStrategy,
}

impl<H: PermissionHost> PermissionGate<H> {
    pub fn new(host: H) -> Self {
        let strategy = StorageAccessStrategy::probe(host.api_level());
        log::debug!(
            "🔐 权限策略: {:?}（api_level={}）",
            strategy,
            host.api_level()
        );
        Self { host, strategy }
    }

    pub fn strategy(&self) -> StorageAccessStrategy {
        self.strategy
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// 所需权限是否全部已授予。
    pub fn is_permissions_granted(&self) -> bool {
        self.strategy
            .required_permissions()
            .iter()
            .all(|permission| self.host.is_granted(permission))
    }

    /// 发起授权请求（不等待结果）。
    pub fn request_permissions(&self) {
        let permissions = self.strategy.required_permissions();
        log::info!("🔐 请求存储权限: {:?}", permissions);
        self.host.request(permissions, PERMISSION_REQUEST_CODE);
    }

    /// 未授权时返回 `PermissionDenied`，便于调用方用 `?` 提前退出。
    pub fn ensure_granted(&self) -> Result<(), ImageError> {
        let missing: Vec<&str> = self
            .strategy
            .required_permissions()
            .iter()
            .copied()
            .filter(|permission| !self.host.is_granted(permission))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ImageError::PermissionDenied(format!(
                "缺少权限：{}",
                missing.join(", ")
            )))
        }
    }
}
