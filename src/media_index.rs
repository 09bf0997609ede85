//! 媒体索引通知模块
//!
//! # 设计思路
//!
//! 图片写入共享图片目录后，平台的媒体库不会立即感知新文件。
//! 宿主通过实现 `MediaIndexHost` 接入平台的媒体扫描能力，下载器在每次保存成功后通知一次。
//!
//! # 实现思路
//!
//! - 通知是“发出即返回”，扫描结果不回传，也不影响保存结果。
//! - 通知在阻塞线程池中、文件写完之后调用，宿主实现可以做同步 I/O。
//! - 未挂接宿主时不做任何事。

use std::path::Path;

/// 平台媒体索引能力。
pub trait MediaIndexHost: Send + Sync {
    /// 通知平台扫描新写入的文件。
    fn scan(&self, path: &Path);
}

#[cfg(test)]
pub(crate) mod testing {
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    use super::MediaIndexHost;

    /// 记录每次扫描请求的宿主实现。
    #[derive(Default)]
    pub(crate) struct RecordingMediaIndex {
        pub(crate) scanned: Mutex<Vec<PathBuf>>,
    }

    impl MediaIndexHost for RecordingMediaIndex {
        fn scan(&self, path: &Path) {
            self.scanned
                .lock()
                .expect("media index lock poisoned")
                .push(path.to_path_buf());
        }
    }
}
