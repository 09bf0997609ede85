//! # NASA 图片下载器 — 示例宿主
//!
//! 本文件仅负责日志初始化、参数解析与下载器装配。
//! 业务逻辑分布在库的各子模块中，详见 `lib.rs` 架构文档。
//!
//! 用法：`nasa-downloader <url> [jpeg|png|webp] [config.json]`

use std::process::ExitCode;

use nasa_downloader::{DownloaderConfig, NasaDownloader, SaveFormat};

const USAGE: &str = "用法: nasa-downloader <url> [jpeg|png|webp] [config.json]";

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let Some(url) = args.next() else {
        eprintln!("{}", USAGE);
        return ExitCode::from(2);
    };

    let format = match args.next().as_deref().map(SaveFormat::parse) {
        None => SaveFormat::Jpeg,
        Some(Ok(format)) => format,
        Some(Err(err)) => {
            eprintln!("{}\n{}", err, USAGE);
            return ExitCode::from(2);
        }
    };

    let config = match args.next() {
        None => DownloaderConfig::default(),
        Some(path) => match DownloaderConfig::from_json_file(&path) {
            Ok(config) => config,
            Err(err) => {
                log::error!("加载配置失败: {err}");
                return ExitCode::FAILURE;
            }
        },
    };

    let downloader = match NasaDownloader::with_config(config) {
        Ok(downloader) => downloader,
        Err(err) => {
            log::error!("下载器初始化失败: {err}");
            return ExitCode::FAILURE;
        }
    };
    log::info!("保存目录: {}", downloader.save_dir().display());

    match downloader.download_image_from_url(&url, format).await {
        Ok(saved) => {
            println!("{}", saved.path().display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("[{}] {}", err.code(), err);
            ExitCode::FAILURE
        }
    }
}
