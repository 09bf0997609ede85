//! # 编码与写盘模块
//!
//! ## 设计思路
//!
//! 将“像素缓冲 → 编码字节 → 磁盘文件”集中管理：
//! 先在内存中完成编码，再创建文件，编码失败时不会留下空文件。
//!
//! ## 实现思路
//!
//! 1. 确保目标目录存在
//! 2. 按格式编码（JPEG 使用质量参数，PNG / WEBP 无损忽略质量）
//! 3. 以 `<毫秒时间戳><扩展名>` 独占创建文件，重名时追加 `-1`、`-2` 序号
//! 4. 缓冲写入、flush、sync 后释放句柄；写入失败删除残留文件

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::config::MAX_IMAGE_QUALITY;
use super::source::{DecodedImage, SavedFile};
use super::{ImageError, SaveFormat};
use crate::storage;

/// 同一毫秒内允许尝试的文件名数量。
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// 编码并写入 `directory`，返回写入的文件。
///
/// `quality` 超过 100 时按 100 处理。
///
/// # 示例
/// ```rust,no_run
/// use nasa_downloader::{persist, DecodedImage, SaveFormat};
///
/// let image = DecodedImage::from_rgba8(1, 1, vec![255, 0, 0, 255])?;
/// let saved = persist(image, SaveFormat::Png, std::path::Path::new("/tmp/Test"), 100)?;
/// println!("{}", saved.path().display());
/// # Ok::<(), nasa_downloader::ImageError>(())
/// ```
pub fn persist(
    image: DecodedImage,
    format: SaveFormat,
    directory: &Path,
    quality: u8,
) -> Result<SavedFile, ImageError> {
    storage::ensure_dir(directory)?;

    let encoded = encode(&image, format, quality)?;
    drop(image);

    let timestamp = Utc::now().timestamp_millis();
    let (path, file) = create_unique_file(directory, timestamp, format.extension())?;

    if let Err(err) = write_and_sync(file, &encoded) {
        if let Err(remove_err) = fs::remove_file(&path) {
            log::warn!("⚠️ 清理残留文件失败 {}: {}", path.display(), remove_err);
        }
        return Err(err);
    }

    log::info!(
        "💾 图片已保存 - 路径: {} 格式: {} 大小: {} bytes",
        path.display(),
        format,
        encoded.len()
    );

    Ok(SavedFile::new(path, format, encoded.len() as u64))
}

/// 实际交给编码器的质量值。
pub fn effective_quality(format: SaveFormat, quality: u8) -> u8 {
    let clamped = quality.min(MAX_IMAGE_QUALITY);
    match format {
        // JPEG 编码器的有效范围是 1..=100
        SaveFormat::Jpeg => clamped.max(1),
        SaveFormat::Png | SaveFormat::Webp => clamped,
    }
}

/// 在内存中编码像素缓冲。
pub(crate) fn encode(
    image: &DecodedImage,
    format: SaveFormat,
    quality: u8,
) -> Result<Vec<u8>, ImageError> {
    let mut buffer = Vec::new();
    let dynamic = image.as_dynamic();

    let result = match format {
        SaveFormat::Jpeg => {
            let rgb = dynamic.to_rgb8();
            let encoder =
                JpegEncoder::new_with_quality(&mut buffer, effective_quality(format, quality));
            encoder.write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        }
        SaveFormat::Png => {
            let rgba = dynamic.to_rgba8();
            PngEncoder::new(&mut buffer).write_image(
                rgba.as_raw(),
                rgba.width(),
                rgba.height(),
                ExtendedColorType::Rgba8,
            )
        }
        SaveFormat::Webp => {
            let rgba = dynamic.to_rgba8();
            WebPEncoder::new_lossless(&mut buffer).write_image(
                rgba.as_raw(),
                rgba.width(),
                rgba.height(),
                ExtendedColorType::Rgba8,
            )
        }
    };

    result.map_err(|e| ImageError::Storage(format!("{} 编码失败：{}", format, e)))?;
    Ok(buffer)
}

fn file_name_for(timestamp: i64, attempt: u32, extension: &str) -> String {
    if attempt == 0 {
        format!("{}{}", timestamp, extension)
    } else {
        format!("{}-{}{}", timestamp, attempt, extension)
    }
}

/// 独占创建目标文件，重名时递增序号。
fn create_unique_file(
    directory: &Path,
    timestamp: i64,
    extension: &str,
) -> Result<(PathBuf, File), ImageError> {
    for attempt in 0..MAX_NAME_ATTEMPTS {
        let path = directory.join(file_name_for(timestamp, attempt, extension));

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                log::debug!("文件名已存在，尝试下一个序号: {}", path.display());
            }
            Err(err) => {
                return Err(ImageError::Storage(format!(
                    "无法创建文件 '{}'：{}",
                    path.display(),
                    err
                )));
            }
        }
    }

    Err(ImageError::Storage(format!(
        "同一时间戳 {} 下可用文件名已耗尽",
        timestamp
    )))
}

fn write_and_sync(file: File, bytes: &[u8]) -> Result<(), ImageError> {
    let mut writer = BufWriter::new(file);
    writer
        .write_all(bytes)
        .and_then(|_| writer.flush())
        .and_then(|_| writer.get_ref().sync_all())
        .map_err(|e| ImageError::Storage(format!("写入图片失败：{}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, ImageBuffer, Rgba};
    use proptest::prelude::*;

    fn gradient(width: u32, height: u32) -> DecodedImage {
        let buffer = ImageBuffer::from_fn(width, height, |x, y| {
            Rgba([(x % 255) as u8, (y % 255) as u8, ((x + y) % 255) as u8, 255])
        });
        DecodedImage::from(buffer)
    }

    #[test]
    fn persist_creates_missing_directory_and_one_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let dir = temp.path().join("Pictures").join("Test");

        let saved = persist(gradient(16, 8), SaveFormat::Png, &dir, 100).expect("persist");

        assert!(dir.is_dir());
        let entries: Vec<_> = fs::read_dir(&dir).expect("read dir").collect();
        assert_eq!(entries.len(), 1);

        let name = saved.file_name().expect("file name");
        assert!(name.ends_with(".png"));
        let stem = name.trim_end_matches(".png");
        assert!(stem.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(saved.bytes_written(), fs::metadata(saved.path()).expect("meta").len());
    }

    #[test]
    fn persisted_png_round_trips_dimensions() {
        let temp = tempfile::tempdir().expect("tempdir");
        let saved = persist(gradient(33, 17), SaveFormat::Png, temp.path(), 100).expect("persist");

        let reopened = image::open(saved.path()).expect("re-decode");
        assert_eq!(reopened.dimensions(), (33, 17));
    }

    #[test]
    fn every_format_writes_its_extension() {
        let temp = tempfile::tempdir().expect("tempdir");
        for format in SaveFormat::ALL {
            let saved = persist(gradient(8, 8), format, temp.path(), 80).expect("persist");
            assert!(saved.path().to_string_lossy().ends_with(format.extension()));
            assert_eq!(saved.format(), format);

            let reopened = image::open(saved.path()).expect("re-decode");
            assert_eq!(reopened.dimensions(), (8, 8));
        }
    }

    #[test]
    fn quality_above_range_is_clamped_to_max() {
        let image = gradient(24, 24);
        let at_max = encode(&image, SaveFormat::Jpeg, 100).expect("encode 100");
        let above = encode(&image, SaveFormat::Jpeg, 250).expect("encode 250");
        assert_eq!(at_max, above);
    }

    #[test]
    fn jpeg_quality_zero_is_raised_to_one() {
        let image = gradient(24, 24);
        let zero = encode(&image, SaveFormat::Jpeg, 0).expect("encode 0");
        let one = encode(&image, SaveFormat::Jpeg, 1).expect("encode 1");
        assert_eq!(zero, one);
    }

    #[test]
    fn lossless_formats_ignore_quality() {
        let image = gradient(24, 24);
        for format in [SaveFormat::Png, SaveFormat::Webp] {
            let low = encode(&image, format, 5).expect("encode low");
            let high = encode(&image, format, 95).expect("encode high");
            assert_eq!(low, high);
        }
    }

    #[test]
    fn colliding_timestamp_gets_numbered_suffix() {
        let temp = tempfile::tempdir().expect("tempdir");

        let (first, _) = create_unique_file(temp.path(), 1_700_000_000_000, ".jpg").expect("first");
        let (second, _) = create_unique_file(temp.path(), 1_700_000_000_000, ".jpg").expect("second");
        let (third, _) = create_unique_file(temp.path(), 1_700_000_000_000, ".jpg").expect("third");

        assert_eq!(first.file_name().unwrap(), "1700000000000.jpg");
        assert_eq!(second.file_name().unwrap(), "1700000000000-1.jpg");
        assert_eq!(third.file_name().unwrap(), "1700000000000-2.jpg");
    }

    #[test]
    fn persist_fails_with_storage_error_when_directory_is_a_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let blocker = temp.path().join("Test");
        fs::write(&blocker, b"not a dir").expect("write blocker");

        let result = persist(gradient(4, 4), SaveFormat::Png, &blocker, 100);
        assert!(matches!(result, Err(ImageError::Storage(_))));
    }

    proptest! {
        #[test]
        fn effective_quality_stays_in_encoder_range(quality in any::<u8>()) {
            for format in SaveFormat::ALL {
                let q = effective_quality(format, quality);
                prop_assert!(q <= 100);
                if format == SaveFormat::Jpeg {
                    prop_assert!(q >= 1);
                }
                if (1..=100).contains(&quality) {
                    prop_assert_eq!(q, quality);
                }
            }
        }
    }
}
