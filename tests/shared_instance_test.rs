use nasa_downloader::{DownloaderConfig, ImageError, NasaDownloader};

// 共享实例是进程级状态，放在独立的测试二进制中，且只有这一个测试。
#[test]
fn shared_instance_keeps_first_configuration() {
    let temp = tempfile::tempdir().expect("tempdir");

    let rejected = NasaDownloader::get_instance(DownloaderConfig::new("Bad", 200));
    assert!(matches!(rejected, Err(ImageError::InvalidConfig(_))));

    let first = NasaDownloader::get_instance(
        DownloaderConfig::new("Test", 80).with_pictures_root(temp.path()),
    )
    .expect("first init should succeed");

    let second = NasaDownloader::get_instance(DownloaderConfig::new("Other", 10))
        .expect("later calls return the shared instance");

    assert!(std::ptr::eq(first, second));
    assert_eq!(second.config().save_dir_name, "Test");
    assert_eq!(second.config().image_quality, 80);
    assert_eq!(second.save_dir(), temp.path().join("Test"));
}
