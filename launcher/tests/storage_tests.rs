//! Filesystem-backed storage, mounts and config loading.

use std::fs;

use iceboot_ice40::{RequestFile, RequestFs};
use iceboot_launcher::storage::FsRequestFiles;
use iceboot_launcher::{Config, ConfigError, DirMounts, FsStorage, Mounts, StorageError, StorageReader};
use tempfile::TempDir;

#[test]
fn test_load_reads_whole_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bitstream.bin");
    let data: Vec<u8> = (0..=255).cycle().take(100_000).collect();
    fs::write(&path, &data).unwrap();

    let mut storage = FsStorage::new();
    let mut handle = storage.open(&path).unwrap();
    assert_eq!(storage.size(&mut handle).unwrap(), data.len());
    let buffer = storage.load_to_memory(&mut handle).unwrap();
    storage.close(handle);

    assert_eq!(buffer.len(), data.len());
    assert_eq!(buffer.as_ref(), &data[..]);
}

#[test]
fn test_open_missing_is_not_found() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bitstream.bin");

    let err = FsStorage::new().open(&path).unwrap_err();
    assert!(matches!(err, StorageError::NotFound { path: p } if p == path));
}

#[test]
fn test_empty_file_loads_empty_buffer() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bitstream.bin");
    fs::write(&path, b"").unwrap();

    let mut storage = FsStorage::new();
    let mut handle = storage.open(&path).unwrap();
    let buffer = storage.load_to_memory(&mut handle).unwrap();
    assert!(buffer.is_empty());
}

#[test]
fn test_request_files_read_at_offset() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fpga_00000001.dat");
    fs::write(&path, b"0123456789").unwrap();

    let mut files = FsRequestFiles;
    let mut file = files.open(path.to_str().unwrap()).unwrap();
    assert_eq!(file.len(), 10);

    let mut buf = [0u8; 4];
    assert_eq!(file.read_at(8, &mut buf), 2);
    assert_eq!(&buf[..2], b"89");

    assert!(files.open("/definitely/not/here.dat").is_none());
}

#[test]
fn test_dir_mounts() {
    let flash = TempDir::new().unwrap();
    let mut mounts = DirMounts::new(flash.path(), flash.path().join("missing-card"));

    assert!(mounts.mount_internal().is_ok());
    assert!(matches!(
        mounts.mount_sdcard(),
        Err(StorageError::Mount { .. })
    ));
}

#[test]
fn test_config_missing_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let config = Config::load(&dir.path().join("iceboot.toml")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_config_file_round_trips_through_loader() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("iceboot.toml");
    fs::write(
        &path,
        r#"
settle_ms = 10

[storage]
flash_root = "/tmp/f"
sd_root = "/tmp/s"

[[images]]
name = "aw"
path = "/sd/apps/ice40/aw"
runner = "event-loop"
"#,
    )
    .unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.settle_ms, 10);
    let images = config.descriptors(&[]).unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(
        images[0].bitstream_path(),
        std::path::PathBuf::from("/tmp/s/apps/ice40/aw/bitstream.bin")
    );
}

#[test]
fn test_config_unknown_field_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("iceboot.toml");
    fs::write(&path, "setle_ms = 10\n").unwrap();

    assert!(matches!(
        Config::load(&path),
        Err(ConfigError::CannotParseToml(_))
    ));
}
