use std::io::Write;
use synthetics::{CanaryCodeLoader, LocalCodeSource, SyntheticsError, TomlConfig};
use synthetics::utils::validation::Validate;
use tempfile::TempDir;
use zip::write::{FileOptions, ZipWriter};

fn canary_zip() -> Vec<u8> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    zip.start_file::<_, ()>("nodejs/node_modules/heartbeat.js", FileOptions::default())
        .unwrap();
    zip.write_all(b"exports.handler = async () => 'ok';").unwrap();
    zip.finish().unwrap().into_inner()
}

#[tokio::test]
async fn test_load_local_canary_zip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("heartbeat.zip");
    std::fs::write(&path, canary_zip()).unwrap();

    let loader = CanaryCodeLoader::new(LocalCodeSource::new(path.to_str().unwrap()));
    let (code, entries) = loader.run().await.unwrap();

    assert_eq!(code.location, path.to_str().unwrap());
    assert!(!code.is_empty());
    assert_eq!(entries, vec!["nodejs/node_modules/heartbeat.js".to_string()]);
}

#[tokio::test]
async fn test_missing_local_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("missing.zip");

    let loader = CanaryCodeLoader::new(LocalCodeSource::new(path.to_str().unwrap()));
    let err = loader.run().await.unwrap_err();

    assert!(matches!(err, SyntheticsError::FileReadError { .. }));
    assert_eq!(err.exit_code(), 1);
}

#[tokio::test]
async fn test_toml_config_drives_local_source() {
    let temp_dir = TempDir::new().unwrap();
    let zip_path = temp_dir.path().join("heartbeat.zip");
    std::fs::write(&zip_path, canary_zip()).unwrap();

    let config_path = temp_dir.path().join("synthetics.toml");
    std::fs::write(
        &config_path,
        format!(
            "[code]\nfile = {:?}\n\n[retry]\ntimeout_seconds = 30\n",
            zip_path.to_str().unwrap()
        ),
    )
    .unwrap();

    let config = TomlConfig::from_file(config_path.to_str().unwrap()).unwrap();
    config.validate().unwrap();

    let file = config.code.file.clone().unwrap();
    let (_, entries) = CanaryCodeLoader::new(LocalCodeSource::new(file))
        .run()
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
}
