//! Tarball and configuration fixtures

use flate2::Compression;
use flate2::write::GzEncoder;
use mockito::Server;
use tempfile::TempDir;

use swagger_browser::config::Config;

/// Builds a gzipped tarball with the given `(path, contents)` entries
pub fn tarball(files: &[(&str, &str)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (path, data) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, path, data.as_bytes())
            .unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// Configuration pointing both GitHub and npm at `server`, with a store in a temp dir
pub fn test_config(server: &Server) -> (TempDir, Config) {
    let temp_dir = TempDir::new().unwrap();
    let mut config = Config::new("acme", "gh-token", "npm-token");
    config.github_api_url = server.url();
    config.npm_registry_url = server.url();
    config.store_path = temp_dir.path().join("db.json");
    (temp_dir, config)
}
