use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3000").
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Root directory for all transient uploads and generated APK artifacts.
    #[serde(default = "default_storage_root")]
    pub storage_root: PathBuf,

    /// Maximum accepted size per uploaded file, in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: u64,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("/tmp/xy2apk")
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_applied() {
        let config: AppConfig = envy::from_iter(std::iter::empty::<(String, String)>()).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.storage_root, PathBuf::from("/tmp/xy2apk"));
        assert_eq!(config.max_file_size_bytes, 10 * 1024 * 1024);
    }
}
