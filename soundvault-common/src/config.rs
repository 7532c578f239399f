//! Configuration loading and root folder resolution

use crate::{Error, Result};
use std::path::PathBuf;

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file (`root_folder` key)
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>, env_var_name: &str) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(PathBuf::from(path));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        return Ok(PathBuf::from(path));
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = find_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(root_folder) = config.get("root_folder").and_then(|v| v.as_str()) {
                    return Ok(PathBuf::from(root_folder));
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    Ok(default_root_folder())
}

/// Locate the configuration file for the platform
fn find_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/soundvault/config.toml first, then /etc/soundvault/config.toml
        let user_config = dirs::config_dir().map(|d| d.join("soundvault").join("config.toml"));
        let system_config = PathBuf::from("/etc/soundvault/config.toml");

        if let Some(path) = user_config {
            if path.exists() {
                return Ok(path);
            }
        }
        if system_config.exists() {
            return Ok(system_config);
        }
        return Err(Error::Config("No config file found".to_string()));
    }

    let config_path = dirs::config_dir()
        .map(|d| d.join("soundvault").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

    if config_path.exists() {
        Ok(config_path)
    } else {
        Err(Error::Config(format!("Config file not found: {:?}", config_path)))
    }
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("soundvault"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/soundvault"))
    } else {
        dirs::data_local_dir()
            .map(|d| d.join("soundvault"))
            .unwrap_or_else(|| PathBuf::from("./soundvault_data"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_arg_wins_over_everything() {
        let resolved = resolve_root_folder(Some("/music/here"), "SOUNDVAULT_TEST_UNSET").unwrap();
        assert_eq!(resolved, PathBuf::from("/music/here"));
    }

    #[test]
    fn env_var_used_when_no_cli_arg() {
        std::env::set_var("SOUNDVAULT_TEST_ROOT", "/music/env");
        let resolved = resolve_root_folder(None, "SOUNDVAULT_TEST_ROOT").unwrap();
        assert_eq!(resolved, PathBuf::from("/music/env"));
        std::env::remove_var("SOUNDVAULT_TEST_ROOT");
    }

    #[test]
    fn fallback_is_non_empty() {
        let resolved = resolve_root_folder(None, "SOUNDVAULT_TEST_UNSET_2").unwrap();
        assert!(!resolved.as_os_str().is_empty());
    }
}
