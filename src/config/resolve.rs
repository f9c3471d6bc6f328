use std::env;
use std::path::{Path, PathBuf};

use crate::config::{Config, ConfigError, Result};

pub const CONFIG_ENV: &str = "PORTUTILS_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub path: PathBuf,
    /// Set when the user named the file; a missing file is then an error.
    pub required: bool,
}

pub fn resolve_config_path(explicit: Option<PathBuf>) -> Option<ResolvedConfig> {
    if let Some(path) = explicit {
        return Some(ResolvedConfig {
            path,
            required: true,
        });
    }

    if let Ok(path) = env::var(CONFIG_ENV) {
        if !path.is_empty() {
            return Some(ResolvedConfig {
                path: PathBuf::from(path),
                required: true,
            });
        }
    }

    default_config_path().map(|path| ResolvedConfig {
        path,
        required: false,
    })
}

pub fn load_config(explicit: Option<PathBuf>) -> Result<Config> {
    match resolve_config_path(explicit) {
        Some(resolved) if resolved.required => load_config_file(&resolved.path),
        Some(resolved) if resolved.path.is_file() => load_config_file(&resolved.path),
        _ => Ok(Config::default()),
    }
}

pub fn load_config_file(path: &Path) -> Result<Config> {
    if !path.is_file() {
        return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
    }

    let contents = std::fs::read_to_string(path)?;
    toml::from_str(&contents).map_err(|source| ConfigError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

fn default_config_path() -> Option<PathBuf> {
    let base = match env::var("XDG_CONFIG_HOME") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => PathBuf::from(env::var("HOME").ok()?).join(".config"),
    };
    Some(base.join("portutils").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    use crate::config::resolve::{load_config_file, resolve_config_path};
    use crate::config::{ConfigError, MissingArgs};

    #[test]
    fn explicit_path_is_required() {
        let resolved =
            resolve_config_path(Some("/tmp/portutils.toml".into())).expect("resolved path");
        assert!(resolved.required);
        assert_eq!(resolved.path, std::path::PathBuf::from("/tmp/portutils.toml"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let path = unique_temp_path("missing");
        let err = load_config_file(&path).expect_err("missing config should fail");
        assert!(matches!(err, ConfigError::ConfigNotFound(p) if p == path));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let path = unique_temp_path("partial");
        fs::write(
            &path,
            "[tools]\nport = \"/opt/local/bin/port\"\n\n[graph]\nmax_depth = 3\n",
        )
        .expect("write config");

        let config = load_config_file(&path).expect("load config");
        assert_eq!(config.tools.port, "/opt/local/bin/port");
        assert_eq!(config.tools.dot, "dot");
        assert_eq!(config.tools.sed, "sed");
        assert_eq!(config.graph.max_depth, 3);
        assert_eq!(config.graph.format, "png");
        assert!(config.graph.open);
        assert_eq!(config.checksums.missing_args, MissingArgs::Usage);
        assert!(config.checksums.isolate_failures);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn parses_checksum_policy() {
        let path = unique_temp_path("policy");
        fs::write(
            &path,
            "[checksums]\nmissing_args = \"error\"\nisolate_failures = false\n",
        )
        .expect("write config");

        let config = load_config_file(&path).expect("load config");
        assert_eq!(config.checksums.missing_args, MissingArgs::Error);
        assert!(!config.checksums.isolate_failures);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn reports_parse_errors_with_path() {
        let path = unique_temp_path("broken");
        fs::write(&path, "[graph\nmax_depth = ").expect("write config");

        let err = load_config_file(&path).expect_err("broken config should fail");
        assert!(err.to_string().contains(&path.display().to_string()));
        let _ = fs::remove_file(&path);
    }

    fn unique_temp_path(prefix: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before unix epoch")
            .as_nanos();
        let pid = std::process::id();
        std::env::temp_dir().join(format!("portutils-{prefix}-{pid}-{nanos}.toml"))
    }
}
