//! Platform-dependent filesystem locations for blitzd state.
//!
//! All platform-specific path literals live here, keyed off an explicit
//! [`Platform`] tag so the lookup is testable independently of the
//! resolution algorithm.

use std::path::PathBuf;

/// Host platform tag. Detection is compile-time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Unix,
}

impl Platform {
    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else {
            Self::Unix
        }
    }

    /// Fixed path of the required system-wide config file.
    /// Windows keeps a drive-root file, mostly used for development.
    pub fn system_config_path(self) -> PathBuf {
        match self {
            Self::Windows => PathBuf::from(r"C:\blitzd.toml"),
            Self::MacOs | Self::Unix => PathBuf::from("/etc/blitzd.toml"),
        }
    }
}

/// Default blitzd home directory: the per-user application-data location
/// holding generated certificates, the optional config override, and the
/// persisted snapshot. `--dir` overrides it before initialisation runs.
/// The directory is not created here.
pub fn default_blitzd_dir() -> PathBuf {
    default_dir_for(Platform::current())
}

fn default_dir_for(platform: Platform) -> PathBuf {
    match platform {
        Platform::Windows => dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Blitzd"),
        Platform::MacOs => dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Blitzd"),
        Platform::Unix => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".blitzd"),
    }
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_config_path_per_platform() {
        assert_eq!(
            Platform::Windows.system_config_path(),
            PathBuf::from(r"C:\blitzd.toml")
        );
        assert_eq!(
            Platform::Unix.system_config_path(),
            PathBuf::from("/etc/blitzd.toml")
        );
        assert_eq!(
            Platform::MacOs.system_config_path(),
            PathBuf::from("/etc/blitzd.toml")
        );
    }

    #[test]
    fn unix_default_dir_is_hidden_under_home() {
        let dir = default_dir_for(Platform::Unix);
        assert!(dir.ends_with(".blitzd"));
    }

    #[test]
    fn windows_and_macos_default_dirs_are_capitalised() {
        assert!(default_dir_for(Platform::Windows).ends_with("Blitzd"));
        assert!(default_dir_for(Platform::MacOs).ends_with("Blitzd"));
    }

    #[test]
    fn tilde_expands_to_home() {
        let home = dirs::home_dir().expect("home dir must exist in test env");
        let expanded = expand_home("~/.blitzd");
        assert!(expanded.starts_with(&home));
        assert!(expanded.ends_with(".blitzd"));
    }

    #[test]
    fn absolute_path_unchanged() {
        let p = expand_home("/absolute/path");
        assert_eq!(p, PathBuf::from("/absolute/path"));
    }

    #[test]
    fn relative_path_unchanged() {
        let p = expand_home("relative/path");
        assert_eq!(p, PathBuf::from("relative/path"));
    }
}
