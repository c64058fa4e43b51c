use std::path::PathBuf;

const HOME_ENV: &str = "A3S_WORKBENCH_HOME";

/// Returns the base directory for workbench files.
///
/// Uses `$A3S_WORKBENCH_HOME` if set, otherwise defaults to `~/.a3s/workbench`.
pub fn workbench_home() -> PathBuf {
    resolve_home(std::env::var_os(HOME_ENV).map(PathBuf::from))
}

fn resolve_home(override_dir: Option<PathBuf>) -> PathBuf {
    if let Some(home) = override_dir.filter(|p| !p.as_os_str().is_empty()) {
        return home;
    }

    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".a3s")
        .join("workbench")
}

/// Returns the default directory holding the session and integration documents.
pub fn data_dir() -> PathBuf {
    workbench_home().join("data")
}

/// Returns the path to the user configuration file.
pub fn config_path() -> PathBuf {
    workbench_home().join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_default() {
        let home = resolve_home(None);
        assert!(home.ends_with(".a3s/workbench") || home.ends_with(".a3s\\workbench"));
    }

    #[test]
    fn test_home_override() {
        let home = resolve_home(Some(PathBuf::from("/tmp/test-workbench")));
        assert_eq!(home, PathBuf::from("/tmp/test-workbench"));
    }

    #[test]
    fn test_empty_override_is_ignored() {
        assert_eq!(resolve_home(Some(PathBuf::new())), resolve_home(None));
    }
}
