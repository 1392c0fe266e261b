//! Loading-focused tests for configuration
//!
//! File layering, TOML parsing and environment overrides. Tests that touch
//! the process environment run serially.

#[cfg(test)]
mod loading_tests {
    use std::{fs, path::Path};

    use serial_test::serial;

    use crate::config::{load_config_from, load_toml_file, project_config_path, Config};
    use crate::error::{Error, Result};

    const ENV_VARS: &[&str] = &[
        "BEADSYNC_BD_PATH",
        "BEADSYNC_TIMEOUT_MS",
        "BEADSYNC_RETRY_COUNT",
        "BEADSYNC_RETRY_BACKOFF_MS",
        "BEADSYNC_OFFLINE_THRESHOLD_MS",
        "BEADSYNC_WATCH_ENABLED",
        "BEADSYNC_WATCH_DEBOUNCE_MS",
        "BEADSYNC_STALE_THRESHOLD_HOURS",
    ];

    fn clear_env() {
        ENV_VARS.iter().for_each(|name| std::env::remove_var(name));
    }

    fn write(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::io_error(format!("Failed to create dir: {e}")))?;
        }
        fs::write(path, content).map_err(|e| Error::io_error(format!("Failed to write: {e}")))
    }

    fn tempdir() -> Result<tempfile::TempDir> {
        tempfile::tempdir().map_err(|e| Error::io_error(format!("Failed to create temp dir: {e}")))
    }

    #[test]
    #[serial]
    fn test_no_config_files_returns_defaults() -> Result<()> {
        clear_env();
        let project = tempdir()?;

        let config = load_config_from(None, project.path())?;
        assert_eq!(config, Config::default());
        assert_eq!(config.cli.bd_path, "bd");
        assert_eq!(config.cli.timeout_ms, 15_000);
        assert_eq!(config.store.watch_debounce_ms, 300);
        Ok(())
    }

    #[test]
    #[serial]
    fn test_project_overrides_global_per_key() -> Result<()> {
        clear_env();
        let dir = tempdir()?;
        let global = dir.path().join("global.toml");
        write(
            &global,
            "[cli]\ntimeout_ms = 5000\nretry_count = 4\n\n[store]\nstale_threshold_hours = 6\n",
        )?;
        let project = dir.path().join("project");
        write(&project_config_path(&project), "[cli]\nretry_count = 1\n")?;

        let config = load_config_from(Some(&global), &project)?;
        assert_eq!(config.cli.timeout_ms, 5000, "global value survives");
        assert_eq!(config.cli.retry_count, 1, "project wins");
        assert_eq!(config.store.stale_threshold_hours, 6);
        assert_eq!(config.cli.retry_backoff_ms, 500, "default survives");
        Ok(())
    }

    #[test]
    #[serial]
    fn test_env_overrides_files() -> Result<()> {
        clear_env();
        let project = tempdir()?;
        write(
            &project_config_path(project.path()),
            "[store]\nwatch_debounce_ms = 900\n",
        )?;

        std::env::set_var("BEADSYNC_WATCH_DEBOUNCE_MS", "40");
        std::env::set_var("BEADSYNC_BD_PATH", "/opt/bd/bin/bd");
        std::env::set_var("BEADSYNC_WATCH_ENABLED", "false");
        let result = load_config_from(None, project.path());
        clear_env();

        let config = result?;
        assert_eq!(config.store.watch_debounce_ms, 40);
        assert_eq!(config.cli.bd_path, "/opt/bd/bin/bd");
        assert!(!config.store.watch_enabled);
        Ok(())
    }

    #[test]
    #[serial]
    fn test_invalid_env_value_is_config_error() -> Result<()> {
        clear_env();
        let project = tempdir()?;

        std::env::set_var("BEADSYNC_RETRY_COUNT", "several");
        let result = load_config_from(None, project.path());
        clear_env();

        match result {
            Err(Error::InvalidConfig(msg)) => assert!(msg.contains("BEADSYNC_RETRY_COUNT")),
            other => panic!("expected invalid config, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    #[serial]
    fn test_out_of_range_file_value_fails_validation() -> Result<()> {
        clear_env();
        let project = tempdir()?;
        write(&project_config_path(project.path()), "[cli]\ntimeout_ms = 0\n")?;

        let result = load_config_from(None, project.path());
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
        Ok(())
    }

    #[test]
    fn test_malformed_toml_returns_parse_error() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("bad.toml");
        write(&path, "[cli\ntimeout_ms = ")?;

        let result = load_toml_file(&path);
        assert!(matches!(result, Err(Error::Parse(_))));
        Ok(())
    }

    #[test]
    fn test_unknown_key_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("typo.toml");
        write(&path, "[cli]\ntimeout = 10\n")?;

        assert!(matches!(load_toml_file(&path), Err(Error::Parse(_))));
        Ok(())
    }

    #[test]
    fn test_directory_path_is_io_error() -> Result<()> {
        let dir = tempdir()?;
        assert!(matches!(load_toml_file(dir.path()), Err(Error::Io(_))));
        Ok(())
    }

    #[test]
    fn test_workspaces_list_parses() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("ws.toml");
        write(&path, "workspaces = [\"../api\", \"../web\"]\n")?;

        let config = Config::default().merge_partial(load_toml_file(&path)?);
        assert_eq!(config.workspaces.len(), 2);
        assert!(config.workspaces[0].ends_with("api"));
        Ok(())
    }
}
