//! Integration tests for config

#[cfg(test)]
mod tests {
    use filever_config::*;
    use filever_errors::{ConfigError, Error};
    use filever_types::{ColorChoice, OutputFormat};
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to ensure env var tests don't run concurrently
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    const ENV_VARS: &[&str] = &[
        "FILEVER_OUTPUT",
        "FILEVER_COLOR",
        "FILEVER_WORKERS",
        "FILEVER_REPORT",
        "FILEVER_SPLITS",
        "FILEVER_ALGORITHM",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.general.default_output, OutputFormat::Tty);
        assert_eq!(config.general.color, ColorChoice::Auto);
        assert_eq!(config.verify.workers, 2);
        assert_eq!(config.verify.report_path, PathBuf::from("mismatches.txt"));
        assert_eq!(config.verify.progress_interval_ms, 1000);
        assert_eq!(config.compare.splits, 8);
        assert_eq!(config.compare.algorithm, "SHA256");
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[general]
default_output = "plain"
color = "never"

[verify]
workers = 6
report_path = "/tmp/bad-files.txt"

[compare]
splits = 32
algorithm = "md5"
        "#
        )
        .unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.general.default_output, OutputFormat::Plain);
        assert_eq!(config.general.color, ColorChoice::Never);
        assert_eq!(config.verify.workers, 6);
        assert_eq!(config.verify.report_path, PathBuf::from("/tmp/bad-files.txt"));
        // Unset keys keep their defaults
        assert_eq!(config.verify.progress_interval_ms, 1000);
        assert_eq!(config.compare.splits, 32);
        assert_eq!(config.compare.algorithm, "md5");
    }

    #[tokio::test]
    async fn test_invalid_file_contents() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[compare]\nsplits = \"many\"").unwrap();
        let err = Config::load_from_file(temp_file.path()).await.unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::ParseError { .. })));

        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[compare]\nsplits = 0").unwrap();
        let err = Config::load_from_file(temp_file.path()).await.unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::InvalidValue { .. })));
    }

    #[tokio::test]
    async fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = Config::load_or_default(Some(missing.as_path())).await.unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_merge_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var("FILEVER_OUTPUT", "json");
        std::env::set_var("FILEVER_COLOR", "always");
        std::env::set_var("FILEVER_WORKERS", "12");
        std::env::set_var("FILEVER_REPORT", "out.txt");
        std::env::set_var("FILEVER_SPLITS", "4");
        std::env::set_var("FILEVER_ALGORITHM", "SHA1");

        let mut config = Config::default();
        config.merge_env().unwrap();

        assert_eq!(config.general.default_output, OutputFormat::Json);
        assert_eq!(config.general.color, ColorChoice::Always);
        assert_eq!(config.verify.workers, 12);
        assert_eq!(config.verify.report_path, PathBuf::from("out.txt"));
        assert_eq!(config.compare.splits, 4);
        assert_eq!(config.compare.algorithm, "SHA1");

        clear_env();
    }

    #[test]
    fn test_invalid_env_value() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        for (var, value) in [
            ("FILEVER_OUTPUT", "invalid"),
            ("FILEVER_WORKERS", "-1"),
            ("FILEVER_SPLITS", "0"),
        ] {
            std::env::set_var(var, value);
            let mut config = Config::default();
            let err = config.merge_env().unwrap_err();
            assert!(
                matches!(err, Error::Config(ConfigError::InvalidValue { ref field, .. }) if field == var)
            );
            std::env::remove_var(var);
        }

        clear_env();
    }

    #[test]
    fn test_resolve_workers() {
        assert_eq!(resolve_workers(3), 3);
        assert!(resolve_workers(0) >= 1);
    }
}
