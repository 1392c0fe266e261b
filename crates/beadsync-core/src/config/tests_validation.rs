//! Validation-focused tests for configuration

#[cfg(test)]
mod validation_tests {
    use crate::config::Config;
    use crate::error::Error;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.cli.timeout_ms = 0;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_retry_count_upper_bound() {
        let mut config = Config::default();
        config.cli.retry_count = 10;
        assert!(config.validate().is_ok());
        config.cli.retry_count = 11;

        let result = config.validate();
        assert!(matches!(result, Err(Error::InvalidConfig(ref msg)) if msg.contains("0-10")));
    }

    #[test]
    fn test_debounce_range() {
        let mut config = Config::default();
        config.store.watch_debounce_ms = 0;
        assert!(config.validate().is_err());
        config.store.watch_debounce_ms = 60_001;
        assert!(config.validate().is_err());
        config.store.watch_debounce_ms = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_bd_path_rejected() {
        let mut config = Config::default();
        config.cli.bd_path = "   ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_stale_threshold_rejected() {
        let mut config = Config::default();
        config.store.stale_threshold_hours = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_projections_carry_values() {
        let mut config = Config::default();
        config.cli.retry_count = 0;
        config.cli.offline_threshold_ms = 1234;
        config.store.watch_debounce_ms = 75;
        config.store.stale_threshold_hours = 3;

        let policy = config.cli_policy();
        assert_eq!(policy.retry_count, 0);
        assert_eq!(policy.offline_threshold_ms, 1234);
        assert_eq!(policy.timeout_ms, 15_000);

        let options = config.store_options();
        assert_eq!(options.watch_debounce_ms, 75);
        assert_eq!(options.stale_threshold_hours, 3);
    }
}
