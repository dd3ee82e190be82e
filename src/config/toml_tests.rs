//! Tests for TOML configuration parsing.

use super::toml::{TomlConfig, default_config_template};

mod parsing {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
            [service]
            url = "https://callbacks.example.com"
            secret = "service-secret"
        "#;

        let config = TomlConfig::parse(toml).unwrap();
        assert_eq!(
            config.service.url.as_deref(),
            Some("https://callbacks.example.com")
        );
        assert_eq!(config.service.secret.as_deref(), Some("service-secret"));
        assert!(config.service.timeout.is_none());
    }

    #[test]
    fn parse_retry_section() {
        let toml = r"
            [retry]
            max_attempts = 5
            initial_delay_ms = 200
            max_delay_ms = 2000
            multiplier = 1.5
            jitter = 0.25
        ";

        let config = TomlConfig::parse(toml).unwrap();
        let retry = &config.retry;

        assert_eq!(retry.max_attempts, Some(5));
        assert_eq!(retry.initial_delay_ms, Some(200));
        assert_eq!(retry.max_delay_ms, Some(2000));
        assert_eq!(retry.multiplier, Some(1.5));
        assert_eq!(retry.jitter, Some(0.25));
    }

    #[test]
    fn empty_config_is_valid() {
        let config = TomlConfig::parse("").unwrap();

        assert!(config.service.url.is_none());
        assert!(config.retry.max_attempts.is_none());
    }

    #[test]
    fn unknown_field_is_rejected() {
        let toml = r#"
            [service]
            url = "https://callbacks.example.com"
            token = "typo"
        "#;

        assert!(TomlConfig::parse(toml).is_err());
    }

    #[test]
    fn unknown_section_is_rejected() {
        assert!(TomlConfig::parse("[webhook]\nurl = \"x\"").is_err());
    }

    #[test]
    fn wrong_value_type_is_rejected() {
        assert!(TomlConfig::parse("[retry]\nmax_attempts = \"three\"").is_err());
    }
}

mod template {
    use super::*;

    #[test]
    fn default_template_parses() {
        let config = TomlConfig::parse(&default_config_template()).unwrap();

        assert!(config.service.url.is_none());
        assert!(config.retry.jitter.is_none());
    }

    #[test]
    fn default_template_documents_every_section() {
        let template = default_config_template();

        assert!(template.contains("[service]"));
        assert!(template.contains("[retry]"));
        assert!(template.contains("initial_delay_ms"));
        assert!(template.contains("jitter"));
    }
}
