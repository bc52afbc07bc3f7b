use figment::Jail;
use grid_config::GridConfig;

#[test]
fn project_local_toml_overrides_defaults() {
    Jail::expect_with(|jail| {
        jail.create_dir(".gridiron")?;
        jail.create_file(
            ".gridiron/config.toml",
            r#"
            [storage]
            root = "/data/lake"

            [retry]
            max_attempts = 4
            base_delay_ms = 250

            [quality]
            strict_schema = true
            "#,
        )?;

        let config: GridConfig = GridConfig::figment().extract().expect("config loads");
        assert_eq!(config.storage.root, "/data/lake");
        assert_eq!(config.retry.max_attempts, 4);
        assert_eq!(config.retry.base_delay_ms, 250);
        assert!(config.quality.strict_schema);
        // Untouched sections keep their defaults
        assert_eq!(config.providers.timeout_secs, 10);
        Ok(())
    });
}

#[test]
fn env_beats_project_toml() {
    Jail::expect_with(|jail| {
        jail.create_dir(".gridiron")?;
        jail.create_file(
            ".gridiron/config.toml",
            r#"
            [retry]
            max_attempts = 4
            "#,
        )?;
        jail.set_env("GRIDIRON_RETRY__MAX_ATTEMPTS", "7");

        let config: GridConfig = GridConfig::figment().extract().expect("config loads");
        assert_eq!(config.retry.max_attempts, 7);
        Ok(())
    });
}

#[test]
fn provider_endpoint_override_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_dir(".gridiron")?;
        jail.create_file(
            ".gridiron/config.toml",
            r#"
            [providers.sleeper]
            base_url = "http://127.0.0.1:9090/v1"
            "#,
        )?;

        let config: GridConfig = GridConfig::figment().extract().expect("config loads");
        assert_eq!(config.providers.sleeper_base(), "http://127.0.0.1:9090/v1");
        Ok(())
    });
}
