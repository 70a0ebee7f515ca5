use mc_manager::config::{
    DEFAULT_GRACE_PERIOD_SECS, DEFAULT_LOG_CAPACITY, ManagerConfig, validate_config,
};
use mc_manager::error::Error;
use std::fs;

#[test]
fn test_parse_valid_config() {
    let config_str = r#"{
        "server": {
            "command": "java",
            "args": ["-Xmx2G", "-jar", "fabric-server-launch.jar", "nogui"],
            "env": { "JAVA_HOME": "/opt/java" }
        },
        "serverDir": "/srv/minecraft",
        "gracePeriodSecs": 15,
        "logCapacity": 1000,
        "http": { "address": "0.0.0.0", "port": 8080, "workers": 2 }
    }"#;

    let config = ManagerConfig::parse_from_str(config_str).unwrap();
    assert_eq!(config.server.command, "java");
    assert_eq!(config.server.env.get("JAVA_HOME").unwrap(), "/opt/java");
    assert_eq!(config.grace_period_secs, 15);
    assert_eq!(config.log_capacity, 1000);
    assert_eq!(config.http.address, "0.0.0.0");
    assert_eq!(config.http.port, 8080);
}

#[test]
fn test_parse_applies_defaults() {
    let config_str = r#"{
        "server": { "command": "java" },
        "serverDir": "/srv/minecraft"
    }"#;

    let config = ManagerConfig::parse_from_str(config_str).unwrap();
    assert_eq!(config.grace_period_secs, DEFAULT_GRACE_PERIOD_SECS);
    assert_eq!(config.log_capacity, DEFAULT_LOG_CAPACITY);
    assert_eq!(config.process_pattern, "java");
    assert_eq!(config.http.port, 5000);
    assert!(config.server.args.is_empty());
}

#[test]
fn test_parse_invalid_json() {
    let result = ManagerConfig::parse_from_str("{ not json");
    assert!(matches!(result, Err(Error::ConfigParse(_))));
}

#[test]
fn test_parse_missing_server_section() {
    let result = ManagerConfig::parse_from_str(r#"{ "serverDir": "/srv" }"#);
    assert!(matches!(result, Err(Error::ConfigParse(_))));
}

#[test]
fn test_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("manager.json");
    fs::write(
        &path,
        format!(
            r#"{{ "server": {{ "command": "java" }}, "serverDir": "{}" }}"#,
            dir.path().display()
        ),
    )
    .unwrap();

    let config = ManagerConfig::from_file(&path).unwrap();
    assert_eq!(config.server.command, "java");
    validate_config(&config).unwrap();
}

#[test]
fn test_validate_rejects_empty_command() {
    let dir = tempfile::tempdir().unwrap();
    let config_str = format!(
        r#"{{ "server": {{ "command": "" }}, "serverDir": "{}" }}"#,
        dir.path().display()
    );
    let config = ManagerConfig::parse_from_str(&config_str).unwrap();
    assert!(matches!(
        validate_config(&config),
        Err(Error::ConfigValidation(_))
    ));
}

#[test]
fn test_validate_rejects_missing_server_dir() {
    let config_str = r#"{
        "server": { "command": "java" },
        "serverDir": "/definitely/not/a/real/path"
    }"#;
    let config = ManagerConfig::parse_from_str(config_str).unwrap();
    assert!(matches!(
        validate_config(&config),
        Err(Error::ConfigValidation(_))
    ));
}

#[test]
fn test_validate_rejects_zero_log_capacity() {
    let dir = tempfile::tempdir().unwrap();
    let config_str = format!(
        r#"{{ "server": {{ "command": "java" }}, "serverDir": "{}", "logCapacity": 0 }}"#,
        dir.path().display()
    );
    let config = ManagerConfig::parse_from_str(&config_str).unwrap();
    assert!(matches!(
        validate_config(&config),
        Err(Error::ConfigValidation(_))
    ));
}
