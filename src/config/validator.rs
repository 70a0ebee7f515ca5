use crate::config::{ManagerConfig, ServerConfig};
use crate::error::{Error, Result};

/// Validates the managed-process launch configuration
pub fn validate_server_config(config: &ServerConfig) -> Result<()> {
    // Check command is not empty
    if config.command.is_empty() {
        return Err(Error::ConfigValidation(
            "Server launch command is empty".to_string(),
        ));
    }

    for (key, _) in &config.env {
        if key.is_empty() {
            return Err(Error::ConfigValidation(
                "Environment variable with empty name".to_string(),
            ));
        }
    }

    Ok(())
}

/// Full configuration validation
pub fn validate_config(config: &ManagerConfig) -> Result<()> {
    validate_server_config(&config.server)?;

    if !config.server_dir.is_dir() {
        return Err(Error::ConfigValidation(format!(
            "Server directory does not exist: {}",
            config.server_dir.display()
        )));
    }

    if config.kill_timeout_secs == 0 {
        return Err(Error::ConfigValidation(
            "killTimeoutSecs must be at least 1".to_string(),
        ));
    }

    if config.log_capacity == 0 {
        return Err(Error::ConfigValidation(
            "logCapacity must be at least 1".to_string(),
        ));
    }

    if config.process_pattern.is_empty() {
        return Err(Error::ConfigValidation(
            "processPattern is empty".to_string(),
        ));
    }

    Ok(())
}
