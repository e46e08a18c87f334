use crate::config::types::{
    Config, CrawlerConfig, FileTypesConfig, OutputConfig, ScopeConfig, UserAgentConfig,
};
use crate::ConfigError;
use std::collections::HashMap;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_scope_config(&config.scope)?;
    validate_file_types(&config.file_types)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.batch_width < 1 || config.batch_width > 100 {
        return Err(ConfigError::Validation(format!(
            "batch_width must be between 1 and 100, got {}",
            config.batch_width
        )));
    }

    if config.max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max_pages must be >= 1 when set".to_string(),
        ));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.output_root.is_empty() {
        return Err(ConfigError::Validation(
            "output_root cannot be empty".to_string(),
        ));
    }

    if config.download_dir_suffix.is_empty() {
        return Err(ConfigError::Validation(
            "download_dir_suffix cannot be empty".to_string(),
        ));
    }

    for (field, value) in [
        ("download_dir_suffix", &config.download_dir_suffix),
        ("report_file_name", &config.report_file_name),
    ] {
        if value.is_empty() || value.contains('/') || value.contains('\\') {
            return Err(ConfigError::Validation(format!(
                "{} must be a plain, non-empty name, got '{}'",
                field, value
            )));
        }
    }

    Ok(())
}

/// Validates excluded extensions
fn validate_scope_config(config: &ScopeConfig) -> Result<(), ConfigError> {
    for ext in &config.excluded_extensions {
        validate_extension(ext)?;
    }
    Ok(())
}

/// Validates the category extension lists
///
/// An extension may belong to at most one category, otherwise classification
/// would depend on lookup order.
fn validate_file_types(config: &FileTypesConfig) -> Result<(), ConfigError> {
    let mut owners: HashMap<String, &str> = HashMap::new();

    for (category, exts) in [
        ("images", &config.images),
        ("documents", &config.documents),
        ("videos", &config.videos),
    ] {
        for ext in exts {
            validate_extension(ext)?;

            if let Some(previous) = owners.insert(ext.to_lowercase(), category) {
                return Err(ConfigError::Validation(format!(
                    "Extension '{}' is listed under both {} and {}",
                    ext, previous, category
                )));
            }
        }
    }

    Ok(())
}

/// Validates a single extension of the form `.ext`
fn validate_extension(ext: &str) -> Result<(), ConfigError> {
    let Some(body) = ext.strip_prefix('.') else {
        return Err(ConfigError::Validation(format!(
            "Extension '{}' must start with '.'",
            ext
        )));
    };

    if body.is_empty() || !body.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConfigError::Validation(format!(
            "Extension '{}' must be '.' followed by letters or digits",
            ext
        )));
    }

    Ok(())
}
