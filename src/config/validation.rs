use crate::config::types::{Config, CrawlerConfig, HttpConfig, ScopeConfig};
use crate::ConfigError;

/// Upper bound on the page budget
const MAX_PAGE_BUDGET: u32 = 10_000;

/// Upper bound on parallel resource downloads per page
const MAX_DOWNLOAD_CONCURRENCY: usize = 32;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_http_config(&config.http)?;
    validate_scope_config(&config.scope)?;
    validate_output_directory(config.output.directory.as_deref())?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 || config.max_pages > MAX_PAGE_BUDGET {
        return Err(ConfigError::Validation(format!(
            "max-pages must be between 1 and {}, got {}",
            MAX_PAGE_BUDGET, config.max_pages
        )));
    }

    if config.download_concurrency < 1 || config.download_concurrency > MAX_DOWNLOAD_CONCURRENCY
    {
        return Err(ConfigError::Validation(format!(
            "download-concurrency must be between 1 and {}, got {}",
            MAX_DOWNLOAD_CONCURRENCY, config.download_concurrency
        )));
    }

    Ok(())
}

/// Validates HTTP configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    let timeouts = [
        ("page-timeout-secs", config.page_timeout_secs),
        ("head-timeout-secs", config.head_timeout_secs),
        ("validity-timeout-secs", config.validity_timeout_secs),
        ("resource-timeout-secs", config.resource_timeout_secs),
        ("stylesheet-timeout-secs", config.stylesheet_timeout_secs),
    ];

    for (name, value) in timeouts {
        if value < 1 {
            return Err(ConfigError::Validation(format!(
                "{} must be >= 1 second, got {}",
                name, value
            )));
        }
    }

    Ok(())
}

/// Validates scoping rules
fn validate_scope_config(config: &ScopeConfig) -> Result<(), ConfigError> {
    for label in &config.subdomain_blocklist {
        validate_host_label(label)?;
    }

    for extension in &config.skip_extensions {
        if extension.len() < 2 || !extension.starts_with('.') {
            return Err(ConfigError::Validation(format!(
                "skip-extensions entries must look like '.pdf', got '{}'",
                extension
            )));
        }
    }

    Ok(())
}

/// Validates a single blocklisted host label (e.g. "admin")
fn validate_host_label(label: &str) -> Result<(), ConfigError> {
    if label.is_empty() {
        return Err(ConfigError::Validation(
            "subdomain-blocklist entries cannot be empty".to_string(),
        ));
    }

    if !label
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "subdomain-blocklist entry '{}' must be a lowercase host label",
            label
        )));
    }

    if label.starts_with('-') || label.ends_with('-') {
        return Err(ConfigError::Validation(format!(
            "subdomain-blocklist entry '{}' cannot start or end with '-'",
            label
        )));
    }

    Ok(())
}

fn validate_output_directory(directory: Option<&str>) -> Result<(), ConfigError> {
    match directory {
        Some(dir) if dir.trim().is_empty() => Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        )),
        _ => Ok(()),
    }
}
