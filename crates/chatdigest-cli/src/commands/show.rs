//! Config command implementation.

use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use std::path::Path;

/// Execute the config command: print the effective configuration as TOML.
///
/// Secrets are masked.
pub fn execute_show(config: &Config, path: &Path, formatter: &Formatter) -> Result<()> {
    let source = if path.exists() {
        format!("Configuration from {}", path.display())
    } else {
        format!("{} not found, showing defaults", path.display())
    };
    eprintln!("{}", formatter.info(&source));
    println!("{}", masked(config).to_toml()?);
    Ok(())
}

fn masked(config: &Config) -> Config {
    let mut config = config.clone();
    for secret in [&mut config.onebot.access_token, &mut config.llm.api_key] {
        if secret.is_some() {
            *secret = Some("********".to_string());
        }
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secrets_masked() {
        let mut config = Config::default();
        config.llm.api_key = Some("sk-real".to_string());

        let shown = masked(&config);
        assert_eq!(shown.llm.api_key.as_deref(), Some("********"));
        assert!(shown.onebot.access_token.is_none());
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-real"));
    }
}
