//! Init command implementation.

use crate::cli::InitArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::path::Path;

/// Execute the init command.
pub fn execute_init(args: InitArgs, path: &Path, formatter: &Formatter) -> Result<()> {
    if path.exists() && !args.force {
        return Err(CliError::Config(format!(
            "{} already exists, use --force to overwrite",
            path.display()
        )));
    }

    Config::default().save_to(path)?;
    println!("{}", formatter.success(&format!("Wrote default configuration to {}", path.display())));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_default_and_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let formatter = Formatter::new(false);

        execute_init(InitArgs { force: false }, &path, &formatter).unwrap();
        assert_eq!(Config::load(Some(&path)).unwrap(), Config::default());

        let again = execute_init(InitArgs { force: false }, &path, &formatter);
        assert!(matches!(again, Err(CliError::Config(_))));

        execute_init(InitArgs { force: true }, &path, &formatter).unwrap();
    }
}
