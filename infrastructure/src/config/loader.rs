//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::PathBuf;

/// Project-level config file names, checked in order
const PROJECT_FILES: [&str; 2] = ["bca-assist.toml", ".bca-assist.toml"];

/// Prefix of environment variable overrides (`BCA_MODEL__NAME` -> `model.name`)
const ENV_PREFIX: &str = "BCA_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `BCA_`-prefixed environment variables
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./bca-assist.toml` or `./.bca-assist.toml`
    /// 4. Global config: `$XDG_CONFIG_HOME/bca-assist/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(&path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        figment.extract().map_err(Box::new)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/bca-assist/config.toml if set,
    /// otherwise falls back to ~/.config/bca-assist/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("bca-assist").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources() {
        println!("Configuration sources (in priority order):");

        println!("  [ENV  ] Environment: {}*", ENV_PREFIX);

        // Project config
        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./bca-assist.toml or ./.bca-assist.toml");
        }

        // Global config
        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bca_domain::{Model, OutputFormat};
    use figment::Jail;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.retry.max_attempts, 3);
        assert!(config.output.color);
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("bca-assist"));
    }

    #[test]
    fn test_project_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "bca-assist.toml",
                r#"
[model]
name = "gemini-2.5-pro"

[output]
format = "json"
"#,
            )?;

            let config = ConfigLoader::load(None).map_err(|e| *e)?;
            assert_eq!(config.model.parse_model().unwrap(), Model::Gemini25Pro);
            assert_eq!(config.output.format, Some(OutputFormat::Json));
            assert_eq!(config.retry.max_attempts, 3);
            Ok(())
        });
    }

    #[test]
    fn test_explicit_file_overrides_project_file() {
        Jail::expect_with(|jail| {
            jail.create_file(".bca-assist.toml", "[retry]\nmax_attempts = 4\n")?;
            jail.create_file("custom.toml", "[retry]\nmax_attempts = 6\n")?;

            let explicit = PathBuf::from("custom.toml");
            let config = ConfigLoader::load(Some(&explicit)).map_err(|e| *e)?;
            assert_eq!(config.retry.max_attempts, 6);
            Ok(())
        });
    }

    #[test]
    fn test_environment_overrides_files() {
        Jail::expect_with(|jail| {
            jail.create_file("bca-assist.toml", "[retry]\nmax_attempts = 4\n")?;
            jail.set_env("BCA_RETRY__MAX_ATTEMPTS", "2");
            jail.set_env("BCA_MODEL__NAME", "gemini-2.5-flash");

            let config = ConfigLoader::load(None).map_err(|e| *e)?;
            assert_eq!(config.retry.max_attempts, 2);
            assert_eq!(config.model.parse_model().unwrap(), Model::Gemini25Flash);
            Ok(())
        });
    }
}
