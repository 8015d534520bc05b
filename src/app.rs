use crate::cli::RuntimeOptions;
use crate::cli::commands::run_one_shot;
use crate::console;
use crate::editor::EditorRegistry;
use crate::tab::TabManager;
use anyhow::{Context, Result};
use iot_portal_client::EntityClient;
use iot_portal_config::Config;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::runtime::Runtime;

/// Main application state
pub struct App {
    config: Config,
    runtime: Arc<Runtime>,
    options: RuntimeOptions,
}

impl App {
    /// Create a new application, loading configuration and applying CLI overrides
    pub fn new(runtime: Arc<Runtime>, options: RuntimeOptions) -> Result<Self> {
        let config = load_config(&options)?;
        crate::debug::set_level(config.log_level.to_level_filter(), options.log_level);
        Ok(Self {
            config,
            runtime,
            options,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the console (or the requested subcommand) and return the exit code
    pub fn run(self) -> Result<i32> {
        let client = EntityClient::from_config(&self.config.api)
            .with_context(|| format!("invalid API settings ({})", self.config.api.base_url))?;
        log::info!("Backend API: {}", self.config.api.base_url);

        let runtime = Arc::clone(&self.runtime);
        runtime.block_on(async move {
            let mut stdout = std::io::stdout();

            if let Some(shot) = &self.options.one_shot {
                return run_one_shot(&client, shot, self.config.workspace.page_size, &mut stdout)
                    .await;
            }

            let mut manager = TabManager::new(
                EditorRegistry::with_defaults(),
                client,
                tokio::runtime::Handle::current(),
            );
            println!(
                "iot-portal {} connected to {} (type 'help' for commands)",
                crate::VERSION,
                self.config.api.base_url
            );
            console::run(&mut manager, BufReader::new(tokio::io::stdin()), &mut stdout).await?;
            Ok(0)
        })
    }
}

/// Resolve the effective configuration
///
/// `--config` replaces the default path; `--api-url` wins over the file and
/// `IOT_PORTAL_API_URL`.
pub fn load_config(options: &RuntimeOptions) -> Result<Config> {
    let mut config = match &options.config_path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::load()?,
    };

    if let Some(url) = &options.api_url {
        config = config.with_base_url(url.clone());
        config.validate()?;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_url_flag_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        Config::default()
            .with_base_url("http://from-file:8080/api/")
            .save_to(&path)
            .unwrap();

        let options = RuntimeOptions {
            config_path: Some(path),
            api_url: Some("https://from-flag/api/".to_string()),
            ..RuntimeOptions::default()
        };
        let config = load_config(&options).unwrap();

        assert_eq!(config.api.base_url, "https://from-flag/api/");
    }

    #[test]
    fn invalid_api_url_flag_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        Config::default().save_to(&path).unwrap();

        let options = RuntimeOptions {
            config_path: Some(path),
            api_url: Some("ftp://nope".to_string()),
            ..RuntimeOptions::default()
        };

        assert!(load_config(&options).is_err());
    }
}
