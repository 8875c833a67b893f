//! CLI subcommand implementations.

pub mod scrape;
pub mod serve;
pub mod show;
pub mod watch;

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Args;
use dolarhoy_lib::{Engine, ScraperSettings};

/// Settings shared by every subcommand. Flags win over `DOLARHOY_*`
/// environment variables, which win over built-in defaults.
#[derive(Args, Default)]
pub struct SettingsArgs {
    /// Page to scrape
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// History file (JSON array)
    #[arg(long, global = true)]
    pub data_file: Option<PathBuf>,

    /// Renderer: chrome or http
    #[arg(long, global = true)]
    pub engine: Option<String>,

    /// Chrome/Chromium executable
    #[arg(long, global = true)]
    pub chrome_path: Option<PathBuf>,

    /// Timezone name recorded with each scrape (e.g. America/Argentina/Buenos_Aires)
    #[arg(long, global = true)]
    pub timezone: Option<String>,
}

impl SettingsArgs {
    pub fn resolve(&self) -> Result<ScraperSettings> {
        self.apply(ScraperSettings::from_env())
    }

    pub fn apply(&self, mut settings: ScraperSettings) -> Result<ScraperSettings> {
        if let Some(url) = &self.url {
            settings.url = url.clone();
        }
        if let Some(path) = &self.data_file {
            settings.data_file = path.clone();
        }
        if let Some(engine) = &self.engine {
            settings.engine = engine.parse::<Engine>().map_err(|e| anyhow!(e))?;
        }
        if let Some(path) = &self.chrome_path {
            settings.chrome_path = Some(path.clone());
        }
        if let Some(tz) = &self.timezone {
            settings.timezone = Some(tz.clone());
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_settings() {
        let args = SettingsArgs {
            url: Some("http://localhost:9000/".into()),
            engine: Some("http".into()),
            ..Default::default()
        };
        let settings = args.apply(ScraperSettings::default()).unwrap();
        assert_eq!(settings.url, "http://localhost:9000/");
        assert_eq!(settings.engine, Engine::Http);
        assert_eq!(settings.data_file, PathBuf::from("data/dolar.json"));
    }

    #[test]
    fn unknown_engine_is_rejected() {
        let args = SettingsArgs {
            engine: Some("lynx".into()),
            ..Default::default()
        };
        assert!(args.apply(ScraperSettings::default()).is_err());
    }
}
