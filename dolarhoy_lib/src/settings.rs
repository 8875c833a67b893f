//! Scraper configuration with `DOLARHOY_*` environment overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use dolarhoy_page::user_agent::ACCEPT_LANGUAGE;
use dolarhoy_page::RenderOptions;

use crate::engine::Engine;

pub const DEFAULT_URL: &str = "https://www.dolarhoy.com/";
pub const DEFAULT_DATA_FILE: &str = "data/dolar.json";
const LOCALTIME: &str = "/etc/localtime";

#[derive(Debug, Clone)]
pub struct ScraperSettings {
    pub url: String,
    pub data_file: PathBuf,
    pub navigation_timeout: Duration,
    pub wait_timeout: Duration,
    pub poll_interval: Duration,
    /// Period between scheduled cycles.
    pub interval: Duration,
    pub engine: Engine,
    pub chrome_path: Option<PathBuf>,
    /// Fixed user agent. Unset rotates through the built-in pool.
    pub user_agent: Option<String>,
    pub accept_language: String,
    /// Overrides the host timezone recorded with each scrape.
    pub timezone: Option<String>,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            navigation_timeout: Duration::from_secs(60),
            wait_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(500),
            interval: Duration::from_secs(10 * 60),
            engine: Engine::Chrome,
            chrome_path: None,
            user_agent: None,
            accept_language: ACCEPT_LANGUAGE.to_string(),
            timezone: None,
        }
    }
}

impl ScraperSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary variable source. Unset, empty or
    /// unparsable values keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let secs = |key: &str, default: Duration| {
            get(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(default)
        };

        let defaults = Self::default();
        let engine = match get("DOLARHOY_ENGINE").map(|v| v.parse::<Engine>()) {
            Some(Ok(engine)) => engine,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Ignoring DOLARHOY_ENGINE");
                defaults.engine
            }
            None => defaults.engine,
        };

        Self {
            url: get("DOLARHOY_URL").unwrap_or(defaults.url),
            data_file: get("DOLARHOY_DATA_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_file),
            navigation_timeout: secs("DOLARHOY_NAV_TIMEOUT_SECS", defaults.navigation_timeout),
            wait_timeout: secs("DOLARHOY_WAIT_TIMEOUT_SECS", defaults.wait_timeout),
            poll_interval: defaults.poll_interval,
            interval: secs("DOLARHOY_INTERVAL_SECS", defaults.interval),
            engine,
            chrome_path: get("DOLARHOY_CHROME_PATH").map(PathBuf::from),
            user_agent: get("DOLARHOY_USER_AGENT").or(defaults.user_agent),
            accept_language: defaults.accept_language,
            timezone: get("DOLARHOY_TIMEZONE"),
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            user_agent: self.user_agent.clone(),
            accept_language: self.accept_language.clone(),
            navigation_timeout: self.navigation_timeout,
            wait_timeout: self.wait_timeout,
            poll_interval: self.poll_interval,
        }
    }

    /// Timezone name stamped on records.
    pub fn resolved_timezone(&self) -> String {
        resolve_timezone(self.timezone.as_deref())
    }
}

/// Override, then `TZ`, then the `/etc/localtime` zone name, then `UTC`.
pub fn resolve_timezone(override_tz: Option<&str>) -> String {
    resolve_timezone_from(
        override_tz,
        std::env::var("TZ").ok().as_deref(),
        Path::new(LOCALTIME),
    )
}

pub(crate) fn resolve_timezone_from(
    override_tz: Option<&str>,
    tz_env: Option<&str>,
    localtime: &Path,
) -> String {
    override_tz
        .map(str::trim)
        .filter(|tz| !tz.is_empty())
        .map(str::to_string)
        .or_else(|| {
            tz_env
                .map(|tz| tz.trim().trim_start_matches(':'))
                .filter(|tz| !tz.is_empty())
                .map(str::to_string)
        })
        .or_else(|| zone_from_localtime(localtime))
        .unwrap_or_else(|| "UTC".to_string())
}

/// `/etc/localtime -> /usr/share/zoneinfo/America/Argentina/Buenos_Aires`
fn zone_from_localtime(path: &Path) -> Option<String> {
    let target = std::fs::read_link(path).ok()?;
    let target = target.to_string_lossy();
    let (_, zone) = target.split_once("zoneinfo/")?;
    (!zone.is_empty()).then(|| zone.to_string())
}
