use std::{
    env,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use dirs::home_dir;
use serde::{Deserialize, Serialize};

use crate::currency::LocaleConfig;
use crate::errors::Result;
use crate::ledger::aggregate::{DEFAULT_SERIES_MONTHS, MAX_SERIES_MONTHS};
use crate::ledger::{LabelLocale, LedgerAggregator};

const DEFAULT_DIR_NAME: &str = ".kas_core";
const CONFIG_DIR: &str = "config";
const CONFIG_FILE: &str = "config.json";
const TMP_SUFFIX: &str = "tmp";

/// Returns the application data directory, defaulting to `~/.kas_core`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("KAS_CORE_HOME") {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Engine preferences shared by the dues and ledger services.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    #[serde(default)]
    pub label_locale: LabelLocale,
    #[serde(default = "Config::default_report_window_months")]
    pub report_window_months: u32,
    #[serde(default = "Config::default_max_report_window_months")]
    pub max_report_window_months: u32,
    /// Caps the most-overdue ranking; `None` lists every student in arrears.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranking_limit: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "id-ID".into(),
            currency: "IDR".into(),
            label_locale: LabelLocale::default(),
            report_window_months: Self::default_report_window_months(),
            max_report_window_months: Self::default_max_report_window_months(),
            ranking_limit: None,
        }
    }
}

impl Config {
    fn default_report_window_months() -> u32 {
        DEFAULT_SERIES_MONTHS
    }

    fn default_max_report_window_months() -> u32 {
        MAX_SERIES_MONTHS
    }

    pub fn aggregator(&self) -> LedgerAggregator {
        LedgerAggregator::new(self.report_window_months, self.max_report_window_months)
    }

    pub fn money_locale(&self) -> LocaleConfig {
        LocaleConfig::for_tag(&self.locale)
    }
}

/// Handles persistence of [`Config`] as pretty-printed JSON.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        let config_dir = base.join(CONFIG_DIR);
        fs::create_dir_all(&config_dir)?;
        Ok(Self {
            path: config_dir.join(CONFIG_FILE),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored configuration, falling back to defaults when absent.
    pub fn load(&self) -> Result<Config> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
