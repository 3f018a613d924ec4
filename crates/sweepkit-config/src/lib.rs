pub mod error;

pub use error::*;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use sweepkit_core::{DEFAULT_CALL_TIMEOUT, DEFAULT_CONCURRENCY, DEFAULT_MAX_PAGES};
use sweepkit_core::{Scope, Selector, SweepOptions};
use tracing::debug;

/// 設定ファイルのパスを直接指定する環境変数
pub const CONFIG_PATH_ENV: &str = "SWEEP_CONFIG_PATH";

/// 対象リージョンを上書きする環境変数 (カンマ区切り)
pub const REGIONS_ENV: &str = "SWEEP_REGIONS";

pub const DEFAULT_REGION: &str = "us-west-2";

const CANDIDATES: [&str; 2] = ["sweep.local.yaml", "sweep.yaml"];

/// sweep の実行設定
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepConfig {
    /// 掃除対象のリージョン
    pub regions: Vec<String>,

    /// 実行するスイーパー名 (空なら全て)
    pub sweep_run: Vec<String>,

    pub max_pages: usize,
    pub concurrency: usize,
    pub call_timeout_secs: u64,
    pub dry_run: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            regions: vec![DEFAULT_REGION.to_string()],
            sweep_run: Vec::new(),
            max_pages: DEFAULT_MAX_PAGES,
            concurrency: DEFAULT_CONCURRENCY,
            call_timeout_secs: DEFAULT_CALL_TIMEOUT.as_secs(),
            dry_run: false,
        }
    }
}

impl SweepConfig {
    /// 設定ファイルを探して読み込み、環境変数を反映して検証する
    ///
    /// 設定ファイルが見つからない場合はデフォルト値を使う
    pub fn load() -> Result<Self> {
        let mut config = match find_config_file()? {
            Some(path) => Self::from_file(&path)?,
            None => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading config file");
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        // 空ファイルはデフォルト扱い
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// SWEEP_REGIONS が設定されていれば regions を上書きする
    pub fn apply_env(&mut self) {
        if let Ok(value) = std::env::var(REGIONS_ENV) {
            let regions = parse_regions(&value);
            if !regions.is_empty() {
                debug!(regions = ?regions, "Regions overridden by {}", REGIONS_ENV);
                self.regions = regions;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.regions.is_empty() {
            return Err(ConfigError::NoRegions);
        }
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "concurrency",
            });
        }
        if self.max_pages == 0 {
            return Err(ConfigError::ZeroLimit { field: "max_pages" });
        }
        if self.call_timeout_secs == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "call_timeout_secs",
            });
        }
        Ok(())
    }

    pub fn scopes(&self) -> Vec<Scope> {
        self.regions.iter().map(|r| Scope::new(r.as_str())).collect()
    }

    pub fn selector(&self) -> Selector {
        Selector::from_names(self.sweep_run.clone())
    }

    pub fn sweep_options(&self) -> SweepOptions {
        SweepOptions::new()
            .with_max_pages(self.max_pages)
            .with_concurrency(self.concurrency)
            .with_call_timeout(Duration::from_secs(self.call_timeout_secs))
            .with_dry_run(self.dry_run)
    }
}

/// カンマ区切りのリージョン指定を分解する (空要素と重複は除く)
pub fn parse_regions(value: &str) -> Vec<String> {
    let mut regions: Vec<String> = Vec::new();
    for region in value.split(',').map(str::trim).filter(|r| !r.is_empty()) {
        if !regions.iter().any(|r| r == region) {
            regions.push(region.to_string());
        }
    }
    regions
}

/// 設定ファイルを探す
///
/// 以下の優先順位で検索:
/// 1. 環境変数 SWEEP_CONFIG_PATH (直接パス指定、存在しなければエラー)
/// 2. カレントディレクトリ: sweep.local.yaml, sweep.yaml
/// 3. ./.sweepkit/ ディレクトリ内: sweep.yaml
/// 4. ~/.config/sweepkit/sweep.yaml (グローバル設定)
///
/// どれも見つからなければ `None`
pub fn find_config_file() -> Result<Option<PathBuf>> {
    // 1. 環境変数で直接指定
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(Some(path));
        }
        return Err(ConfigError::ExplicitPathNotFound(path));
    }

    let current_dir = std::env::current_dir()?;

    // 2. カレントディレクトリで検索
    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    // 3. ./.sweepkit/ ディレクトリで検索
    let local = current_dir.join(".sweepkit").join("sweep.yaml");
    if local.exists() {
        return Ok(Some(local));
    }

    // 4. グローバル設定ファイル
    if let Some(config_dir) = dirs::config_dir() {
        let global = config_dir.join("sweepkit").join("sweep.yaml");
        if global.exists() {
            return Ok(Some(global));
        }
    }

    Ok(None)
}
