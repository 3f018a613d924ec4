use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("設定ファイルの読み込みに失敗しました: {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("設定ファイルの解析に失敗しました: {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("SWEEP_CONFIG_PATH で指定されたファイルが存在しません: {0}")]
    ExplicitPathNotFound(PathBuf),

    #[error("対象リージョンが指定されていません (regions または SWEEP_REGIONS を設定してください)")]
    NoRegions,

    #[error("{field} は 1 以上である必要があります")]
    ZeroLimit { field: &'static str },

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
