//! # Scenario モジュール
//!
//! YAML のワークシート（計算要求の一覧）を読み込みます。
//!
//! ```yaml
//! meta:
//!   version: "1"
//!   name: "Turn 3"
//!   description: "接近戦の事前計算"
//! settings:
//!   tile_radius: 8
//!   bearing_mode: exact
//!   workers: 4
//! requests:
//!   - { kind: vector, vector: "3e 5f 1a 3b 2+" }
//!   - { kind: shellstar, bearing: "4D 1E 7-", crossing: "12D 4C 9-", muzzle_velocity: 24, segment: 8 }
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::CalcError;
use crate::models::bearing::{BearingMode, DEFAULT_TILE_RADIUS};
use crate::models::shellstar::{
    MuzzleVelocity, parse_muzzle_velocity, validate_decimal_muzzle_velocity,
    validate_muzzle_velocity, validate_segment,
};

/// ワークシートのメタデータ
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorksheetMeta {
    pub version: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// ワークシート全体に適用される設定
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WorksheetSettings {
    /// マップタイルの半径（ヘックス数）
    #[serde(default = "default_tile_radius")]
    pub tile_radius: i64,
    /// `count` を省略した bearing 要求の距離モード
    #[serde(default)]
    pub bearing_mode: BearingMode,
    /// 並列に評価するワーカー数
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_tile_radius() -> i64 {
    DEFAULT_TILE_RADIUS
}

fn default_workers() -> usize {
    4
}

impl Default for WorksheetSettings {
    fn default() -> Self {
        Self {
            tile_radius: default_tile_radius(),
            bearing_mode: BearingMode::default(),
            workers: default_workers(),
        }
    }
}

/// 数値（整数・小数）でも文字列でも書ける値（砲口速度）
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(i64),
    Decimal(f64),
    Text(String),
}

impl NumberOrText {
    pub fn muzzle_velocity(&self) -> Result<MuzzleVelocity, CalcError> {
        match self {
            NumberOrText::Number(n) => validate_muzzle_velocity(*n),
            NumberOrText::Decimal(x) => validate_decimal_muzzle_velocity(*x),
            NumberOrText::Text(text) => parse_muzzle_velocity(text),
        }
    }
}

impl fmt::Display for NumberOrText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberOrText::Number(n) => write!(f, "{}", n),
            NumberOrText::Decimal(x) => write!(f, "{}", x),
            NumberOrText::Text(text) => write!(f, "{}", text),
        }
    }
}

/// 1件の計算要求
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RequestConfig {
    /// 正規化と直交座標
    Vector { vector: String },
    /// 移動グリッド
    Movement { vector: String },
    Bearing {
        vector: String,
        /// 省略時は settings.bearing_mode
        #[serde(default, skip_serializing_if = "Option::is_none")]
        count: Option<bool>,
    },
    /// 2つの速度の閉鎖ベクトルの方位
    Closing { from: String, to: String },
    /// タイル座標 [j, k, u, v, h] からの方位
    Tiles {
        from: [i64; 5],
        to: [i64; 5],
        #[serde(default, skip_serializing_if = "Option::is_none")]
        radius: Option<i64>,
    },
    Shellstar {
        bearing: String,
        #[serde(default)]
        crossing: String,
        muzzle_velocity: NumberOrText,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        segment: Option<i64>,
    },
}

impl RequestConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            RequestConfig::Vector { .. } => "vector",
            RequestConfig::Movement { .. } => "movement",
            RequestConfig::Bearing { .. } => "bearing",
            RequestConfig::Closing { .. } => "closing",
            RequestConfig::Tiles { .. } => "tiles",
            RequestConfig::Shellstar { .. } => "shellstar",
        }
    }

    /// 一覧表示用の1行要約
    pub fn summary(&self) -> String {
        match self {
            RequestConfig::Vector { vector } | RequestConfig::Movement { vector } => {
                format!("\"{}\"", vector)
            }
            RequestConfig::Bearing { vector, count } => match count {
                Some(true) => format!("\"{}\" (count)", vector),
                _ => format!("\"{}\"", vector),
            },
            RequestConfig::Closing { from, to } => format!("\"{}\" -> \"{}\"", from, to),
            RequestConfig::Tiles { from, to, .. } => format!("{:?} -> {:?}", from, to),
            RequestConfig::Shellstar {
                bearing,
                crossing,
                muzzle_velocity,
                segment,
            } => {
                let mut text = format!("\"{}\" / \"{}\" / mv {}", bearing, crossing, muzzle_velocity);
                if let Some(s) = segment {
                    text.push_str(&format!(" / seg {}", s));
                }
                text
            }
        }
    }

    /// 実行前に検出できる数値の誤り
    ///
    /// ベクトル文字列の構文は実行時に要求ごとに報告します。
    fn validate(&self) -> Result<(), CalcError> {
        match self {
            RequestConfig::Tiles {
                radius: Some(r), ..
            } if *r <= 0 => Err(CalcError::Range {
                name: "radius",
                value: *r,
                min: 1,
                max: i64::MAX,
            }),
            RequestConfig::Shellstar {
                muzzle_velocity,
                segment,
                ..
            } => {
                muzzle_velocity.muzzle_velocity()?;
                if let Some(s) = segment {
                    validate_segment(*s)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// 完全なワークシート設定
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScenarioConfig {
    pub meta: WorksheetMeta,
    #[serde(default)]
    pub settings: WorksheetSettings,
    pub requests: Vec<RequestConfig>,
}

impl ScenarioConfig {
    /// YAMLファイルからワークシートを読み込み
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.to_path_buf()));
        }

        let contents =
            fs::read_to_string(path).map_err(|e| ScenarioError::IoError(path.to_path_buf(), e))?;

        let config: ScenarioConfig = serde_yaml::from_str(&contents)
            .map_err(|e| ScenarioError::ParseError(path.to_path_buf(), e))?;

        config.validate()?;

        Ok(config)
    }

    /// YAML文字列からワークシートを読み込み
    pub fn from_yaml_str(contents: &str) -> Result<Self, ScenarioError> {
        let config: ScenarioConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// 設定の基本的な検証
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.settings.tile_radius <= 0 {
            return Err(ScenarioError::ValidationError(
                "tile_radius must be positive".to_string(),
            ));
        }
        if self.settings.workers == 0 {
            return Err(ScenarioError::ValidationError(
                "workers must be at least 1".to_string(),
            ));
        }
        if self.requests.is_empty() {
            return Err(ScenarioError::ValidationError(
                "requests must not be empty".to_string(),
            ));
        }

        for (i, request) in self.requests.iter().enumerate() {
            request.validate().map_err(|e| {
                ScenarioError::ValidationError(format!("request #{} ({}): {}", i + 1, request.kind(), e))
            })?;
        }

        Ok(())
    }

    /// ワークシートの概要を表示
    pub fn print_summary(&self) {
        println!("=== ワークシート情報 ===");
        println!("名前: {}", self.meta.name);
        if !self.meta.description.is_empty() {
            println!("説明: {}", self.meta.description);
        }
        println!("バージョン: {}", self.meta.version);
        println!();

        println!("=== 設定 ===");
        println!("タイル半径: {}", self.settings.tile_radius);
        println!("距離モード: {:?}", self.settings.bearing_mode);
        println!("ワーカー数: {}", self.settings.workers);
        println!();

        println!("=== 計算要求 ({}件) ===", self.requests.len());
        for (i, request) in self.requests.iter().enumerate() {
            println!("  #{} {}: {}", i + 1, request.kind(), request.summary());
        }
    }
}

/// ワークシート読み込み・実行エラー
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("ワークシートファイルが見つかりません: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("ファイル読み込みエラー {}: {}", .0.display(), .1)]
    IoError(PathBuf, #[source] std::io::Error),
    #[error("YAML解析エラー {}: {}", .0.display(), .1)]
    ParseError(PathBuf, #[source] serde_yaml::Error),
    #[error("YAML解析エラー: {0}")]
    YamlError(#[from] serde_yaml::Error),
    #[error("設定検証エラー: {0}")]
    ValidationError(String),
    #[error("実行環境エラー: {0}")]
    RuntimeError(String),
}
