//! # Simulation モジュール
//!
//! ワークシートの計算要求をまとめて評価するエンジンを提供します。
//!
//! 各要求は不変の値に対する純粋関数なので、tokio のマルチスレッドランタイム上で
//! 要求ごとに `spawn_blocking` で並列に評価し、結果は要求の順序で返します。
//! 1件の要求が失敗しても他の要求の評価は続行し、その要求だけをエラーとして報告します。
//!
//! ## 使用例
//!
//! ```rust,no_run
//! use avtcalc::scenario::ScenarioConfig;
//! use avtcalc::simulation::WorksheetEngine;
//!
//! let config = ScenarioConfig::from_file("scenarios/turn3.yaml")?;
//! let engine = WorksheetEngine::new(config.settings.clone())?;
//! for report in engine.run(&config.requests)? {
//!     println!("{}", report);
//! }
//! # Ok::<(), avtcalc::scenario::ScenarioError>(())
//! ```

use std::fmt;

use serde::Serialize;
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info, warn};

use crate::models::bearing::{
    BearingMode, TileLocation, bearing_vector_from_tiles, closing_bearing,
};
use crate::models::movement::movement;
use crate::models::shellstar::{shellstar, validate_segment};
use crate::models::{CalcError, Cartesian, HexVector};
use crate::scenario::{RequestConfig, ScenarioError, WorksheetSettings};

/// 1件の要求の評価結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestReport {
    /// 1始まりの要求番号
    pub index: usize,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// vector 要求の直交座標
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cartesian: Option<Cartesian>,
}

impl RequestReport {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

impl fmt::Display for RequestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- #{} {} ---", self.index, self.kind)?;
        if let Some(output) = &self.output {
            write!(f, "{}", output)?;
        }
        if let Some(cartesian) = &self.cartesian {
            write!(f, "\n{}", cartesian)?;
        }
        if let Some(error) = &self.error {
            write!(f, "エラー: {}", error)?;
        }
        Ok(())
    }
}

/// 計算結果の本体
struct Evaluation {
    output: String,
    cartesian: Option<Cartesian>,
}

impl From<String> for Evaluation {
    fn from(output: String) -> Self {
        Self {
            output,
            cartesian: None,
        }
    }
}

/// 1件の要求を評価（純粋関数）
pub fn evaluate(
    request: &RequestConfig,
    settings: &WorksheetSettings,
) -> Result<String, CalcError> {
    evaluate_full(request, settings).map(|e| e.output)
}

fn evaluate_full(
    request: &RequestConfig,
    settings: &WorksheetSettings,
) -> Result<Evaluation, CalcError> {
    match request {
        RequestConfig::Vector { vector } => {
            let v = HexVector::parse(vector)?;
            Ok(Evaluation {
                output: v.label(),
                cartesian: Some(v.to_cartesian()),
            })
        }
        RequestConfig::Movement { vector } => Ok(movement(vector)?.into()),
        RequestConfig::Bearing { vector, count } => {
            let mode = match count {
                Some(true) => BearingMode::Count,
                Some(false) => BearingMode::Exact,
                None => settings.bearing_mode,
            };
            Ok(HexVector::parse(vector)?.bearing_with(mode).to_string().into())
        }
        RequestConfig::Closing { from, to } => {
            let from = HexVector::parse(from)?;
            let to = HexVector::parse(to)?;
            Ok(closing_bearing(&from, &to, settings.bearing_mode)
                .to_string()
                .into())
        }
        RequestConfig::Tiles { from, to, radius } => {
            let radius = radius.unwrap_or(settings.tile_radius);
            let v = bearing_vector_from_tiles(
                TileLocation::from(*from),
                TileLocation::from(*to),
                radius,
            )?;
            Ok(format!("{}\n{}", v.label(), v.bearing_with(settings.bearing_mode)).into())
        }
        RequestConfig::Shellstar {
            bearing,
            crossing,
            muzzle_velocity,
            segment,
        } => {
            let bearing = HexVector::parse(bearing)?;
            let crossing = HexVector::parse(crossing)?;
            let mv = muzzle_velocity.muzzle_velocity()?;
            let segment = segment.map(validate_segment).transpose()?;
            Ok(shellstar(&bearing, &crossing, mv, segment)?.to_string().into())
        }
    }
}

/// ワークシート評価エンジン
pub struct WorksheetEngine {
    settings: WorksheetSettings,
    runtime: Runtime,
}

impl WorksheetEngine {
    pub fn new(settings: WorksheetSettings) -> Result<Self, ScenarioError> {
        let workers = settings.workers.max(1);
        let runtime = Builder::new_multi_thread()
            .worker_threads(workers)
            .max_blocking_threads(workers)
            .thread_name("avtcalc-worker")
            .build()
            .map_err(|e| ScenarioError::RuntimeError(e.to_string()))?;

        debug!("ワークシートエンジン初期化: ワーカー {}基", workers);
        Ok(Self { settings, runtime })
    }

    pub fn settings(&self) -> &WorksheetSettings {
        &self.settings
    }

    /// 全要求を評価し、要求の順序で結果を返す
    pub fn run(&self, requests: &[RequestConfig]) -> Result<Vec<RequestReport>, ScenarioError> {
        info!("=== ワークシート評価開始: {}件 ===", requests.len());

        let reports = self.runtime.block_on(async {
            let handles: Vec<_> = requests
                .iter()
                .cloned()
                .enumerate()
                .map(|(i, request)| {
                    let settings = self.settings.clone();
                    tokio::task::spawn_blocking(move || {
                        let result = evaluate_full(&request, &settings);
                        (i, request.kind(), result)
                    })
                })
                .collect();

            let mut reports = Vec::with_capacity(handles.len());
            for handle in handles {
                let (i, kind, result) = handle
                    .await
                    .map_err(|e| ScenarioError::RuntimeError(e.to_string()))?;
                reports.push(Self::report(i + 1, kind, result));
            }
            Ok::<_, ScenarioError>(reports)
        })?;

        let failed = reports.iter().filter(|r| !r.is_ok()).count();
        info!(
            "=== ワークシート評価完了: 成功 {}件, 失敗 {}件 ===",
            reports.len() - failed,
            failed
        );
        Ok(reports)
    }

    fn report(
        index: usize,
        kind: &'static str,
        result: Result<Evaluation, CalcError>,
    ) -> RequestReport {
        match result {
            Ok(evaluation) => {
                debug!("要求 #{} ({}) 完了", index, kind);
                RequestReport {
                    index,
                    kind,
                    output: Some(evaluation.output),
                    error: None,
                    cartesian: evaluation.cartesian,
                }
            }
            Err(e) => {
                warn!("要求 #{} ({}) 失敗: {}", index, kind, e);
                RequestReport {
                    index,
                    kind,
                    output: None,
                    error: Some(e.to_string()),
                    cartesian: None,
                }
            }
        }
    }
}
