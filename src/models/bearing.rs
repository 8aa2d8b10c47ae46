//! # Bearing モジュール
//!
//! ヘックスベクトルから、原点から見た距離（四捨五入した整数）と
//! AVID ウィンドウを求めます。
//!
//! ## 距離の計算モード
//!
//! - **Exact**: 隣接2成分を60度で交わる三角形の2辺とみなし、余弦定理で
//!   真のユークリッド距離を求めます。
//! - **Count**: 水平距離を2成分の単純な和とします（卓上ルールの数え方）。
//!
//! どちらのモードでも、垂直成分は水平面と直交するので直角三角形の斜辺として
//! 合成します。全ての比較は2乗した整数で行い、浮動小数点は使いません。

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::avid::{AvidWindow, POLE_LEVEL};
use crate::models::common::Lattice3D;
use crate::models::common::math_utils::round_sqrt;
use crate::models::direction::Direction;
use crate::models::error::CalcError;
use crate::models::vector::HexVector;

/// minor × 3 ≥ major のとき辺ウィンドウ（"X/Y"）になる
pub const EDGE_WINDOW_RATIO: u64 = 3;

/// 垂直段階の判定係数（4v > h, v > h, v ≥ 4h）
pub const ELEVATION_FACTOR: u128 = 4;

pub const DEFAULT_TILE_RADIUS: i64 = 8;

/// 水平距離の計算モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BearingMode {
    #[default]
    Exact,
    Count,
}

/// 方位計算の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BearingResult {
    /// ゼロベクトル（どのウィンドウにも属さない）
    Motionless,
    Sighted { distance: u64, window: AvidWindow },
}

impl BearingResult {
    pub fn distance(&self) -> u64 {
        match self {
            BearingResult::Motionless => 0,
            BearingResult::Sighted { distance, .. } => *distance,
        }
    }

    pub fn window(&self) -> Option<AvidWindow> {
        match self {
            BearingResult::Motionless => None,
            BearingResult::Sighted { window, .. } => Some(*window),
        }
    }

    pub fn is_motionless(&self) -> bool {
        matches!(self, BearingResult::Motionless)
    }
}

impl fmt::Display for BearingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BearingResult::Motionless => write!(f, "NONE"),
            BearingResult::Sighted { distance, window } => write!(f, "{} {}", distance, window),
        }
    }
}

/// 水平距離の2乗
pub fn horizontal_distance_squared(vector: &HexVector, mode: BearingMode) -> u128 {
    let major = vector.major_magnitude() as u128;
    let minor = vector.minor_magnitude() as u128;
    match mode {
        BearingMode::Exact => major * major + major * minor + minor * minor,
        BearingMode::Count => (major + minor) * (major + minor),
    }
}

/// 水平距離（四捨五入）
pub fn horizontal_distance(vector: &HexVector, mode: BearingMode) -> u64 {
    round_sqrt(horizontal_distance_squared(vector, mode))
}

/// 水平距離に対する垂直成分の大きさから高さ段階 0〜3 を求める
pub fn elevation_level(vertical: u64, horizontal_squared: u128) -> i8 {
    let v2 = (vertical as u128) * (vertical as u128);
    let k2 = ELEVATION_FACTOR * ELEVATION_FACTOR;
    let mut level = 0;
    if k2 * v2 > horizontal_squared {
        level += 1;
    }
    if v2 > horizontal_squared {
        level += 1;
    }
    if v2 >= k2 * horizontal_squared {
        level += 1;
    }
    level
}

/// 水平ウィンドウの位置（A=0 … F/A=11）
fn horizontal_window(vector: &HexVector) -> i64 {
    let Some(major) = vector.major() else {
        return 0;
    };
    let a = major.direction.ordinal().unwrap_or(0) as i64;
    match vector.minor() {
        Some(minor) if minor.magnitude * EDGE_WINDOW_RATIO >= major.magnitude => {
            let b = minor.direction.ordinal().unwrap_or(0) as i64;
            // 辺ウィンドウは時計回り順の前側の方向に続く位置
            if (b - a).rem_euclid(6) == 1 {
                2 * a + 1
            } else {
                2 * b + 1
            }
        }
        _ => 2 * a,
    }
}

/// ベクトルの距離と AVID ウィンドウ
pub fn bearing(vector: &HexVector, mode: BearingMode) -> BearingResult {
    if vector.is_zero() {
        return BearingResult::Motionless;
    }

    let h2 = horizontal_distance_squared(vector, mode);
    let vertical = vector.vertical_magnitude();
    let distance = round_sqrt(h2 + (vertical as u128) * (vertical as u128));

    let level = elevation_level(vertical, h2).min(POLE_LEVEL);
    let signed_level = match vector.vertical() {
        Some(c) if c.direction == Direction::Down => -level,
        _ => level,
    };

    BearingResult::Sighted {
        distance,
        window: AvidWindow::new(horizontal_window(vector), signed_level),
    }
}

/// 2つの速度の相対（閉鎖）ベクトル `to - from` の方位
pub fn closing_bearing(from: &HexVector, to: &HexVector, mode: BearingMode) -> BearingResult {
    bearing(&(*to - *from), mode)
}

impl HexVector {
    pub fn bearing(&self) -> BearingResult {
        bearing(self, BearingMode::Exact)
    }

    pub fn bearing_with(&self, mode: BearingMode) -> BearingResult {
        bearing(self, mode)
    }
}

/// マップタイル上の位置（タイル座標 j,k、タイル内格子座標 u,v、高度 h）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileLocation {
    pub j: i64,
    pub k: i64,
    pub u: i64,
    pub v: i64,
    pub h: i64,
}

impl From<[i64; 5]> for TileLocation {
    fn from([j, k, u, v, h]: [i64; 5]) -> Self {
        Self { j, k, u, v, h }
    }
}

/// 2地点のタイル座標から、from から見た to の方位ベクトルを求める
pub fn bearing_vector_from_tiles(
    from: TileLocation,
    to: TileLocation,
    tile_radius: i64,
) -> Result<HexVector, CalcError> {
    if tile_radius <= 0 {
        return Err(CalcError::Range {
            name: "tile_radius",
            value: tile_radius,
            min: 1,
            max: i64::MAX,
        });
    }

    let dj = to.j - from.j;
    let dk = to.k - from.k;
    let m = dk + 2 * dj;
    let n = dk - dj;

    Ok(HexVector::from_lattice(Lattice3D::new(
        to.u - from.u + tile_radius * m,
        to.v - from.v + tile_radius * n,
        to.h - from.h,
    )))
}
