//! # Shellstar モジュール
//!
//! シーカー（誘導弾）の迎撃計算を行います。
//!
//! ## モデル
//!
//! - 目標の相対位置は方位ベクトル（bearing）から始まり、相対速度ベクトル
//!   （crossing）の移動スケジュールに従ってセグメントごとに整数ヘックスずつ動く
//! - シーカーは発射後 `k` セグメントで `k × 砲口速度 / 8` ヘックス進む
//! - 残距離 `|位置_k| − k·mv/8` が0以下になったセグメントで命中（HIT）
//!
//! 残距離が前のセグメントより増えた場合、最大飛翔時間内に命中しない場合、
//! または命中時の相対速度が小さすぎる場合は射撃不能（No Shot）です。
//! これはエラーではなく正常な計算結果です。
//!
//! 砲口速度は十進小数のまま整数比で保持し、距離の比較と丸めは
//! 全て整数の平方根で厳密に行います。

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use tracing::{debug, trace};

use crate::models::avid::{AvidWindow, OrthogonalWindows};
use crate::models::bearing::BearingResult;
use crate::models::common::Lattice3D;
use crate::models::common::math_utils::{cmp_sqrt_plus, floor_sqrt_offset_div};
use crate::models::error::CalcError;
use crate::models::movement::{MovementSchedule, SEGMENTS_PER_TURN};
use crate::models::vector::HexVector;

/// 最大飛翔セグメント数（8ターン）
pub const MAX_FLIGHT_SEGMENTS: u64 = 8 * SEGMENTS_PER_TURN;

/// 発射セグメント省略時はターン終了（セグメント8）に発射したものとする
pub const DEFAULT_LAUNCH_SEGMENT: u8 = 8;

/// 飛翔セグメント数ごとの回避推力（少し / 大きく）
///
/// 接近の幾何からは導かず、飛翔セグメント数だけで引く固定の表です。
/// 添字は飛翔セグメント数 − 1、9 以上は最後の値を使います。
pub const EVASION_CHART: [(u8, u8); 9] = [
    (0, 1),
    (0, 2),
    (1, 3),
    (1, 4),
    (1, 5),
    (2, 6),
    (2, 7),
    (2, 7),
    (2, 8),
];

// 距離を 1/8 ヘックス単位で扱うための平方倍率
const EIGHTHS_SQUARED: u128 = (SEGMENTS_PER_TURN * SEGMENTS_PER_TURN) as u128;

/// 砲口速度の小数部の最大桁数
pub const MUZZLE_VELOCITY_DECIMALS: u32 = 3;

/// 命中時の相対速度（ヘックス/ターン）がこれ未満なら射撃不能
pub const MIN_IMPACT_SPEED: f64 = 0.25;

/// 砲口速度（ヘックス/ターン）
///
/// 十進小数を `units / 10^decimals` として厳密に保持します。
/// 末尾の0は取り除くので `24` と `24.0` は等しくなります。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MuzzleVelocity {
    units: u64,
    decimals: u32,
}

impl MuzzleVelocity {
    /// 分子（1/10^decimals ヘックス単位）
    pub fn units(&self) -> u64 {
        self.units
    }

    /// 分母 10^decimals
    pub fn denominator(&self) -> u64 {
        10u64.pow(self.decimals)
    }

    pub fn is_zero(&self) -> bool {
        self.units == 0
    }

    pub fn as_f64(&self) -> f64 {
        self.units as f64 / self.denominator() as f64
    }
}

impl From<u32> for MuzzleVelocity {
    fn from(hexes: u32) -> Self {
        Self {
            units: u64::from(hexes),
            decimals: 0,
        }
    }
}

/// `"24"`, `"22.5"`, `"+0.125"` のような十進表記を解析
///
/// 数値でなければ型エラー、0以下・小数4桁以上・`u32::MAX` 超は範囲エラーです。
impl FromStr for MuzzleVelocity {
    type Err = CalcError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let type_error = || CalcError::Type {
            what: "砲口速度",
            value: text.to_string(),
        };
        let trimmed = text.trim();
        let out_of_range = |expected| CalcError::Bound {
            name: "muzzle_velocity",
            value: trimmed.to_string(),
            expected,
        };

        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
            return Err(type_error());
        }

        let whole = whole.trim_start_matches('0');
        let fraction = fraction.trim_end_matches('0');
        if negative || (whole.is_empty() && fraction.is_empty()) {
            return Err(out_of_range("0 より大きい値"));
        }
        if fraction.len() > MUZZLE_VELOCITY_DECIMALS as usize {
            return Err(out_of_range("小数3桁まで"));
        }

        let hexes = match whole {
            "" => 0,
            digits => digits
                .parse::<u32>()
                .map_err(|_| out_of_range("u32::MAX ヘックス以下"))?,
        };
        let fraction_units = match fraction {
            "" => 0,
            digits => digits.parse::<u64>().map_err(|_| type_error())?,
        };
        let decimals = fraction.len() as u32;
        Ok(Self {
            units: u64::from(hexes) * 10u64.pow(decimals) + fraction_units,
            decimals,
        })
    }
}

impl fmt::Display for MuzzleVelocity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.decimals == 0 {
            return write!(f, "{}", self.units);
        }
        let denominator = self.denominator();
        write!(
            f,
            "{}.{:0width$}",
            self.units / denominator,
            self.units % denominator,
            width = self.decimals as usize
        )
    }
}

/// トラックの時刻表記
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackTime {
    /// ターン:セグメント（発射セグメント指定時）
    Segment { turn: u64, segment: u8 },
    /// 発射からの経過セグメント数
    Offset(u64),
}

impl fmt::Display for TrackTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackTime::Segment { turn, segment } => write!(f, "{}:{}", turn, segment),
            TrackTime::Offset(k) => write!(f, "+{}", k),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackReading {
    /// 残距離（四捨五入）
    Distance(u64),
    Hit,
}

impl fmt::Display for TrackReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackReading::Distance(d) => write!(f, "{}", d),
            TrackReading::Hit => write!(f, "HIT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackEntry {
    pub time: TrackTime,
    pub reading: TrackReading,
}

impl fmt::Display for TrackEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.time, self.reading)
    }
}

/// 時刻と残距離の列（最後の要素は必ず HIT）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterceptTrack {
    entries: Vec<TrackEntry>,
}

impl InterceptTrack {
    pub fn entries(&self) -> &[TrackEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&TrackEntry> {
        self.entries.last()
    }

    /// 発射から命中までのセグメント数
    pub fn flight_segments(&self) -> u64 {
        self.entries.len().saturating_sub(1) as u64
    }

    /// 命中直前の区間での残距離の減少量（負にはしない）
    pub fn rate_of_closure(&self) -> u64 {
        let readings: Vec<u64> = self
            .entries
            .iter()
            .filter_map(|e| match e.reading {
                TrackReading::Distance(d) => Some(d),
                TrackReading::Hit => None,
            })
            .collect();
        match readings.as_slice() {
            [.., previous, last] => previous.saturating_sub(*last),
            _ => 0,
        }
    }
}

/// 回避に必要な推力の閾値
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvasionThresholds {
    pub little: u8,
    pub lot: u8,
}

impl EvasionThresholds {
    /// 飛翔セグメント数から閾値を引く（0 セグメントは回避不能）
    pub fn for_flight(segments: u64) -> Option<Self> {
        if segments == 0 {
            return None;
        }
        let index = (segments as usize - 1).min(EVASION_CHART.len() - 1);
        let (little, lot) = EVASION_CHART[index];
        Some(Self { little, lot })
    }
}

impl fmt::Display for EvasionThresholds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.little, self.lot)
    }
}

/// 目標から見たシーカーの接近ウィンドウ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApproachWindow {
    Ring {
        window: AvidWindow,
        orthogonal: OrthogonalWindows,
    },
    /// 天頂・天底からの接近（amber リングで回避）
    Pole(AvidWindow),
    /// 相対位置が常にゼロで方向が定まらない
    Unresolved,
}

impl ApproachWindow {
    fn from_bearing(result: BearingResult) -> Self {
        let Some(window) = result.window() else {
            return ApproachWindow::Unresolved;
        };
        match window.orthogonal() {
            Some(orthogonal) => ApproachWindow::Ring { window, orthogonal },
            None => ApproachWindow::Pole(window),
        }
    }

    pub fn window(&self) -> Option<AvidWindow> {
        match self {
            ApproachWindow::Ring { window, .. } | ApproachWindow::Pole(window) => Some(*window),
            ApproachWindow::Unresolved => None,
        }
    }
}

/// 接近ウィンドウと上下左右の回避方向の図
impl fmt::Display for ApproachWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApproachWindow::Ring { window, orthogonal } => {
                let left = orthogonal.left.to_string();
                let pad = " ".repeat(left.len());
                writeln!(f, "{}  {}", pad, orthogonal.up)?;
                writeln!(f, "{} ({}) {}", left, window, orthogonal.right)?;
                write!(f, "{}  {}", pad, orthogonal.down)
            }
            ApproachWindow::Pole(window) => {
                writeln!(f, "({})", window)?;
                write!(f, "Evade in Amber Ring")
            }
            ApproachWindow::Unresolved => write!(f, "(NONE)"),
        }
    }
}

/// 迎撃可能な場合の計算結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptSolution {
    pub approach: ApproachWindow,
    pub evasion: Option<EvasionThresholds>,
    pub track: InterceptTrack,
    pub rate_of_closure: u64,
    /// 命中時の目標の相対位置
    pub impact_position: HexVector,
}

impl fmt::Display for InterceptSolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.approach)?;
        match self.evasion {
            Some(thresholds) => writeln!(f, ">{} to evade", thresholds)?,
            None => writeln!(f, ">N/A to evade")?,
        }
        for entry in self.track.entries() {
            writeln!(f, "{}", entry)?;
        }
        write!(f, "RoC: {}", self.rate_of_closure)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellstarOutcome {
    NoShot,
    Shot(Box<InterceptSolution>),
}

impl ShellstarOutcome {
    pub fn is_shot(&self) -> bool {
        matches!(self, ShellstarOutcome::Shot(_))
    }

    pub fn solution(&self) -> Option<&InterceptSolution> {
        match self {
            ShellstarOutcome::NoShot => None,
            ShellstarOutcome::Shot(solution) => Some(&**solution),
        }
    }
}

impl fmt::Display for ShellstarOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellstarOutcome::NoShot => write!(f, "No Shot"),
            ShellstarOutcome::Shot(solution) => write!(f, "{}", solution),
        }
    }
}

/// 発射セグメントの検証（1〜8）
pub fn validate_segment(segment: i64) -> Result<u8, CalcError> {
    if (1..=SEGMENTS_PER_TURN as i64).contains(&segment) {
        Ok(segment as u8)
    } else {
        Err(CalcError::Range {
            name: "segment",
            value: segment,
            min: 1,
            max: SEGMENTS_PER_TURN as i64,
        })
    }
}

/// 砲口速度の文字列を解析（数値でなければ型エラー、0以下は範囲エラー）
pub fn parse_muzzle_velocity(text: &str) -> Result<MuzzleVelocity, CalcError> {
    text.parse()
}

/// 整数の砲口速度の検証
pub fn validate_muzzle_velocity(value: i64) -> Result<MuzzleVelocity, CalcError> {
    u32::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .map(MuzzleVelocity::from)
        .ok_or(CalcError::Range {
            name: "muzzle_velocity",
            value,
            min: 1,
            max: u32::MAX as i64,
        })
}

/// 小数で与えられた砲口速度の検証（YAML の浮動小数点数など）
pub fn validate_decimal_muzzle_velocity(value: f64) -> Result<MuzzleVelocity, CalcError> {
    value.to_string().parse()
}

fn track_time(launch: u8, step: u64, show_segments: bool) -> TrackTime {
    if !show_segments {
        return TrackTime::Offset(step);
    }
    let index = u64::from(launch - 1) + step;
    TrackTime::Segment {
        turn: index / SEGMENTS_PER_TURN,
        segment: (index % SEGMENTS_PER_TURN) as u8 + 1,
    }
}

/// シーカー迎撃計算
///
/// # 引数
///
/// * `bearing` - 発射時の目標の相対位置
/// * `crossing` - 目標の相対速度（1ターンあたり）
/// * `muzzle_velocity` - シーカーの速度（1ターンあたりのヘックス数、小数可）
/// * `segment` - 発射セグメント（1〜8）。指定すると時刻を `ターン:セグメント` で表記
///
/// # エラー
///
/// 砲口速度が0、またはセグメントが範囲外の場合は計算を始める前に失敗します。
pub fn shellstar(
    bearing: &HexVector,
    crossing: &HexVector,
    muzzle_velocity: MuzzleVelocity,
    segment: Option<u8>,
) -> Result<ShellstarOutcome, CalcError> {
    if muzzle_velocity.is_zero() {
        return Err(CalcError::Bound {
            name: "muzzle_velocity",
            value: muzzle_velocity.to_string(),
            expected: "0 より大きい値",
        });
    }
    if let Some(s) = segment {
        validate_segment(i64::from(s))?;
    }

    let show_segments = segment.is_some();
    let launch = segment.unwrap_or(DEFAULT_LAUNCH_SEGMENT);
    let schedule = MovementSchedule::of(crossing);
    // 距離は 1/(8·分母) ヘックス単位。シーカーは1セグメントに units 進む
    let denominator = i128::from(muzzle_velocity.denominator());
    let scale = EIGHTHS_SQUARED * (denominator * denominator).unsigned_abs();
    let mv = i128::from(muzzle_velocity.units());

    debug!(
        "迎撃計算開始: bearing={}, crossing={}, mv={}, launch={}",
        bearing.label(),
        crossing.label(),
        muzzle_velocity,
        launch
    );

    let mut position: Lattice3D = bearing.to_lattice();
    let mut previous = scale * position.norm_squared();
    let mut entries = Vec::new();

    for step in 0..=MAX_FLIGHT_SEGMENTS {
        if step > 0 {
            let flight_segment = u64::from(launch) + step - 1;
            position = position + schedule.segment_displacement(flight_segment);
        }

        // 64·分母²·|位置|² と (units·k)² を比較して判定
        let scaled = scale * position.norm_squared();
        if step > 0 && cmp_sqrt_plus(scaled, previous, mv) == Ordering::Greater {
            debug!("残距離が増加したため射撃不能: step={}", step);
            return Ok(ShellstarOutcome::NoShot);
        }

        let travel = mv * step as i128;
        let time = track_time(launch, step, show_segments);
        if scaled <= (travel * travel).unsigned_abs() {
            trace!("{} HIT", time);
            entries.push(TrackEntry {
                time,
                reading: TrackReading::Hit,
            });
            let impact = HexVector::from_lattice(position);
            if let Some(speed) = impact_speed(bearing, &impact, crossing, muzzle_velocity)
                .filter(|speed| *speed < MIN_IMPACT_SPEED)
            {
                debug!("命中時の相対速度 {:.3} が小さすぎるため射撃不能", speed);
                return Ok(ShellstarOutcome::NoShot);
            }
            let track = InterceptTrack { entries };
            return Ok(ShellstarOutcome::Shot(Box::new(solve(bearing, impact, track))));
        }

        let rounded = floor_sqrt_offset_div(
            scaled,
            4 * denominator - travel,
            SEGMENTS_PER_TURN as i128 * denominator,
        );
        let reading = TrackReading::Distance(rounded.max(0) as u64);
        trace!("{} {}", time, reading);
        entries.push(TrackEntry { time, reading });
        previous = scaled;
    }

    debug!("最大飛翔時間内に命中しないため射撃不能");
    Ok(ShellstarOutcome::NoShot)
}

/// 命中時のシーカーと目標の相対速度（ヘックス/ターン）
///
/// シーカーは視線方向（命中位置、ゼロなら発射時の方位）に砲口速度で進むものとします。
/// 視線が定まらない場合は `None` です。
fn impact_speed(
    bearing: &HexVector,
    impact: &HexVector,
    crossing: &HexVector,
    muzzle_velocity: MuzzleVelocity,
) -> Option<f64> {
    let toward = if impact.is_zero() { bearing } else { impact };
    if toward.is_zero() {
        return None;
    }
    let line = toward.to_cartesian();
    let target = crossing.to_cartesian();
    let length = (toward.to_lattice().norm_squared() as f64).sqrt();
    let ratio = muzzle_velocity.as_f64() / length;

    let dx = line.x() * ratio - target.x();
    let dy = line.y() * ratio - target.y();
    let dz = line.z() * ratio - target.z();
    Some((dx * dx + dy * dy + dz * dz).sqrt())
}

fn solve(bearing: &HexVector, impact: HexVector, track: InterceptTrack) -> InterceptSolution {
    let toward = if impact.is_zero() { *bearing } else { impact };
    let approach = ApproachWindow::from_bearing((-toward).bearing());
    let evasion = EvasionThresholds::for_flight(track.flight_segments());
    let rate_of_closure = track.rate_of_closure();

    debug!(
        "命中: {}セグメント, RoC={}, 位置={}",
        track.flight_segments(),
        rate_of_closure,
        impact.label()
    );

    InterceptSolution {
        approach,
        evasion,
        track,
        rate_of_closure,
        impact_position: impact,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(text: &str) -> HexVector {
        HexVector::parse(text).unwrap()
    }

    fn hexes(value: u32) -> MuzzleVelocity {
        MuzzleVelocity::from(value)
    }

    fn report(bearing: &str, crossing: &str, mv: u32, segment: Option<u8>) -> String {
        shellstar(&vector(bearing), &vector(crossing), mv.into(), segment)
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_run_away() {
        assert_eq!(report("6A", "20A 6B", 24, None), "No Shot");
        assert_eq!(report("6a", "26a", 24, None), "No Shot");
    }

    #[test]
    fn test_standstill() {
        let expected = [
            "   +++",
            "F (D/E) C",
            "   ---",
            ">2/6 to evade",
            "+0 17",
            "+1 14",
            "+2 11",
            "+3 8",
            "+4 5",
            "+5 2",
            "+6 HIT",
            "RoC: 3",
        ];
        assert_eq!(report("13A 5B 4-", "", 24, None), expected.join("\n"));
    }

    #[test]
    fn test_segment_labels() {
        let outcome = shellstar(&vector("4D 1E 7-"), &vector("12D 4C 9-"), hexes(24), Some(8)).unwrap();
        let solution = outcome.solution().unwrap();
        let labels: Vec<String> = solution
            .track
            .entries()
            .iter()
            .map(|e| e.to_string())
            .collect();
        assert_eq!(labels.first().map(String::as_str), Some("0:8 8"));
        assert_eq!(&labels[labels.len() - 2..], ["2:1 0", "2:2 HIT"]);
        assert_eq!(solution.rate_of_closure, 1);
        assert_eq!(solution.evasion.map(|e| e.to_string()), Some("2/8".to_string()));
    }

    #[test]
    fn test_pole_window() {
        let expected = [
            "(---)",
            "Evade in Amber Ring",
            ">1/3 to evade",
            "+0 8",
            "+1 5",
            "+2 2",
            "+3 HIT",
            "RoC: 3",
        ];
        assert_eq!(report("4D 1E 7+", "12A 3C", 20, None), expected.join("\n"));
    }

    #[test]
    fn test_immediate_hit() {
        let expected = ["(NONE)", ">N/A to evade", "+0 HIT", "RoC: 0"];
        assert_eq!(report("", "", 24, None), expected.join("\n"));
    }

    #[test]
    fn test_single_reading_has_no_closure() {
        let outcome = shellstar(&vector("1A"), &HexVector::ZERO, hexes(24), None).unwrap();
        let solution = outcome.solution().unwrap();
        assert_eq!(solution.track.len(), 2);
        assert_eq!(solution.rate_of_closure, 0);
        assert_eq!(solution.approach.window().map(|w| w.to_string()), Some("D".to_string()));
        assert_eq!(solution.evasion, EvasionThresholds::for_flight(1));
    }

    #[test]
    fn test_never_reaches_within_horizon() {
        // 並走する目標には追いつけない
        assert!(!shellstar(&vector("40A"), &vector("24A"), hexes(24), None).unwrap().is_shot());
    }

    #[test]
    fn test_huge_magnitudes_do_not_overflow() {
        let v = vector("4000000000A");
        let outcome = shellstar(&v, &v, hexes(24), None).unwrap();
        assert_eq!(outcome, ShellstarOutcome::NoShot);
        let outcome = shellstar(&v, &HexVector::ZERO, u32::MAX.into(), None).unwrap();
        assert!(outcome.is_shot());
    }

    #[test]
    fn test_fractional_muzzle_velocity() {
        let mv: MuzzleVelocity = "22.5".parse().unwrap();
        let outcome = shellstar(&vector("13A 5B 4-"), &HexVector::ZERO, mv, None).unwrap();
        let expected = [
            "   +++",
            "F (D/E) C",
            "   ---",
            ">2/6 to evade",
            "+0 17",
            "+1 14",
            "+2 11",
            "+3 8",
            "+4 5",
            "+5 3",
            "+6 HIT",
            "RoC: 2",
        ];
        assert_eq!(outcome.to_string(), expected.join("\n"));
    }

    #[test]
    fn test_slow_impact_is_no_shot() {
        // 目標は 24 で遠ざかるので相対速度は 0.2 と 0.3
        let slow = parse_muzzle_velocity("24.2").unwrap();
        let outcome = shellstar(&vector("1A"), &vector("24A"), slow, None).unwrap();
        assert_eq!(outcome, ShellstarOutcome::NoShot);

        let fast = parse_muzzle_velocity("24.3").unwrap();
        let outcome = shellstar(&vector("1A"), &vector("24A"), fast, None).unwrap();
        let solution = outcome.solution().unwrap();
        assert_eq!(solution.track.last().map(|e| e.to_string()), Some("+27 HIT".to_string()));
    }

    #[test]
    fn test_input_validation() {
        let v = vector("6A");
        assert!(shellstar(&v, &v, hexes(0), None).unwrap_err().is_range());
        assert!(shellstar(&v, &v, hexes(24), Some(0)).unwrap_err().is_range());
        assert!(shellstar(&v, &v, hexes(24), Some(9)).unwrap_err().is_range());
        assert!(validate_segment(-1).unwrap_err().is_range());
        assert_eq!(validate_segment(4).unwrap(), 4);
    }

    #[test]
    fn test_parse_muzzle_velocity() {
        assert_eq!(parse_muzzle_velocity("24").unwrap(), hexes(24));
        assert_eq!(parse_muzzle_velocity(" 20 ").unwrap(), hexes(20));
        assert_eq!(parse_muzzle_velocity("24.0").unwrap(), hexes(24));
        assert!(parse_muzzle_velocity("fast").unwrap_err().is_type());
        assert!(parse_muzzle_velocity("2.5.1").unwrap_err().is_type());
        assert!(parse_muzzle_velocity(".").unwrap_err().is_type());
        assert!(parse_muzzle_velocity("0").unwrap_err().is_range());
        assert!(parse_muzzle_velocity("0.000").unwrap_err().is_range());
        assert!(parse_muzzle_velocity("-3").unwrap_err().is_range());
        assert!(parse_muzzle_velocity("1.0625").unwrap_err().is_range());
        assert!(parse_muzzle_velocity("4294967296").unwrap_err().is_range());
    }

    #[test]
    fn test_decimal_muzzle_velocity() {
        let mv = parse_muzzle_velocity("22.50").unwrap();
        assert_eq!((mv.units(), mv.denominator()), (225, 10));
        assert_eq!(mv.to_string(), "22.5");
        let mv = parse_muzzle_velocity("+.125").unwrap();
        assert_eq!(mv.to_string(), "0.125");
        assert_eq!(validate_decimal_muzzle_velocity(22.5).unwrap(), parse_muzzle_velocity("22.5").unwrap());
        assert!(validate_decimal_muzzle_velocity(-1.5).unwrap_err().is_range());
        assert!(validate_decimal_muzzle_velocity(f64::NAN).unwrap_err().is_type());
    }

    #[test]
    fn test_evasion_chart() {
        assert_eq!(EvasionThresholds::for_flight(0), None);
        let label = |s| EvasionThresholds::for_flight(s).unwrap().to_string();
        assert_eq!(label(1), "0/1");
        assert_eq!(label(5), "1/5");
        assert_eq!(label(8), "2/7");
        assert_eq!(label(9), "2/8");
        assert_eq!(label(40), "2/8");
    }

    #[test]
    fn test_rate_of_closure_saturates() {
        let entry = |k, d| TrackEntry {
            time: TrackTime::Offset(k),
            reading: TrackReading::Distance(d),
        };
        let track = InterceptTrack {
            entries: vec![
                entry(0, 3),
                entry(1, 4),
                TrackEntry {
                    time: TrackTime::Offset(2),
                    reading: TrackReading::Hit,
                },
            ],
        };
        assert_eq!(track.rate_of_closure(), 0);
        assert_eq!(track.flight_segments(), 2);
    }
}
