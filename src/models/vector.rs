//! # Vector モジュール
//!
//! ベクトル文字列の解析と、正規化済みのヘックスベクトル値型を提供します。
//!
//! ## ベクトル文字列
//!
//! 空白区切りの `<正の整数><方向>` トークン列です（例: `"4A 2C 6+"`）。
//! 大文字小文字は区別せず、空文字列はゼロベクトルを表します。
//! 同じ方向文字を1つの文字列内で繰り返すことはできません。
//!
//! ## 正規化
//!
//! 任意個の成分（反対向き・非隣接を含む）は、格子上の1点に合成した後、
//! その点を含む60度セクタの2方向で分解し直します。
//! 結果は「隣接する水平2成分 + 垂直1成分」以下になります。

use std::fmt;
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::models::common::{Cartesian, Lattice3D};
use crate::models::direction::{ALL, Direction, HORIZONTAL};
use crate::models::error::{CalcError, ParseErrorKind};

/// 方向と大きさの組
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Component {
    pub direction: Direction,
    pub magnitude: u64,
}

impl Component {
    pub fn new(direction: Direction, magnitude: u64) -> Self {
        Self {
            direction,
            magnitude,
        }
    }

    /// 反対方向に向けた同じ大きさの成分
    pub fn flipped(&self) -> Self {
        Self::new(self.direction.opposite(), self.magnitude)
    }

    pub fn lattice(&self) -> Lattice3D {
        self.direction.lattice() * self.magnitude as i64
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.magnitude, self.direction)
    }
}

/// 正規化前の成分の多重集合
///
/// 重複や反対向き、非隣接の方向を含んでいても構いません。
/// 他のコンポーネントに渡す前に必ず [`HexVector::canonicalize`] で正規化します。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawComponents(Vec<Component>);

impl RawComponents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, component: Component) {
        self.0.push(component);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 全成分を格子上で合成した点
    pub fn resultant(&self) -> Lattice3D {
        self.0
            .iter()
            .fold(Lattice3D::ZERO, |acc, c| acc + c.lattice())
    }
}

impl FromIterator<Component> for RawComponents {
    fn from_iter<I: IntoIterator<Item = Component>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// ベクトル文字列を成分の多重集合に解析
///
/// # エラー
///
/// - 大きさが0以下、または整数でない
/// - 方向文字が A〜F, +, - 以外
/// - 数値または方向が欠けている
/// - 同じ方向文字が2回現れる
pub fn parse(text: &str) -> Result<RawComponents, CalcError> {
    let mut seen = [false; ALL.len()];
    let mut raw = RawComponents::new();

    for token in text.split_whitespace() {
        let component = parse_token(token)?;
        let slot = &mut seen[component.direction.index()];
        if *slot {
            return Err(CalcError::parse(
                token,
                ParseErrorKind::DuplicateDirection(component.direction),
            ));
        }
        *slot = true;
        raw.push(component);
    }

    Ok(raw)
}

/// バイト列からの解析（UTF-8 でなければ型エラー）
pub fn parse_bytes(bytes: &[u8]) -> Result<RawComponents, CalcError> {
    let text = std::str::from_utf8(bytes).map_err(|_| CalcError::Type {
        what: "ベクトル文字列",
        value: String::from_utf8_lossy(bytes).into_owned(),
    })?;
    parse(text)
}

fn parse_token(token: &str) -> Result<Component, CalcError> {
    let mut chars = token.chars();
    let letter = chars
        .next_back()
        .ok_or_else(|| CalcError::parse(token, ParseErrorKind::Malformed))?;
    let number = chars.as_str();

    if letter.is_ascii_digit() {
        return Err(CalcError::parse(token, ParseErrorKind::MissingDirection));
    }
    if number.is_empty() {
        return Err(CalcError::parse(token, ParseErrorKind::MissingMagnitude));
    }

    let magnitude: i64 = number
        .parse()
        .map_err(|_| CalcError::parse(token, ParseErrorKind::Malformed))?;
    if magnitude <= 0 {
        return Err(CalcError::parse(token, ParseErrorKind::NonPositive));
    }
    if magnitude > u32::MAX as i64 {
        return Err(CalcError::parse(token, ParseErrorKind::Overflow));
    }

    let direction = Direction::from_char(letter)
        .ok_or_else(|| CalcError::parse(token, ParseErrorKind::UnknownDirection(letter)))?;

    Ok(Component::new(direction, magnitude as u64))
}

/// 正規化されたヘックスベクトル（位置または速度）
///
/// 不変条件:
/// - major, minor, vertical はそれぞれ高々1つ
/// - major と minor が両方あれば、6サイクル上で隣接する異なる方向
/// - 保持する大きさは全て正（0の成分は保持しない）
/// - 全て無い状態が唯一のゼロベクトル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HexVector {
    major: Option<Component>,
    minor: Option<Component>,
    vertical: Option<Component>,
}

impl HexVector {
    pub const ZERO: HexVector = HexVector {
        major: None,
        minor: None,
        vertical: None,
    };

    /// 成分の多重集合を正規化
    pub fn canonicalize(raw: &RawComponents) -> Self {
        Self::from_lattice(raw.resultant())
    }

    /// 格子上の点から正規形を構成
    ///
    /// 点を含むセクタ（隣接2方向の間）を探し、その2方向を基底とする
    /// 連立方程式を解きます。隣接2方向の基底は行列式が ±1 なので
    /// 係数は常に整数になり、丸めは発生しません。
    pub fn from_lattice(point: Lattice3D) -> Self {
        let vertical = match point.p {
            0 => None,
            p if p > 0 => Some(Component::new(Direction::Up, p.unsigned_abs())),
            p => Some(Component::new(Direction::Down, p.unsigned_abs())),
        };

        let (major, minor) = decompose_horizontal(point.u, point.v);
        Self {
            major,
            minor,
            vertical,
        }
    }

    pub fn parse(text: &str) -> Result<Self, CalcError> {
        Ok(Self::canonicalize(&parse(text)?))
    }

    pub fn major(&self) -> Option<Component> {
        self.major
    }

    pub fn minor(&self) -> Option<Component> {
        self.minor
    }

    pub fn vertical(&self) -> Option<Component> {
        self.vertical
    }

    /// major, minor, vertical の順に存在する成分
    pub fn components(&self) -> impl Iterator<Item = Component> + '_ {
        [self.major, self.minor, self.vertical].into_iter().flatten()
    }

    pub fn major_magnitude(&self) -> u64 {
        self.major.map_or(0, |c| c.magnitude)
    }

    pub fn minor_magnitude(&self) -> u64 {
        self.minor.map_or(0, |c| c.magnitude)
    }

    pub fn vertical_magnitude(&self) -> u64 {
        self.vertical.map_or(0, |c| c.magnitude)
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    pub fn to_lattice(&self) -> Lattice3D {
        self.components()
            .fold(Lattice3D::ZERO, |acc, c| acc + c.lattice())
    }

    /// 直交座標 (X, Y, Z) への厳密な射影
    pub fn to_cartesian(&self) -> Cartesian {
        self.to_lattice().to_cartesian()
    }

    /// 表示用ラベル（ゼロベクトルは "STILL"）
    pub fn label(&self) -> String {
        if self.is_zero() {
            "STILL".to_string()
        } else {
            self.to_string()
        }
    }
}

fn decompose_horizontal(u: i64, v: i64) -> (Option<Component>, Option<Component>) {
    if u == 0 && v == 0 {
        return (None, None);
    }

    for (i, &first) in HORIZONTAL.iter().enumerate() {
        let second = HORIZONTAL[(i + 1) % HORIZONTAL.len()];
        let p = first.lattice();
        let q = second.lattice();
        let det = p.u * q.v - p.v * q.u;
        let x = (u * q.v - v * q.u) / det;
        let y = (p.u * v - p.v * u) / det;
        if x < 0 || y < 0 {
            continue;
        }

        let mut parts = [
            Component::new(first, x.unsigned_abs()),
            Component::new(second, y.unsigned_abs()),
        ];
        // 大きい方が major、同じならサイクル順で先の方向
        parts.sort_by_key(|c| (std::cmp::Reverse(c.magnitude), c.direction));
        let mut nonzero = parts.into_iter().filter(|c| c.magnitude > 0);
        return (nonzero.next(), nonzero.next());
    }

    // 6セクタで平面全体を覆うのでここには来ない
    (None, None)
}

impl FromStr for HexVector {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HexVector::parse(s)
    }
}

/// 正規形のベクトル文字列（ゼロベクトルは空文字列）
impl fmt::Display for HexVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for component in self.components() {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{}", component)?;
            first = false;
        }
        Ok(())
    }
}

impl Serialize for HexVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl Add for HexVector {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        let raw: RawComponents = self.components().chain(other.components()).collect();
        HexVector::canonicalize(&raw)
    }
}

impl Sub for HexVector {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        let raw: RawComponents = self
            .components()
            .chain(other.components().map(|c| c.flipped()))
            .collect();
        HexVector::canonicalize(&raw)
    }
}

impl Neg for HexVector {
    type Output = Self;

    fn neg(self) -> Self::Output {
        let raw: RawComponents = self.components().map(|c| c.flipped()).collect();
        HexVector::canonicalize(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical(text: &str) -> String {
        HexVector::parse(text).unwrap().label()
    }

    #[test]
    fn test_empty_is_zero() {
        let v = HexVector::parse("").unwrap();
        assert!(v.is_zero());
        assert_eq!(v.to_string(), "");
        assert_eq!(v.label(), "STILL");
        assert!(HexVector::parse("   ").unwrap().is_zero());
    }

    #[test]
    fn test_single_and_pair() {
        assert_eq!(canonical("22E"), "22E");
        assert_eq!(canonical("18d 12c"), "18D 12C");
        assert_eq!(canonical("22F 8A"), "22F 8A");
        assert_eq!(canonical("4D 22E"), "22E 4D");
    }

    #[test]
    fn test_opposites_consolidate() {
        assert_eq!(canonical("22E 8B"), "14E");
        assert_eq!(canonical("4F 4C"), "STILL");
        assert_eq!(canonical("8+ 3-"), "5+");
        assert_eq!(canonical("14F 14D 14A 14B 14C 14E 6- 6+"), "STILL");
    }

    #[test]
    fn test_120_degree_pairs() {
        assert_eq!(canonical("4F 3B"), "3A 1F");
        assert_eq!(canonical("4F 3B 1D"), "2A 1F");
        assert_eq!(canonical("4E 3A"), "3F 1E");
    }

    #[test]
    fn test_many_terms() {
        assert_eq!(canonical("3e 5f 1a 3b 2+"), "5F 1A 2+");
        assert_eq!(canonical("14F 3B 6+ 10D 2- 4A 2C"), "6F 3E 4+");
        assert_eq!(canonical("9+ 6F 3D 1A 2-"), "4F 2E 7+");
    }

    #[test]
    fn test_canonicalize_raw_with_repeats() {
        // 算術で蓄積された多重集合は同じ方向を複数含み得る
        let raw: RawComponents = [
            (Direction::E, 5),
            (Direction::C, 3),
            (Direction::E, 3),
            (Direction::D, 2),
            (Direction::Up, 2),
        ]
        .into_iter()
        .map(|(d, m)| Component::new(d, m))
        .collect();
        assert_eq!(HexVector::canonicalize(&raw).label(), "5D 5E 2+");
    }

    #[test]
    fn test_tie_prefers_earlier_direction() {
        assert_eq!(canonical("6F 3D 1-"), "3E 3F 1-");
        assert_eq!(canonical("3F 3A"), "3A 3F");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse("-4E 3A").unwrap_err(),
            CalcError::parse("-4E", ParseErrorKind::NonPositive)
        );
        assert_eq!(
            parse("0A").unwrap_err(),
            CalcError::parse("0A", ParseErrorKind::NonPositive)
        );
        assert_eq!(
            parse("4J").unwrap_err(),
            CalcError::parse("4J", ParseErrorKind::UnknownDirection('J'))
        );
        assert_eq!(
            parse("3").unwrap_err(),
            CalcError::parse("3", ParseErrorKind::MissingDirection)
        );
        assert_eq!(
            parse("A").unwrap_err(),
            CalcError::parse("A", ParseErrorKind::MissingMagnitude)
        );
        assert_eq!(
            parse("4E 3A 7e").unwrap_err(),
            CalcError::parse("7e", ParseErrorKind::DuplicateDirection(Direction::E))
        );
        assert_eq!(
            parse("4+ 4+ 3- 7E").unwrap_err(),
            CalcError::parse("4+", ParseErrorKind::DuplicateDirection(Direction::Up))
        );
        assert_eq!(
            parse("x4A").unwrap_err(),
            CalcError::parse("x4A", ParseErrorKind::Malformed)
        );
        assert_eq!(
            parse("99999999999A").unwrap_err(),
            CalcError::parse("99999999999A", ParseErrorKind::Overflow)
        );
    }

    #[test]
    fn test_parse_bytes_rejects_non_text() {
        assert!(parse_bytes(&[0xff, 0x41]).unwrap_err().is_type());
        assert_eq!(parse_bytes(b"3A").unwrap().len(), 1);
    }

    #[test]
    fn test_arithmetic() {
        let v1 = HexVector::parse("3F 2-").unwrap();
        let v2 = HexVector::parse("5D 3E 1+").unwrap();
        assert_eq!((v1 + v2).label(), "6E 2D 1-");
        assert_eq!((v1 - v2).label(), "8A 3-");
        assert_eq!((HexVector::ZERO - v1).label(), "3C 2+");
        assert_eq!((v1 + HexVector::ZERO).label(), "3F 2-");
        assert_eq!((HexVector::ZERO + HexVector::ZERO).label(), "STILL");
        assert_eq!(-v1, HexVector::ZERO - v1);
        // 元の値は変化しない
        assert_eq!(v1.label(), "3F 2-");
    }

    #[test]
    fn test_lattice_round_trip() {
        let v = HexVector::parse("14F 3B 6+ 10D 2- 4A 2C").unwrap();
        assert_eq!(v.to_lattice(), Lattice3D::new(-9, 3, 4));
        assert_eq!(HexVector::from_lattice(v.to_lattice()), v);
    }

    #[test]
    fn test_serializes_as_canonical_string() {
        let v = HexVector::parse("9+ 6F 3D 1A 2-").unwrap();
        assert_eq!(serde_yaml::to_string(&v).unwrap().trim(), "4F 2E 7+");
    }
}
