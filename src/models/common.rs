use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use serde::ser::{Serialize, SerializeMap, Serializer};

/// ヘックス格子上の3次元変位を表す構造体
///
/// 水平成分は U, V の2軸（A=(0,-1), C=(1,0)）で、垂直成分は P で保持します。
/// 全て整数なので加減算は厳密です。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Lattice3D {
    pub u: i64,
    pub v: i64,
    pub p: i64, // + 方向が正
}

impl Lattice3D {
    pub const ZERO: Lattice3D = Lattice3D { u: 0, v: 0, p: 0 };

    pub fn new(u: i64, v: i64, p: i64) -> Self {
        Self { u, v, p }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// 水平面内での長さの2乗（60度の余弦定理: U² + UV + V²）
    pub fn horizontal_norm_squared(&self) -> u128 {
        let (u, v) = (self.u as i128, self.v as i128);
        (u * u + u * v + v * v).unsigned_abs()
    }

    /// 3次元の長さの2乗
    pub fn norm_squared(&self) -> u128 {
        let p = self.p as i128;
        self.horizontal_norm_squared() + (p * p).unsigned_abs()
    }

    /// 直交座標への厳密な射影
    pub fn to_cartesian(&self) -> Cartesian {
        Cartesian {
            x_root3_halves: self.u,
            y_halves: -(2 * self.v + self.u),
            z: self.p,
        }
    }
}

impl Add for Lattice3D {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self::new(self.u + other.u, self.v + other.v, self.p + other.p)
    }
}

impl Sub for Lattice3D {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Self::new(self.u - other.u, self.v - other.v, self.p - other.p)
    }
}

impl Neg for Lattice3D {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.u, -self.v, -self.p)
    }
}

impl Mul<i64> for Lattice3D {
    type Output = Self;

    fn mul(self, scalar: i64) -> Self::Output {
        Self::new(self.u * scalar, self.v * scalar, self.p * scalar)
    }
}

/// 直交座標 (X, Y, Z) の厳密表現
///
/// X は √3/2 の整数倍、Y は 1/2 の整数倍、Z は整数になるため、
/// それぞれの係数を整数で保持します。+X は B/C 方向、+Y は A 方向、+Z は + 方向です。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cartesian {
    x_root3_halves: i64,
    y_halves: i64,
    z: i64,
}

impl Cartesian {
    /// X = n·√3/2 の係数 n
    pub fn x_root3_halves(&self) -> i64 {
        self.x_root3_halves
    }

    /// Y = n/2 の係数 n
    pub fn y_halves(&self) -> i64 {
        self.y_halves
    }

    pub fn z_units(&self) -> i64 {
        self.z
    }

    /// 表示用の近似値
    pub fn x(&self) -> f64 {
        self.x_root3_halves as f64 * 3f64.sqrt() / 2.0
    }

    pub fn y(&self) -> f64 {
        self.y_halves as f64 / 2.0
    }

    pub fn z(&self) -> f64 {
        self.z as f64
    }

    /// 長さの2乗の4倍（3n² + m² + 4z²、厳密な整数）
    pub fn magnitude_squared_quarters(&self) -> u128 {
        let x = self.x_root3_halves as i128;
        let y = self.y_halves as i128;
        let z = self.z as i128;
        (3 * x * x + y * y + 4 * z * z).unsigned_abs()
    }
}

impl fmt::Display for Cartesian {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "X: {}√3/2, Y: {}/2, Z: {}",
            self.x_root3_halves, self.y_halves, self.z
        )
    }
}

impl Serialize for Cartesian {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("X", &self.x())?;
        map.serialize_entry("Y", &self.y())?;
        map.serialize_entry("Z", &self.z())?;
        map.end()
    }
}

/// 整数演算ユーティリティ関数
///
/// 距離計算は全て整数の平方根で厳密に判定します。
pub mod math_utils {
    use std::cmp::Ordering;

    /// 平方根を四捨五入した値 floor(√n + 1/2)
    pub fn round_sqrt(n: u128) -> u64 {
        (((4 * n).isqrt() + 1) / 2) as u64
    }

    /// √a と √b + k を比較
    ///
    /// 途中の積は 256 ビットで扱うため、u128 の全範囲で桁あふれしません。
    pub fn cmp_sqrt_plus(a: u128, b: u128, k: i128) -> Ordering {
        if k < 0 {
            // √a < √b - |k|  <=>  √b > √a + |k|
            return cmp_sqrt_plus(b, a, -k).reverse();
        }
        let k = k.unsigned_abs();
        // k² > a なら右辺の方が大きい
        let Some(kk) = k.checked_mul(k) else {
            return Ordering::Less;
        };
        let Some(lhs) = a.checked_sub(b).and_then(|d| d.checked_sub(kk)) else {
            return Ordering::Less;
        };
        // lhs² と 4k²b の比較。lhs = 2h + e として h(h + e) と k²b を比べる
        let (h, e) = (lhs >> 1, lhs & 1);
        match mul_wide(h, h + e).cmp(&mul_wide(kk, b)) {
            Ordering::Equal if e == 1 => Ordering::Greater,
            ordering => ordering,
        }
    }

    /// 256 ビットの積を (上位, 下位) で返す
    pub fn mul_wide(a: u128, b: u128) -> (u128, u128) {
        const MASK: u128 = u64::MAX as u128;
        let (a_hi, a_lo) = (a >> 64, a & MASK);
        let (b_hi, b_lo) = (b >> 64, b & MASK);

        let lo_lo = a_lo * b_lo;
        let hi_lo = a_hi * b_lo;
        let lo_hi = a_lo * b_hi;
        let middle = (lo_lo >> 64) + (hi_lo & MASK) + (lo_hi & MASK);

        let lo = (lo_lo & MASK) | (middle << 64);
        let hi = a_hi * b_hi + (hi_lo >> 64) + (lo_hi >> 64) + (middle >> 64);
        (hi, lo)
    }

    /// floor((√n + offset) / divisor)
    pub fn floor_sqrt_offset_div(n: u128, offset: i128, divisor: i128) -> i128 {
        (n.isqrt() as i128 + offset).div_euclid(divisor)
    }
}
