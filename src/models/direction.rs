//! # Direction モジュール
//!
//! AVID の8方向（水平6方向 A〜F と垂直2方向 +/-）を表す静的テーブルです。
//!
//! 水平方向は A → B → C → D → E → F → A の順に時計回りの6サイクルを成し、
//! サイクル上で隣接する2方向だけが正規化後のベクトルに共存できます。
//! 垂直方向は互いに反対向きで、全ての水平方向と直交します。
//!
//! 方向に関する幾何情報（隣接関係・格子上の単位変位・直交座標への射影）は
//! 全てこのモジュールのテーブルから引きます。

use std::fmt;

use crate::models::common::{Cartesian, Lattice3D};

/// AVID方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    A,
    B,
    C,
    D,
    E,
    F,
    Up,
    Down,
}

/// 時計回り順の水平方向
pub const HORIZONTAL: [Direction; 6] = [
    Direction::A,
    Direction::B,
    Direction::C,
    Direction::D,
    Direction::E,
    Direction::F,
];

/// 全8方向（ベクトル文字列での表記順）
pub const ALL: [Direction; 8] = [
    Direction::A,
    Direction::B,
    Direction::C,
    Direction::D,
    Direction::E,
    Direction::F,
    Direction::Up,
    Direction::Down,
];

// 格子上の単位変位 (U, V, P)
const LATTICE_UNITS: [(i64, i64, i64); 8] = [
    (0, -1, 0),  // A
    (1, -1, 0),  // B
    (1, 0, 0),   // C
    (0, 1, 0),   // D
    (-1, 1, 0),  // E
    (-1, 0, 0),  // F
    (0, 0, 1),   // +
    (0, 0, -1),  // -
];

/// 2方向の関係
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Same,
    /// 6サイクル上で隣接
    Adjacent,
    Opposite,
    /// 120度離れた水平方向、または水平と垂直の組
    Unrelated,
}

impl Direction {
    /// 文字から方向を取得（大文字小文字を区別しない）
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(Direction::A),
            'B' => Some(Direction::B),
            'C' => Some(Direction::C),
            'D' => Some(Direction::D),
            'E' => Some(Direction::E),
            'F' => Some(Direction::F),
            '+' => Some(Direction::Up),
            '-' => Some(Direction::Down),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Direction::A => 'A',
            Direction::B => 'B',
            Direction::C => 'C',
            Direction::D => 'D',
            Direction::E => 'E',
            Direction::F => 'F',
            Direction::Up => '+',
            Direction::Down => '-',
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_horizontal(self) -> bool {
        !self.is_vertical()
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    /// 水平方向のサイクル上の位置（A=0 … F=5）
    pub fn ordinal(self) -> Option<usize> {
        self.is_horizontal().then_some(self.index())
    }

    /// 時計回りの次の方向
    pub fn clockwise(self) -> Option<Self> {
        self.ordinal().map(|i| HORIZONTAL[(i + 1) % 6])
    }

    /// 反時計回りの次の方向
    pub fn counter_clockwise(self) -> Option<Self> {
        self.ordinal().map(|i| HORIZONTAL[(i + 5) % 6])
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            horizontal => HORIZONTAL[(horizontal.index() + 3) % 6],
        }
    }

    pub fn relation(self, other: Direction) -> Relation {
        if self == other {
            return Relation::Same;
        }
        if self.opposite() == other {
            return Relation::Opposite;
        }
        match (self.ordinal(), other.ordinal()) {
            (Some(a), Some(b)) if (a + 6 - b) % 6 == 1 || (b + 6 - a) % 6 == 1 => {
                Relation::Adjacent
            }
            _ => Relation::Unrelated,
        }
    }

    pub fn is_adjacent(self, other: Direction) -> bool {
        self.relation(other) == Relation::Adjacent
    }

    /// 格子上の単位変位
    pub fn lattice(self) -> Lattice3D {
        let (u, v, p) = LATTICE_UNITS[self.index()];
        Lattice3D::new(u, v, p)
    }

    /// 直交座標での単位ベクトル
    pub fn unit_cartesian(self) -> Cartesian {
        self.lattice().to_cartesian()
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
