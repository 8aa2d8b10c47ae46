//! # Movement モジュール
//!
//! ベクトルを1ターン8セグメントの移動スケジュールに分解し、
//! 卓上の移動グリッドとして整形します。
//!
//! 各成分は毎セグメント `大きさ / 8` ヘックス（each）移動し、
//! 余り `大きさ mod 8` はセグメント 1〜8 に均等に配られます。
//! 水平2成分は同じセグメントに重ならないように余りを分け合い、
//! 垂直の余りは水平の余りが空けたセグメントになるべく入ります。

use std::fmt;

use crate::models::common::Lattice3D;
use crate::models::error::CalcError;
use crate::models::vector::{Component, HexVector};

/// 1ターンのセグメント数
pub const SEGMENTS_PER_TURN: u64 = 8;

const SEGMENTS: usize = SEGMENTS_PER_TURN as usize;

// 垂直の余りを配る位相（floor, round, lead の順に優先）
const VERTICAL_PHASES: [u64; 3] = [0, SEGMENTS_PER_TURN / 2, SEGMENTS_PER_TURN - 1];

/// 位相付きの均等配分
///
/// 枠 `s`（1始まり）は `⌊(s·count + phase)/slots⌋ > ⌊((s−1)·count + phase)/slots⌋`
/// のとき選ばれます。`phase < slots` なら選ばれる枠はちょうど `count` 個です。
fn spread(count: u64, slots: usize, phase: u64) -> Vec<bool> {
    let n = slots as u64;
    if n == 0 {
        return Vec::new();
    }
    (1..=n)
        .map(|s| (s * count + phase) / n > ((s - 1) * count + phase) / n)
        .collect()
}

/// 床関数規則: `count` 個の余りを `slots` 個の枠に均等に配る（最後の枠寄り）
pub fn floor_rule(count: u64, slots: usize) -> Vec<bool> {
    spread(count, slots, 0)
}

/// 四捨五入規則: 床関数規則を半周期ずらしたもの
pub fn round_rule(count: u64, slots: usize) -> Vec<bool> {
    spread(count, slots, slots as u64 / 2)
}

fn slots_of(column: Vec<bool>, on: bool) -> Vec<usize> {
    column
        .into_iter()
        .enumerate()
        .filter_map(|(i, flag)| (flag == on).then_some(i))
        .collect()
}

/// major/minor の余りをセグメントに配る（返り値は各セグメントの (major, minor)）
pub fn deal_pair(major_rest: u64, minor_rest: u64) -> [(bool, bool); SEGMENTS] {
    let mut rows = [(false, false); SEGMENTS];
    let total = major_rest + minor_rest;

    if total <= SEGMENTS_PER_TURN {
        let slots = slots_of(floor_rule(total, SEGMENTS), true);
        let to_minor = floor_rule(minor_rest, slots.len());
        for (slot, minor) in slots.into_iter().zip(to_minor) {
            rows[slot] = (!minor, minor);
        }
    } else {
        // 両方が動くセグメントを先に決め、残りの単独枠を minor から配る
        let both = floor_rule(total - SEGMENTS_PER_TURN, SEGMENTS);
        for slot in slots_of(both.clone(), true) {
            rows[slot] = (true, true);
        }
        let singles = slots_of(both, false);
        let to_minor = round_rule(SEGMENTS_PER_TURN - major_rest, singles.len());
        for (slot, minor) in singles.into_iter().zip(to_minor) {
            rows[slot] = (!minor, minor);
        }
    }

    rows
}

/// 垂直の余りをセグメントに配る
///
/// 水平の余りの合計（mod 8）を床関数規則で置いた枠との重なりが最も少ない位相を選びます。
/// 重なりが同じなら floor, round, lead の順に優先します。
pub fn deal_vertical(vertical_rest: u64, horizontal_rest: u64) -> Vec<bool> {
    let occupied = floor_rule(horizontal_rest % SEGMENTS_PER_TURN, SEGMENTS);
    VERTICAL_PHASES
        .iter()
        .map(|&phase| spread(vertical_rest, SEGMENTS, phase))
        .min_by_key(|column| {
            column
                .iter()
                .zip(&occupied)
                .filter(|(vertical, horizontal)| **vertical && **horizontal)
                .count()
        })
        .unwrap_or_default()
}

/// 1セグメントで余りの移動がある成分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SegmentFlags {
    pub major: bool,
    pub minor: bool,
    pub vertical: bool,
}

/// ベクトルの1ターン分の移動スケジュール
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementSchedule {
    vector: HexVector,
    flags: [SegmentFlags; SEGMENTS],
}

impl MovementSchedule {
    pub fn of(vector: &HexVector) -> Self {
        let rest = |m: u64| m % SEGMENTS_PER_TURN;
        let (major_rest, minor_rest) = (
            rest(vector.major_magnitude()),
            rest(vector.minor_magnitude()),
        );
        let pair = deal_pair(major_rest, minor_rest);
        let vertical = deal_vertical(rest(vector.vertical_magnitude()), major_rest + minor_rest);

        let mut flags = [SegmentFlags::default(); SEGMENTS];
        for (i, flag) in flags.iter_mut().enumerate() {
            *flag = SegmentFlags {
                major: pair[i].0,
                minor: pair[i].1,
                vertical: vertical[i],
            };
        }

        Self {
            vector: *vector,
            flags,
        }
    }

    pub fn vector(&self) -> &HexVector {
        &self.vector
    }

    pub fn is_still(&self) -> bool {
        self.vector.is_zero()
    }

    /// セグメント番号（1〜8、範囲外は8で巡回）の余りフラグ
    pub fn flags(&self, segment: u64) -> SegmentFlags {
        self.flags[Self::row(segment)]
    }

    fn row(segment: u64) -> usize {
        ((segment + SEGMENTS_PER_TURN - 1) % SEGMENTS_PER_TURN) as usize
    }

    /// セグメント内で実際に動く成分（each + 余り、0 の成分は含まない）
    pub fn segment_moves(&self, segment: u64) -> Vec<Component> {
        let flags = self.flags(segment);
        let columns = [
            (self.vector.major(), flags.major),
            (self.vector.minor(), flags.minor),
            (self.vector.vertical(), flags.vertical),
        ];
        columns
            .into_iter()
            .filter_map(|(component, extra)| {
                let component = component?;
                let moves = component.magnitude / SEGMENTS_PER_TURN + u64::from(extra);
                (moves > 0).then(|| Component::new(component.direction, moves))
            })
            .collect()
    }

    /// セグメント内の格子上の変位
    pub fn segment_displacement(&self, segment: u64) -> Lattice3D {
        self.segment_moves(segment)
            .iter()
            .fold(Lattice3D::ZERO, |acc, c| acc + c.lattice())
    }
}

fn column_head(component: Option<Component>) -> (String, String) {
    match component {
        Some(c) => (
            c.direction.to_string(),
            (c.magnitude / SEGMENTS_PER_TURN).to_string(),
        ),
        None => (" ".to_string(), " ".to_string()),
    }
}

/// 移動グリッド
///
/// 1行目は方向、2行目は毎セグメントの移動量（each）、
/// 続く8行は余りの移動があるセグメントに `*` を付けます。
impl fmt::Display for MovementSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_still() {
            return write!(f, "STILL");
        }

        let (maj_dir, maj_each) = column_head(self.vector.major());
        let (min_dir, min_each) = column_head(self.vector.minor());
        let (vert_dir, vert_each) = column_head(self.vector.vertical());
        writeln!(f, " |{}|{}|{}|", maj_dir, min_dir, vert_dir)?;
        write!(f, " |{}|{}|{}|", maj_each, min_each, vert_each)?;

        let mark = |on: bool| if on { '*' } else { ' ' };
        for (i, flags) in self.flags.iter().enumerate() {
            write!(
                f,
                "\n{}|{}|{}|{}|",
                i + 1,
                mark(flags.major),
                mark(flags.minor),
                mark(flags.vertical)
            )?;
        }
        Ok(())
    }
}

impl HexVector {
    pub fn movement_schedule(&self) -> MovementSchedule {
        MovementSchedule::of(self)
    }

    pub fn movement_grid(&self) -> String {
        self.movement_schedule().to_string()
    }
}

/// ベクトル文字列から「正規形・空行・移動グリッド」を整形
pub fn movement(text: &str) -> Result<String, CalcError> {
    let vector = HexVector::parse(text)?;
    Ok(format!("{}\n\n{}", vector.label(), vector.movement_grid()))
}
