use std::fmt;
use std::str::FromStr;

use crate::models::error::{CalcError, ParseErrorKind};

/// 水平ウィンドウ名（A=0 から時計回り、F/A=11）
pub const WINDOWS_H: [&str; 12] = [
    "A", "A/B", "B", "B/C", "C", "C/D", "D", "D/E", "E", "E/F", "F", "F/A",
];

/// 天頂・天底の高さ段階
pub const POLE_LEVEL: i8 = 3;

/// AVID 天球上のウィンドウ
///
/// 水平位置は 30 度刻みの 12 区分、高さは -3〜+3 の7段階
/// （0: amber, ±1: blue, ±2: green, ±3: 天頂/天底）で表します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AvidWindow {
    direction: u8,
    level: i8,
}

/// あるウィンドウから90度離れた上下左右のウィンドウ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrthogonalWindows {
    pub up: AvidWindow,
    pub down: AvidWindow,
    pub left: AvidWindow,
    pub right: AvidWindow,
}

impl AvidWindow {
    pub const ZENITH: AvidWindow = AvidWindow {
        direction: 0,
        level: POLE_LEVEL,
    };
    pub const NADIR: AvidWindow = AvidWindow {
        direction: 0,
        level: -POLE_LEVEL,
    };

    /// 水平位置と高さからウィンドウを構成（水平位置は12で剰余を取る）
    pub fn new(direction: i64, level: i8) -> Self {
        let level = level.clamp(-POLE_LEVEL, POLE_LEVEL);
        if level.abs() == POLE_LEVEL {
            return if level > 0 { Self::ZENITH } else { Self::NADIR };
        }
        Self {
            direction: direction.rem_euclid(WINDOWS_H.len() as i64) as u8,
            level,
        }
    }

    pub fn horizon(direction: i64) -> Self {
        Self::new(direction, 0)
    }

    pub fn direction(&self) -> u8 {
        self.direction
    }

    pub fn level(&self) -> i8 {
        self.level
    }

    pub fn to_tuple(&self) -> (u8, i8) {
        (self.direction, self.level)
    }

    pub fn is_pole(&self) -> bool {
        self.level.abs() == POLE_LEVEL
    }

    pub fn opposite(&self) -> Self {
        Self::new(self.direction as i64 + 6, -self.level)
    }

    /// 90度離れた上下左右のウィンドウ（天頂・天底には無い）
    pub fn orthogonal(&self) -> Option<OrthogonalWindows> {
        if self.is_pole() {
            return None;
        }
        let d = self.direction as i64;
        let l = self.level;
        let (up, down) = match l {
            0 => (Self::ZENITH, Self::NADIR),
            l if l > 0 => (Self::new(d + 6, POLE_LEVEL - l), Self::new(d, l - POLE_LEVEL)),
            l => (Self::new(d, l + POLE_LEVEL), Self::new(d + 6, -(POLE_LEVEL + l))),
        };
        Some(OrthogonalWindows {
            up,
            down,
            left: Self::horizon(d + 3),
            right: Self::horizon(d - 3),
        })
    }
}

impl fmt::Display for AvidWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            POLE_LEVEL => write!(f, "+++"),
            l if l == -POLE_LEVEL => write!(f, "---"),
            l => {
                let mark = if l < 0 { "-" } else { "+" };
                write!(
                    f,
                    "{}{}",
                    WINDOWS_H[self.direction as usize],
                    mark.repeat(l.unsigned_abs() as usize)
                )
            }
        }
    }
}

impl FromStr for AvidWindow {
    type Err = CalcError;

    /// "F-", "B/C--", "+++" などのウィンドウ名を解析
    ///
    /// 大文字小文字は区別せず、辺ウィンドウは逆順（"C/B"）も受け付けます。
    fn from_str(label: &str) -> Result<Self, Self::Err> {
        let invalid = || CalcError::parse(label, ParseErrorKind::UnknownWindow);

        match label {
            "+++" => return Ok(Self::ZENITH),
            "---" => return Ok(Self::NADIR),
            _ => {}
        }

        let (name, level) = if let Some(rest) = label.strip_suffix("++") {
            (rest, 2)
        } else if let Some(rest) = label.strip_suffix('+') {
            (rest, 1)
        } else if let Some(rest) = label.strip_suffix("--") {
            (rest, -2)
        } else if let Some(rest) = label.strip_suffix('-') {
            (rest, -1)
        } else {
            (label, 0)
        };

        let name = name.to_ascii_uppercase();
        let reversed: String = name.chars().rev().collect();
        let direction = WINDOWS_H
            .iter()
            .position(|w| *w == name)
            .or_else(|| {
                name.contains('/')
                    .then(|| WINDOWS_H.iter().position(|w| *w == reversed))
                    .flatten()
            })
            .ok_or_else(invalid)?;

        Ok(Self::new(direction as i64, level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(label: &str) -> AvidWindow {
        label.parse().unwrap()
    }

    #[test]
    fn test_creation() {
        let examples = [
            ("+++", (0, 3), "+++"),
            ("---", (0, -3), "---"),
            ("B/C-", (3, -1), "B/C-"),
            ("F/A++", (11, 2), "F/A++"),
            ("C+", (4, 1), "C+"),
            ("c/D+", (5, 1), "C/D+"),
            ("C/B--", (3, -2), "B/C--"),
        ];
        for (label, tuple, name) in examples {
            let w = window(label);
            assert_eq!(w.to_tuple(), tuple, "{}", label);
            assert_eq!(w.to_string(), name, "{}", label);
        }
    }

    #[test]
    fn test_creation_errors() {
        for label in ["K", "B+++", "B*", "A/E", "AE", "++", "++++", ""] {
            assert!(label.parse::<AvidWindow>().is_err(), "{}", label);
        }
    }

    #[test]
    fn test_orthogonal_on_horizon() {
        let ring = window("D/E").orthogonal().unwrap();
        assert_eq!(ring.up, AvidWindow::ZENITH);
        assert_eq!(ring.down, AvidWindow::NADIR);
        assert_eq!(ring.left.to_string(), "F");
        assert_eq!(ring.right.to_string(), "C");
    }

    #[test]
    fn test_orthogonal_above_horizon() {
        let ring = window("A+").orthogonal().unwrap();
        assert_eq!(ring.up.to_string(), "D++");
        assert_eq!(ring.down.to_string(), "A--");
        assert_eq!(ring.left.to_string(), "B/C");
        assert_eq!(ring.right.to_string(), "E/F");

        let ring = window("A++").orthogonal().unwrap();
        assert_eq!(ring.up.to_string(), "D+");
        assert_eq!(ring.down.to_string(), "A-");
    }

    #[test]
    fn test_orthogonal_below_horizon() {
        let ring = window("F-").orthogonal().unwrap();
        assert_eq!(ring.up.to_string(), "F++");
        assert_eq!(ring.down.to_string(), "C--");
        assert_eq!(ring.left.to_string(), "A/B");
        assert_eq!(ring.right.to_string(), "D/E");
    }

    #[test]
    fn test_poles_have_no_ring() {
        assert!(AvidWindow::ZENITH.orthogonal().is_none());
        assert!(window("---").orthogonal().is_none());
    }

    #[test]
    fn test_opposite() {
        assert_eq!(window("F-").opposite().to_string(), "C+");
        assert_eq!(window("+++").opposite(), AvidWindow::NADIR);
    }
}
