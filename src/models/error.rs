use thiserror::Error;

use crate::models::direction::Direction;

/// 解析エラーの詳細種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("大きさは正の整数でなければなりません")]
    NonPositive,
    #[error("不明な方向 '{0}'")]
    UnknownDirection(char),
    #[error("大きさがありません")]
    MissingMagnitude,
    #[error("方向がありません")]
    MissingDirection,
    #[error("<数値><方向> の形式ではありません")]
    Malformed,
    #[error("大きさが上限 {max} を超えています", max = u32::MAX)]
    Overflow,
    #[error("方向 {0} が重複しています")]
    DuplicateDirection(Direction),
    #[error("AVIDウィンドウ名として不正です")]
    UnknownWindow,
}

/// 計算エンジン全体のエラー
///
/// 不正な入力を検出した時点で同期的に返されます。
/// 射撃不能（No Shot）はエラーではなく正常な計算結果として扱います。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalcError {
    /// ベクトル文字列・ウィンドウ名の構文エラー
    #[error("解析エラー '{token}': {kind}")]
    Parse { token: String, kind: ParseErrorKind },
    /// テキストや数値として解釈できない入力
    #[error("型エラー: {what} として解釈できない入力 {value:?}")]
    Type { what: &'static str, value: String },
    /// 許容範囲外の値
    #[error("範囲エラー: {name} = {value} は {min}..={max} の範囲外です")]
    Range {
        name: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
    /// 小数を含む値の範囲外
    #[error("範囲エラー: {name} = {value} は{expected}でなければなりません")]
    Bound {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl CalcError {
    pub fn parse(token: impl Into<String>, kind: ParseErrorKind) -> Self {
        CalcError::Parse {
            token: token.into(),
            kind,
        }
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, CalcError::Parse { .. })
    }

    pub fn is_type(&self) -> bool {
        matches!(self, CalcError::Type { .. })
    }

    pub fn is_range(&self) -> bool {
        matches!(self, CalcError::Range { .. } | CalcError::Bound { .. })
    }
}
