// 基本的なデータ型と整数演算ユーティリティ
pub mod common;
pub mod error;

// 方向テーブルとベクトル代数
pub mod direction;
pub mod vector;

// 方位・AVIDウィンドウ
pub mod avid;
pub mod bearing;

// 移動スケジュールと迎撃計算
pub mod movement;
pub mod shellstar;

// 便利な re-export
pub use avid::{AvidWindow, OrthogonalWindows};
pub use bearing::{
    BearingMode, BearingResult, TileLocation, bearing, bearing_vector_from_tiles, closing_bearing,
};
pub use common::{Cartesian, Lattice3D};
pub use direction::{Direction, Relation};
pub use error::{CalcError, ParseErrorKind};
pub use movement::{MovementSchedule, movement};
pub use shellstar::{
    ApproachWindow, EvasionThresholds, InterceptSolution, InterceptTrack, MuzzleVelocity,
    ShellstarOutcome, TrackEntry, TrackReading, TrackTime, shellstar,
};
pub use vector::{Component, HexVector, RawComponents};
