//! # avtcalc
//!
//! AV:T（Attack Vector: Tactical）のヘックスベクトル計算エンジンです。
//!
//! - ベクトル文字列の解析と正規化、加減算
//! - 距離・AVIDウィンドウ（方位）の計算
//! - 1ターン8セグメントの移動グリッド
//! - シーカー迎撃（shellstar）計算
//!
//! 計算は全て不変の値に対する純粋関数です。YAML のワークシートに並べた
//! 複数の計算要求は [`simulation::WorksheetEngine`] でまとめて評価できます。

pub mod logging;
pub mod models;
pub mod scenario;
pub mod simulation;
