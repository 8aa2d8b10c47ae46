use std::str::FromStr;

use avtcalc::logging::{LogConfig, LogOutput, init_logging, level_from_verbosity};
use avtcalc::models::bearing::{
    BearingMode, DEFAULT_TILE_RADIUS, TileLocation, bearing_vector_from_tiles, closing_bearing,
};
use avtcalc::models::shellstar::{parse_muzzle_velocity, shellstar, validate_segment};
use avtcalc::models::{HexVector, movement};
use avtcalc::scenario::ScenarioConfig;
use avtcalc::simulation::WorksheetEngine;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use tracing::{debug, info};

fn build_cli() -> Command {
    Command::new("avtcalc")
        .version("0.1.0")
        .about("AV:T ヘックスベクトル計算機")
        .long_about(
            "Attack Vector: Tactical のベクトル計算を行います。\n\
             ベクトルの正規化、方位、移動グリッド、シーカー迎撃（shellstar）を計算します。",
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("詳細出力レベル (-v: 基本, -vv: 詳細, -vvv: デバッグ)"),
        )
        .arg(
            Arg::new("log-output")
                .long("log-output")
                .value_name("TARGET")
                .default_value("console")
                .global(true)
                .help("ログ出力先 (console, file, both)"),
        )
        .arg(
            Arg::new("log-dir")
                .long("log-dir")
                .value_name("DIR")
                .default_value("logs")
                .global(true)
                .help("ログファイルのディレクトリ"),
        )
        .subcommand(
            Command::new("vector")
                .about("ベクトルを正規化し直交座標を表示")
                .arg(vector_arg("VECTOR", "ベクトル文字列 (例: \"3e 5f 1a 3b 2+\")")),
        )
        .subcommand(
            Command::new("movement")
                .about("移動グリッドを表示")
                .arg(vector_arg("VECTOR", "ベクトル文字列")),
        )
        .subcommand(
            Command::new("bearing")
                .about("距離とAVIDウィンドウを表示")
                .arg(vector_arg("VECTOR", "方位ベクトル"))
                .arg(
                    Arg::new("count")
                        .short('c')
                        .long("count")
                        .action(ArgAction::SetTrue)
                        .help("水平距離を成分の単純和で数える"),
                ),
        )
        .subcommand(
            Command::new("closing")
                .about("2つの速度の閉鎖ベクトルの方位を表示")
                .arg(vector_arg("FROM", "自機の速度"))
                .arg(vector_arg("TO", "相手の速度")),
        )
        .subcommand(
            Command::new("tiles")
                .about("タイル座標から方位ベクトルと方位を表示")
                .arg(
                    Arg::new("coords")
                        .value_name("J0 K0 U0 V0 H0 J1 K1 U1 V1 H1")
                        .num_args(10)
                        .required(true)
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(i64))
                        .help("from と to のタイル座標 (j k u v h)"),
                )
                .arg(
                    Arg::new("radius")
                        .short('r')
                        .long("radius")
                        .value_name("R")
                        .default_value("8")
                        .value_parser(value_parser!(i64))
                        .help("タイル半径"),
                ),
        )
        .subcommand(
            Command::new("shellstar")
                .about("シーカー迎撃を計算")
                .arg(vector_arg("BEARING", "目標への方位ベクトル"))
                .arg(vector_arg("CROSSING", "目標の相対速度ベクトル"))
                .arg(
                    Arg::new("muzzle-velocity")
                        .value_name("MV")
                        .required(true)
                        .help("シーカーの速度 (ヘックス/ターン、小数3桁まで)"),
                )
                .arg(
                    Arg::new("segment")
                        .short('g')
                        .long("segment")
                        .value_name("N")
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(i64))
                        .help("発射セグメント (1..8)"),
                ),
        )
        .subcommand(
            Command::new("run")
                .about("YAMLワークシートの計算要求をまとめて評価")
                .arg(
                    Arg::new("scenario")
                        .short('s')
                        .long("scenario")
                        .value_name("FILE")
                        .required(true)
                        .help("ワークシートファイル(.yaml)のパスを指定"),
                )
                .arg(
                    Arg::new("info")
                        .short('i')
                        .long("info")
                        .action(ArgAction::SetTrue)
                        .help("ワークシートの情報のみ表示して終了"),
                )
                .arg(
                    Arg::new("format")
                        .short('f')
                        .long("format")
                        .value_parser(["text", "yaml"])
                        .default_value("text")
                        .help("結果の出力形式"),
                ),
        )
}

fn vector_arg(name: &'static str, help: &'static str) -> Arg {
    // 空文字列はゼロベクトル
    Arg::new(name).required(true).allow_hyphen_values(true).help(help)
}

fn main() {
    let matches = build_cli().get_matches();

    let verbose_level = matches.get_count("verbose");
    let log_output = matches
        .get_one::<String>("log-output")
        .map(|s| LogOutput::from_str(s))
        .transpose();
    let log_output = match log_output {
        Ok(output) => output.unwrap_or(LogOutput::Console),
        Err(e) => {
            eprintln!("エラー: {}", e);
            std::process::exit(2);
        }
    };
    let log_config = LogConfig {
        level: level_from_verbosity(verbose_level),
        output: log_output,
        log_dir: matches
            .get_one::<String>("log-dir")
            .cloned()
            .unwrap_or_else(|| "logs".to_string()),
        ..LogConfig::default()
    };
    // ガードは main の終わりまで保持
    let _guard = match init_logging(log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("ログ初期化エラー: {}", e);
            None
        }
    };

    if let Err(e) = dispatch(&matches) {
        eprintln!("エラー: {}", e);
        std::process::exit(1);
    }
}

fn text<'a>(matches: &'a ArgMatches, name: &str) -> &'a str {
    matches.get_one::<String>(name).map_or("", String::as_str)
}

fn dispatch(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    match matches.subcommand() {
        Some(("vector", sub)) => {
            let v = HexVector::parse(text(sub, "VECTOR"))?;
            println!("{}", v.label());
            println!("{}", v.to_cartesian());
        }
        Some(("movement", sub)) => {
            println!("{}", movement(text(sub, "VECTOR"))?);
        }
        Some(("bearing", sub)) => {
            let mode = if sub.get_flag("count") {
                BearingMode::Count
            } else {
                BearingMode::Exact
            };
            let v = HexVector::parse(text(sub, "VECTOR"))?;
            println!("{}", v.bearing_with(mode));
        }
        Some(("closing", sub)) => {
            let from = HexVector::parse(text(sub, "FROM"))?;
            let to = HexVector::parse(text(sub, "TO"))?;
            println!("{}", closing_bearing(&from, &to, BearingMode::Exact));
        }
        Some(("tiles", sub)) => {
            let coords: Vec<i64> = sub
                .get_many::<i64>("coords")
                .map(|values| values.copied().collect())
                .unwrap_or_default();
            let from: [i64; 5] = coords[..5].try_into()?;
            let to: [i64; 5] = coords[5..].try_into()?;
            let radius = sub
                .get_one::<i64>("radius")
                .copied()
                .unwrap_or(DEFAULT_TILE_RADIUS);
            let v = bearing_vector_from_tiles(TileLocation::from(from), TileLocation::from(to), radius)?;
            println!("{}", v.label());
            println!("{}", v.bearing());
        }
        Some(("shellstar", sub)) => {
            let bearing = HexVector::parse(text(sub, "BEARING"))?;
            let crossing = HexVector::parse(text(sub, "CROSSING"))?;
            let mv = parse_muzzle_velocity(text(sub, "muzzle-velocity"))?;
            let segment = sub
                .get_one::<i64>("segment")
                .copied()
                .map(validate_segment)
                .transpose()?;
            println!("{}", shellstar(&bearing, &crossing, mv, segment)?);
        }
        Some(("run", sub)) => {
            run_worksheet(
                text(sub, "scenario"),
                sub.get_flag("info"),
                text(sub, "format") == "yaml",
            )?;
        }
        _ => {
            build_cli().print_help()?;
        }
    }
    Ok(())
}

/// ワークシートファイルを読み込んで評価
fn run_worksheet(path: &str, info_only: bool, yaml: bool) -> Result<(), Box<dyn std::error::Error>> {
    let worksheet = ScenarioConfig::from_file(path)?;
    info!("ワークシート読み込み完了: {}", path);

    if info_only {
        worksheet.print_summary();
        return Ok(());
    }

    let engine = WorksheetEngine::new(worksheet.settings.clone())?;
    let reports = engine.run(&worksheet.requests)?;
    debug!("結果 {}件を出力", reports.len());

    if yaml {
        print!("{}", serde_yaml::to_string(&reports)?);
    } else {
        for report in &reports {
            println!("{}", report);
            println!();
        }
    }

    Ok(())
}
