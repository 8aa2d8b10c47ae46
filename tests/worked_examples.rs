//! 卓上ツールの計算例をそのまま再現する結合テスト

use avtcalc::models::bearing::{BearingMode, bearing_vector_from_tiles, closing_bearing};
use avtcalc::models::shellstar::{MuzzleVelocity, parse_muzzle_velocity, shellstar};
use avtcalc::models::{AvidWindow, HexVector, ShellstarOutcome, TrackReading, movement};

fn v(text: &str) -> HexVector {
    HexVector::parse(text).unwrap()
}

fn shot(bearing: &str, crossing: &str, mv: u32, segment: Option<u8>) -> String {
    shellstar(&v(bearing), &v(crossing), MuzzleVelocity::from(mv), segment)
        .unwrap()
        .to_string()
}

#[test]
fn canonical_forms() {
    let cases = [
        ("3e 5f 1a 3b 2+", "5F 1A 2+"),
        ("14F 3B 6+ 10D 2- 4A 2C", "6F 3E 4+"),
        ("9+ 6F 3D 1A 2-", "4F 2E 7+"),
        ("22E 8B", "14E"),
        ("4F 3B 1D", "2A 1F"),
        ("6F 3D 1-", "3E 3F 1-"),
        ("14F 14D 14A 14B 14C 14E 6- 6+", "STILL"),
    ];
    for (input, expected) in cases {
        assert_eq!(v(input).label(), expected, "{}", input);
    }
}

#[test]
fn bearings() {
    let exact = [
        ("23B", "23 B"),
        ("8D 5C", "11 C/D"),
        ("8+", "8 +++"),
        ("8C 5D 12+", "17 C/D++"),
        ("12E 14+", "18 E++"),
        ("2A 12-", "12 ---"),
        ("", "NONE"),
    ];
    for (input, expected) in exact {
        assert_eq!(v(input).bearing().to_string(), expected, "{}", input);
    }
    assert_eq!(v("8C 5D").bearing_with(BearingMode::Count).to_string(), "13 C/D");
    assert_eq!(v("4-").bearing_with(BearingMode::Count).to_string(), "4 ---");
}

#[test]
fn closing_vector_bearing() {
    let result = closing_bearing(&v("8a 9b"), &v("8f 12a 2+"), BearingMode::Exact);
    assert_eq!(result.to_string(), "15 E/F");
}

#[test]
fn tile_bearings() {
    let from: [i64; 5] = [3, 2, 4, 13, -3];
    let to: [i64; 5] = [-1, 7, 9, 2, 3];
    let vector = bearing_vector_from_tiles(from.into(), to.into(), 8).unwrap();
    assert_eq!(vector.label(), "42D 19E 6+");
    assert_eq!(vector.bearing().to_string(), "54 D/E");
}

#[test]
fn avid_window_labels() {
    let window: AvidWindow = "C/B--".parse().unwrap();
    assert_eq!(window.to_string(), "B/C--");
    assert!("B+++".parse::<AvidWindow>().is_err());
}

#[test]
fn movement_sheet() {
    let expected = [
        "4F 2E 7+",
        "",
        " |F|E|+|",
        " |0|0|0|",
        "1| | |*|",
        "2|*| |*|",
        "3|*| |*|",
        "4| |*|*|",
        "5| | |*|",
        "6|*| |*|",
        "7|*| |*|",
        "8| |*| |",
    ];
    assert_eq!(movement("9+ 6F 3D 1A 2-").unwrap(), expected.join("\n"));
}

#[test]
fn movement_grids() {
    let cases = [
        (
            "6B 5C 3+",
            [
                " |B|C|+|", " |0|0|0|", "1|*| | |", "2| |*|*|", "3|*|*| |",
                "4|*| |*|", "5| |*| |", "6|*|*| |", "7|*| |*|", "8|*|*| |",
            ],
        ),
        (
            "13A 1-",
            [
                " |A| |-|", " |1| |0|", "1| | |*|", "2|*| | |", "3| | | |",
                "4|*| | |", "5|*| | |", "6| | | |", "7|*| | |", "8|*| | |",
            ],
        ),
        (
            "6F 3D 1-",
            [
                " |E|F|-|", " |0|0|0|", "1| | |*|", "2|*| | |", "3| |*| |",
                "4|*| | |", "5| | | |", "6| |*| |", "7|*| | |", "8| |*| |",
            ],
        ),
    ];
    for (input, expected) in cases {
        assert_eq!(v(input).movement_grid(), expected.join("\n"), "{}", input);
    }
}

#[test]
fn shellstar_run_away() {
    assert_eq!(shot("6A", "20A 6B", 24, None), "No Shot");
}

#[test]
fn shellstar_standstill() {
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
    assert_eq!(shot("13A 5B 4-", "", 24, None), expected.join("\n"));
}

#[test]
fn shellstar_orthogonal_crossing() {
    let expected = [
        "   +++",
        "E (C/D) B",
        "   ---",
        ">1/5 to evade",
        "0:4 13",
        "0:5 10",
        "0:6 7",
        "0:7 4",
        "0:8 1",
        "1:1 HIT",
        "RoC: 3",
    ];
    assert_eq!(shot("13A", "3E 3F", 24, Some(4)), expected.join("\n"));
}

#[test]
fn shellstar_slow_closure() {
    let expected = [
        "     D++",
        "B/C (A+) E/F",
        "     A--",
        ">2/8 to evade",
        "0:8 8",
        "1:1 8",
        "1:2 7",
        "1:3 6",
        "1:4 5",
        "1:5 3",
        "1:6 3",
        "1:7 1",
        "1:8 1",
        "2:1 0",
        "2:2 HIT",
        "RoC: 1",
    ];
    assert_eq!(shot("4D 1E 7-", "12D 4C 9-", 24, Some(8)), expected.join("\n"));
}

#[test]
fn shellstar_slow_closure_without_segment() {
    let outcome = shellstar(&v("4D 1E 7-"), &v("12D 4C 9-"), MuzzleVelocity::from(24u32), None).unwrap();
    let ShellstarOutcome::Shot(solution) = outcome else {
        panic!("expected a shot");
    };
    let entries = solution.track.entries();
    assert_eq!(entries.len(), 11);
    assert_eq!(entries[0].to_string(), "+0 8");
    assert_eq!(entries[10].to_string(), "+10 HIT");
    assert_eq!(entries[9].reading, TrackReading::Distance(0));
    assert_eq!(solution.rate_of_closure, 1);
}

#[test]
fn shellstar_vertical_impact_window() {
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
    assert_eq!(shot("4D 1E 7+", "12A 3C", 20, None), expected.join("\n"));
}

#[test]
fn shellstar_fractional_muzzle_velocity() {
    let mv = parse_muzzle_velocity("22.5").unwrap();
    let report = shellstar(&v("13A 5B 4-"), &v(""), mv, None).unwrap().to_string();
    assert!(report.ends_with("+5 3\n+6 HIT\nRoC: 2"), "{}", report);
}

#[test]
fn input_errors() {
    assert!(HexVector::parse("-4E 3A").unwrap_err().is_parse());
    assert!(HexVector::parse("4E 3A 7e").unwrap_err().is_parse());
    assert!(HexVector::parse("4J").unwrap_err().is_parse());
    let target = v("6A");
    let mv = MuzzleVelocity::from(24u32);
    assert!(shellstar(&target, &target, mv, Some(9)).unwrap_err().is_range());
    assert!(shellstar(&target, &target, mv, Some(0)).unwrap_err().is_range());
    assert!(parse_muzzle_velocity("fast").unwrap_err().is_type());
    assert!(parse_muzzle_velocity("-22.5").unwrap_err().is_range());
}
