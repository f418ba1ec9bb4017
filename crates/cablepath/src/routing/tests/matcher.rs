use super::*;
use crate::routing::matcher::match_equipment;
use crate::routing::types::MatchStatus;

fn panel_room() -> EquipmentCatalogue {
    equipment(vec![
        equip("E1", "MSB-01", "Main Switchboard", (0.0, 0.0)),
        equip("E2", "DB-7", "Distribution Board 7", (10.0, 0.0)),
        equip("E3", "DB-7A", "Lighting Board", (20.0, 0.0)),
        equip("E4", "", "Fire Pump Controller", (30.0, 0.0)),
        equip("E5", "  ", "Spare", (40.0, 0.0)),
    ])
}

#[test]
fn primary_code_wins_over_name() {
    let cat = equipment(vec![
        equip("E1", "DB-7", "Distribution Board 7", (0.0, 0.0)),
        equip("E2", "LP-2", "Fed from DB-7", (5.0, 0.0)),
    ]);
    assert_eq!(match_equipment("DB-7", &cat), vec![0]);
    // No code contains "board", so names decide.
    assert_eq!(match_equipment("Board", &cat), vec![0]);
    assert_eq!(match_equipment("Board", &panel_room()), vec![0, 1, 2]);
}

#[test]
fn code_containment_runs_both_ways() {
    let cat = panel_room();
    assert_eq!(match_equipment("DB-7", &cat), vec![1, 2]);
    // The identifier carries extra text around the code.
    assert_eq!(match_equipment("Feeder to DB-7A", &cat), vec![1, 2]);
    assert_eq!(match_equipment("panel msb-01 (level 1)", &cat), vec![0]);
}

#[test]
fn names_are_a_fallback() {
    let cat = panel_room();
    assert_eq!(match_equipment("fire pump", &cat), vec![3]);
    assert_eq!(match_equipment("LIGHTING", &cat), vec![2]);
}

#[test]
fn matching_ignores_case_and_padding() {
    let cat = panel_room();
    assert_eq!(match_equipment("  msb-01  ", &cat), vec![0]);
    assert_eq!(match_equipment("Main SWITCHBOARD", &cat), vec![0]);
}

#[test]
fn blank_or_unknown_identifiers_match_nothing() {
    let cat = panel_room();
    assert!(match_equipment("", &cat).is_empty());
    assert!(match_equipment("   ", &cat).is_empty());
    assert!(match_equipment("Chiller 3", &cat).is_empty());
}

#[test]
fn empty_fields_never_match() {
    // A whitespace code must not be "contained" in every identifier.
    let cat = equipment(vec![equip("E1", " ", "", (0.0, 0.0))]);
    assert!(match_equipment("anything", &cat).is_empty());
    assert!(match_equipment(" x ", &cat).is_empty());
}

#[test]
fn match_status_classification() {
    assert_eq!(MatchStatus::classify("  ", 0), MatchStatus::Blank);
    assert_eq!(MatchStatus::classify("DB-9", 0), MatchStatus::NotFound);
    assert_eq!(MatchStatus::classify("DB-7", 1), MatchStatus::Unique);
    assert_eq!(MatchStatus::classify("DB", 3), MatchStatus::Multiple(3));
    assert!(MatchStatus::Multiple(2).is_matched());
    assert!(!MatchStatus::NotFound.is_matched());
    assert_eq!(MatchStatus::Multiple(2).to_string(), "Matched (2 candidates)");
}
