use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;

use rovers_ledger::feed::{parse_lineup_json, parse_match_list_json};
use rovers_ledger::match_events::build_match_events;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
}

fn sample_events() -> rovers_ledger::match_events::MatchEvents {
    let doc = parse_match_list_json(&read_fixture("match_list_league.json"), d("2023-08-19"))
        .expect("fixture should parse")
        .expect("fixture has a match");
    let lineup = parse_lineup_json(&read_fixture("lineup.json"), &doc.our_side)
        .expect("lineup should parse");
    build_match_events(&doc, &lineup)
}

#[test]
fn goals_come_from_player_actions_only() {
    let events = sample_events();
    assert_eq!(events.goals.len(), 2);

    let first = &events.goals[0];
    assert_eq!(first.player_name, "Connor Jennings");
    assert_eq!(first.goal_min, 12);
    assert!(!first.penalty);
    assert!(!first.own_goal);

    // The booking action on the scorer's list is not a goal row.
    let second = &events.goals[1];
    assert_eq!(second.player_name, "Regan Hendry");
    assert_eq!(second.goal_min, 77);
    assert!(second.penalty);
}

#[test]
fn substitution_rows_pair_on_and_off() {
    let events = sample_events();
    assert_eq!(events.subs.len(), 2);
    assert_eq!(events.sub_mins.len(), 2);

    let on = events
        .subs
        .iter()
        .find(|s| s.on_for.is_some())
        .expect("on row");
    assert_eq!(on.player_name, "Kieron Morris");
    assert_eq!(on.shirt_no, Some(7));
    assert_eq!(on.on_for, Some(11));
    assert!(on.off_for.is_none());

    let off = events
        .subs
        .iter()
        .find(|s| s.off_for.is_some())
        .expect("off row");
    assert_eq!(off.player_name, "Connor Jennings");
    assert_eq!(off.off_for, Some(7));
    assert!(off.on_for.is_none());

    let min_on = events
        .sub_mins
        .iter()
        .find(|s| s.min_on.is_some())
        .expect("min_on row");
    assert_eq!(min_on.player_name, "Kieron Morris");
    assert_eq!(min_on.min_on, Some(63));
    assert!(min_on.min_off.is_none());

    let min_off = events
        .sub_mins
        .iter()
        .find(|s| s.min_off.is_some())
        .expect("min_off row");
    assert_eq!(min_off.player_name, "Connor Jennings");
    assert_eq!(min_off.min_off, Some(63));
}

#[test]
fn appearances_keep_starters_and_used_subs() {
    let events = sample_events();
    let names: Vec<&str> = events
        .player_apps
        .iter()
        .map(|a| a.player_name.as_str())
        .collect();

    assert!(names.contains(&"Luke McGee"));
    assert!(names.contains(&"Connor Jennings"));
    assert!(names.contains(&"Regan Hendry"));
    // Came on, so the bench row survives with the sub role.
    assert!(names.contains(&"Kieron Morris"));
    // Never used.
    assert!(!names.contains(&"Josh Hawkes"));

    let morris = events
        .player_apps
        .iter()
        .find(|a| a.player_name == "Kieron Morris")
        .expect("sub appearance");
    assert_eq!(morris.role, "sub");
    assert_eq!(morris.shirt_no, Some(7));

    let mcgee = events
        .player_apps
        .iter()
        .find(|a| a.player_name == "Luke McGee")
        .expect("starter appearance");
    assert_eq!(mcgee.role, "starter");
    assert_eq!(mcgee.shirt_no, Some(1));
}

#[test]
fn cards_project_into_yellow_and_red_tables() {
    let events = sample_events();

    assert_eq!(events.yellow_cards.len(), 1);
    assert_eq!(events.yellow_cards[0].player_name, "Connor Jennings");
    assert_eq!(events.yellow_cards[0].min_yc, 34);

    assert_eq!(events.red_cards.len(), 1);
    assert_eq!(events.red_cards[0].player_name, "Regan Hendry");
    assert_eq!(events.red_cards[0].min_so, 88);
}
