use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;

use rovers_ledger::feed::{MatchDocument, parse_lineup_json, parse_match_list_json};
use rovers_ledger::match_record::{
    GameType, MatchContext, Outcome, Venue, build_match_record, classify_game_type,
};

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

fn league_doc() -> MatchDocument {
    parse_match_list_json(&read_fixture("match_list_league.json"), d("2023-08-19"))
        .expect("fixture should parse")
        .expect("fixture has a match")
}

fn cup_doc() -> MatchDocument {
    parse_match_list_json(&read_fixture("match_list_cup.json"), d("2022-01-11"))
        .expect("fixture should parse")
        .expect("fixture has a match")
}

fn ctx() -> MatchContext {
    MatchContext {
        manager: "Micky Mellon".to_string(),
        league_pos: Some(18),
        pts: Some(3),
    }
}

#[test]
fn league_record_derives_result_and_classification() {
    let doc = league_doc();
    let lineup = parse_lineup_json(&read_fixture("lineup.json"), &doc.our_side)
        .expect("lineup should parse");
    let record = build_match_record(&doc, &lineup, &ctx()).expect("record should build");

    assert_eq!(record.season, "2023/24");
    assert_eq!(record.game_date, d("2023-08-19"));
    assert_eq!(record.opposition, "Stockport County");
    assert_eq!(record.venue, Venue::H);
    assert_eq!(record.outcome, Outcome::W);
    assert_eq!(record.score, "2-1");
    assert_eq!(record.goals_for, 2);
    assert_eq!(record.goals_against, 1);
    assert_eq!(record.goal_diff, 1);
    assert_eq!(record.game_type, GameType::League);
    assert_eq!(record.competition, "League Two");
    assert_eq!(record.generic_comp, "Football League");
    assert_eq!(record.league_tier, Some(4));
    assert_eq!(record.league_pos, Some(18));
    assert_eq!(record.pts, Some(3));
    assert_eq!(record.attendance, Some(5594));
    assert_eq!(record.manager, "Micky Mellon");
    assert_eq!(record.referee.as_deref(), Some("Chris Pollard"));
    assert_eq!(record.stadium, "Prenton Park");
    assert_eq!(record.ko_time.as_deref(), Some("15:00"));
    assert_eq!(record.game_length, 90);

    // No cup context on a straight league fixture.
    assert!(record.cup_round.is_none());
    assert!(record.cup_leg.is_none());
    assert!(record.cup_stage.is_none());
    assert!(record.cup_replay.is_none());
    assert!(record.cup_section.is_none());
    assert!(record.aet.is_none());
    assert!(record.pen_outcome.is_none());
    assert!(record.agg_outcome.is_none());
    assert!(record.decider.is_none());
    assert!(record.cup_outcome.is_none());
    assert!(record.outcome_desc.is_none());

    // Sequence columns only exist after a merge.
    assert!(record.game_no.is_none());
    assert!(record.ssn_comp_game_no.is_none());
    assert!(record.weekday.is_none());
}

#[test]
fn cup_record_derives_decider_context() {
    let doc = cup_doc();
    let lineup = parse_lineup_json(&read_fixture("lineup.json"), &doc.our_side)
        .expect("lineup should parse");
    let record = build_match_record(&doc, &lineup, &ctx()).expect("record should build");

    assert_eq!(record.season, "2021/22");
    assert_eq!(record.game_type, GameType::Cup);
    assert_eq!(record.opposition, "Morecambe");
    assert_eq!(record.venue, Venue::A);
    assert_eq!(record.outcome, Outcome::D);
    assert_eq!(record.score, "1-1");
    assert_eq!(record.cup_stage.as_deref(), Some("Northern Quarter-Finals"));
    assert_eq!(record.cup_round.as_deref(), Some("QF"));
    assert_eq!(record.cup_section.as_deref(), Some("Northern"));
    assert_eq!(record.aet, Some(true));
    assert_eq!(record.game_length, 120);
    assert_eq!(record.decider.as_deref(), Some("pens"));
    assert_eq!(record.pen_gf, Some(4));
    assert_eq!(record.pen_ga, Some(5));
    assert_eq!(record.pen_outcome, Some(Outcome::L));
    assert_eq!(record.pen_score.as_deref(), Some("4-5"));
    assert!(record.agg_outcome.is_none());
    assert_eq!(record.cup_outcome, Some(Outcome::L));
    assert_eq!(record.outcome_desc.as_deref(), Some("Lost 4-5 on pens"));

    // League context never applies to a cup tie, even when supplied.
    assert!(record.league_tier.is_none());
    assert!(record.league_pos.is_none());
    assert!(record.pts.is_none());
}

fn doc_with_event(event: serde_json::Value, date: &str) -> MatchDocument {
    MatchDocument {
        game_date: d(date),
        event,
        tournament: serde_json::json!({
            "tournamentName": {"first": "Papa John's Trophy", "full": "Papa John's Trophy"}
        }),
        round: serde_json::json!({
            "round": {"full": "Final"},
            "name": {"full": "Papa John's Trophy Final"}
        }),
        event_key: Some("EFBO9900001".to_string()),
        our_side: "homeTeam".to_string(),
        their_side: "awayTeam".to_string(),
    }
}

#[test]
fn aggregate_and_shootout_compose_the_outcome_description() {
    let event = serde_json::json!({
        "startTimeInUKHHMM": "15:00",
        "eventType": "2nd leg",
        "eventProgress": "EXTRATIMECOMPLETE",
        "eventOutcomeType": "shootout",
        "venue": {"name": {"full": "Wembley Stadium"}},
        "homeTeam": {
            "name": {"full": "Tranmere Rovers"},
            "scores": {"score": 2, "shootout": 5, "aggregate": 3},
            "eventOutcome": "win"
        },
        "awayTeam": {
            "name": {"full": "Salford City"},
            "scores": {"score": 0, "shootout": 4, "aggregate": 3},
            "eventOutcome": "loss"
        }
    });
    let doc = doc_with_event(event, "2022-04-03");
    let lineup = parse_lineup_json(&read_fixture("lineup.json"), &doc.our_side)
        .expect("lineup should parse");
    let record = build_match_record(&doc, &lineup, &ctx()).expect("record should build");

    assert_eq!(record.venue, Venue::N);
    assert_eq!(record.cup_round.as_deref(), Some("F"));
    assert_eq!(record.cup_leg.as_deref(), Some("2"));
    assert_eq!(record.agg_gf, Some(3));
    assert_eq!(record.agg_ga, Some(3));
    assert_eq!(record.agg_outcome, Some(Outcome::D));
    assert_eq!(record.agg_score.as_deref(), Some("3-3"));
    assert_eq!(record.pen_outcome, Some(Outcome::W));
    assert_eq!(record.decider.as_deref(), Some("pens"));
    assert_eq!(record.cup_outcome, Some(Outcome::W));
    assert_eq!(record.outcome_desc.as_deref(), Some("3-3. Won 5-4 on pens"));
}

#[test]
fn aggregate_alone_decides_without_extra_time() {
    let event = serde_json::json!({
        "startTimeInUKHHMM": "19:45",
        "eventType": "2nd leg",
        "eventProgress": "FULLTIME",
        "eventOutcomeType": null,
        "venue": {"name": {"full": "Prenton Park"}},
        "homeTeam": {
            "name": {"full": "Tranmere Rovers"},
            "scores": {"score": 1, "shootout": null, "aggregate": 3},
            "eventOutcome": "win"
        },
        "awayTeam": {
            "name": {"full": "Salford City"},
            "scores": {"score": 0, "shootout": null, "aggregate": 2},
            "eventOutcome": "loss"
        }
    });
    let doc = doc_with_event(event, "2022-03-15");
    let lineup = parse_lineup_json(&read_fixture("lineup.json"), &doc.our_side)
        .expect("lineup should parse");
    let record = build_match_record(&doc, &lineup, &ctx()).expect("record should build");

    assert!(record.aet.is_none());
    assert_eq!(record.game_length, 90);
    assert!(record.pen_outcome.is_none());
    assert!(record.decider.is_none());
    assert_eq!(record.agg_outcome, Some(Outcome::W));
    assert_eq!(record.cup_outcome, Some(Outcome::W));
    assert_eq!(record.outcome_desc.as_deref(), Some("Won 3-2 on agg"));
}

#[test]
fn replay_flag_comes_from_event_type() {
    let event = serde_json::json!({
        "startTimeInUKHHMM": "19:45",
        "eventType": "Replay",
        "eventProgress": "FULLTIME",
        "eventOutcomeType": null,
        "venue": {"name": {"full": "Prenton Park"}},
        "homeTeam": {
            "name": {"full": "Tranmere Rovers"},
            "scores": {"score": 2, "shootout": null, "aggregate": null},
            "eventOutcome": "win"
        },
        "awayTeam": {
            "name": {"full": "Salford City"},
            "scores": {"score": 0, "shootout": null, "aggregate": null},
            "eventOutcome": "loss"
        }
    });
    let doc = doc_with_event(event, "2021-11-16");
    let lineup = parse_lineup_json(&read_fixture("lineup.json"), &doc.our_side)
        .expect("lineup should parse");
    let record = build_match_record(&doc, &lineup, &ctx()).expect("record should build");

    assert_eq!(record.cup_replay, Some(true));
    assert!(record.cup_leg.is_none());
    // Settled inside ninety minutes, so the tie-level outcome is absent.
    assert!(record.cup_outcome.is_none());
    assert!(record.outcome_desc.is_none());
}

#[test]
fn round_presence_drives_game_type() {
    let mut doc = league_doc();
    assert_eq!(classify_game_type(&doc), GameType::League);

    doc.round = serde_json::json!({
        "round": {"full": "Play-offs Semi-Finals"},
        "name": {"full": "Play-offs"}
    });
    assert_eq!(classify_game_type(&doc), GameType::LeaguePlayOff);

    // A domestic-league tournament with a non-play-off round is a cup tie
    // played under the league banner.
    doc.round = serde_json::json!({
        "round": {"full": "First Round"},
        "name": {"full": "First Round"}
    });
    assert_eq!(classify_game_type(&doc), GameType::Cup);
}
