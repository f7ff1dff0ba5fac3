use std::hint::black_box;

use chrono::{Duration, NaiveDate};
use criterion::{Criterion, criterion_group, criterion_main};

use rovers_ledger::match_record::{
    GameType, MatchRecord, Outcome, Venue, cup_round_code, season_for_date,
};
use rovers_ledger::sequence::renumber;

const STAGES: &[&str] = &[
    "FA Cup Final",
    "Northern Quarter-Finals",
    "Play-offs",
    "FA Cup Third Round",
    "Group B",
    "Qualifying Round",
];

fn sample_record(date: NaiveDate, competition: &str) -> MatchRecord {
    MatchRecord {
        season: season_for_date(date),
        game_date: date,
        opposition: "Stockport County".to_string(),
        venue: Venue::H,
        score: "2-1".to_string(),
        outcome: Outcome::W,
        goals_for: 2,
        goals_against: 1,
        goal_diff: 1,
        game_type: GameType::League,
        competition: competition.to_string(),
        generic_comp: "Football League".to_string(),
        league_tier: Some(4),
        league_pos: None,
        pts: None,
        attendance: Some(7000),
        manager: "Micky Mellon".to_string(),
        ko_time: Some("15:00".to_string()),
        cup_round: None,
        cup_leg: None,
        cup_stage: None,
        cup_replay: None,
        cup_section: None,
        aet: None,
        pen_gf: None,
        pen_ga: None,
        pen_outcome: None,
        pen_score: None,
        agg_gf: None,
        agg_ga: None,
        agg_outcome: None,
        agg_score: None,
        decider: None,
        cup_outcome: None,
        outcome_desc: None,
        game_length: 90,
        stadium: "Prenton Park".to_string(),
        referee: None,
        game_no: None,
        ssn_comp_game_no: None,
        weekday: None,
    }
}

fn sample_history(n: usize) -> Vec<MatchRecord> {
    let start = NaiveDate::from_ymd_opt(2000, 8, 5).expect("valid date");
    let comps = ["League Two", "Carabao Cup", "The Emirates FA Cup"];
    (0..n)
        .map(|i| {
            let date = start + Duration::days(i as i64 * 4);
            sample_record(date, comps[i % comps.len()])
        })
        .collect()
}

fn bench_cup_round_cascade(c: &mut Criterion) {
    c.bench_function("cup_round_cascade", |b| {
        b.iter(|| {
            for stage in STAGES {
                black_box(cup_round_code(black_box(stage)));
            }
        })
    });
}

fn bench_renumber_history(c: &mut Criterion) {
    let history = sample_history(1000);
    c.bench_function("renumber_1000_records", |b| {
        b.iter(|| {
            let mut records = history.clone();
            renumber(&mut records);
            black_box(records.len());
        })
    });
}

criterion_group!(benches, bench_cup_round_cascade, bench_renumber_history);
criterion_main!(benches);
