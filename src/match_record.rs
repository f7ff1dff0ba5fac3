use std::fmt;

use anyhow::{Result, anyhow};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::feed::{LineupDocument, MatchDocument, as_u32_any, opt_str};
use crate::lookups::{self, DOMESTIC_LEAGUES, HOME_GROUND, NEUTRAL_GROUND};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    W,
    D,
    L,
}

impl Outcome {
    pub fn from_scores(goals_for: u32, goals_against: u32) -> Outcome {
        if goals_for > goals_against {
            Outcome::W
        } else if goals_for < goals_against {
            Outcome::L
        } else {
            Outcome::D
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::W => "W",
            Outcome::D => "D",
            Outcome::L => "L",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Venue {
    H,
    A,
    N,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameType {
    League,
    #[serde(rename = "League Play-Off")]
    LeaguePlayOff,
    Cup,
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GameType::League => "League",
            GameType::LeaguePlayOff => "League Play-Off",
            GameType::Cup => "Cup",
        };
        f.write_str(s)
    }
}

// Per-date context resolved outside the classifier: the manager roster hit
// and, for league fixtures, the league-table position and points.
#[derive(Debug, Clone)]
pub struct MatchContext {
    pub manager: String,
    pub league_pos: Option<u32>,
    pub pts: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    pub season: String,
    pub game_date: NaiveDate,
    pub opposition: String,
    pub venue: Venue,
    pub score: String,
    pub outcome: Outcome,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_diff: i64,
    pub game_type: GameType,
    pub competition: String,
    pub generic_comp: String,
    pub league_tier: Option<u8>,
    pub league_pos: Option<u32>,
    pub pts: Option<u32>,
    pub attendance: Option<u32>,
    pub manager: String,
    pub ko_time: Option<String>,
    pub cup_round: Option<String>,
    pub cup_leg: Option<String>,
    pub cup_stage: Option<String>,
    pub cup_replay: Option<bool>,
    pub cup_section: Option<String>,
    pub aet: Option<bool>,
    pub pen_gf: Option<u32>,
    pub pen_ga: Option<u32>,
    pub pen_outcome: Option<Outcome>,
    pub pen_score: Option<String>,
    pub agg_gf: Option<u32>,
    pub agg_ga: Option<u32>,
    pub agg_outcome: Option<Outcome>,
    pub agg_score: Option<String>,
    pub decider: Option<String>,
    pub cup_outcome: Option<Outcome>,
    pub outcome_desc: Option<String>,
    pub game_length: u32,
    pub stadium: String,
    pub referee: Option<String>,
    pub game_no: Option<u32>,
    pub ssn_comp_game_no: Option<u32>,
    pub weekday: Option<String>,
}

pub fn build_match_record(
    doc: &MatchDocument,
    lineup: &LineupDocument,
    ctx: &MatchContext,
) -> Result<MatchRecord> {
    let goals_for = score_of(doc.ours())
        .ok_or_else(|| anyhow!("match event missing our score"))?;
    let goals_against = score_of(doc.theirs())
        .ok_or_else(|| anyhow!("match event missing their score"))?;
    let outcome = Outcome::from_scores(goals_for, goals_against);

    let opposition = crate::feed::full_name(doc.theirs())
        .ok_or_else(|| anyhow!("match event missing opposition name"))?;
    let stadium = doc
        .event
        .get("venue")
        .and_then(crate::feed::full_name)
        .ok_or_else(|| anyhow!("match event missing stadium"))?;

    let game_type = classify_game_type(doc);
    let competition = competition_name(doc)?;
    let generic_comp = lookups::generic_comp(&competition)?.to_string();
    let league_tier = if matches!(generic_comp.as_str(), "Football League" | "Non-League") {
        Some(lookups::league_tier(&competition)?)
    } else {
        None
    };

    let (cup_stage, cup_section) = stage_and_section(&doc.round);
    let cup_round = cup_stage
        .as_deref()
        .and_then(cup_round_code)
        .map(|c| c.to_string());
    let cup_leg = cup_leg(&doc.event);
    let cup_replay = cup_replay(&doc.event);
    let aet = aet_flag(&doc.event);

    let (pen_gf, pen_ga) = sub_scores(doc, "shootout");
    let (pen_outcome, pen_score) = sub_outcome(pen_gf, pen_ga);
    let (agg_gf, agg_ga) = sub_scores(doc, "aggregate");
    let (agg_outcome, agg_score) = sub_outcome(agg_gf, agg_ga);

    let decider = decider(&doc.event);
    let cup_outcome = cup_outcome(doc, outcome, aet, pen_outcome, agg_outcome);
    let outcome_desc = outcome_desc(pen_outcome, pen_score.as_deref(), agg_outcome, agg_score.as_deref());

    let attendance = lineup.meta.get("attendance").and_then(as_u32_any);
    let referee = opt_str(&lineup.meta, "referee");
    let ko_time = opt_str(&doc.event, "startTimeInUKHHMM");

    let (league_pos, pts) = if game_type == GameType::League {
        (ctx.league_pos, ctx.pts)
    } else {
        (None, None)
    };

    Ok(MatchRecord {
        season: season_for_date(doc.game_date),
        game_date: doc.game_date,
        opposition,
        venue: venue_for(&stadium),
        score: format!("{goals_for}-{goals_against}"),
        outcome,
        goals_for,
        goals_against,
        goal_diff: i64::from(goals_for) - i64::from(goals_against),
        game_type,
        competition,
        generic_comp,
        league_tier,
        league_pos,
        pts,
        attendance,
        manager: ctx.manager.clone(),
        ko_time,
        cup_round,
        cup_leg,
        cup_stage,
        cup_replay,
        cup_section,
        aet,
        pen_gf,
        pen_ga,
        pen_outcome,
        pen_score,
        agg_gf,
        agg_ga,
        agg_outcome,
        agg_score,
        decider,
        cup_outcome,
        outcome_desc,
        game_length: if aet.is_some() { 120 } else { 90 },
        stadium,
        referee,
        game_no: None,
        ssn_comp_game_no: None,
        weekday: None,
    })
}

pub fn season_for_date(date: NaiveDate) -> String {
    let year = date.year();
    if date.month() >= 8 {
        format!("{}/{:02}", year, (year + 1) % 100)
    } else {
        format!("{}/{:02}", year - 1, year % 100)
    }
}

// League fixtures carry no round block; a domestic-league round that is not
// the play-offs is a cup tie played under the league banner. Ordering of
// these checks is load-bearing.
pub fn classify_game_type(doc: &MatchDocument) -> GameType {
    let tournament = doc
        .tournament
        .get("tournamentName")
        .and_then(|n| n.get("first"))
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    if !DOMESTIC_LEAGUES.contains(&tournament) {
        return GameType::Cup;
    }
    match doc
        .round
        .get("round")
        .and_then(|r| r.get("full"))
        .and_then(|v| v.as_str())
    {
        None => GameType::League,
        Some(text) if text.contains("Play-offs") => GameType::LeaguePlayOff,
        Some(_) => GameType::Cup,
    }
}

pub fn competition_name(doc: &MatchDocument) -> Result<String> {
    let full = doc
        .tournament
        .get("tournamentName")
        .and_then(|n| n.get("full"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow!("tournament missing full name"))?;
    Ok(full
        .replace("Sky Bet ", "")
        .replace("Vanarama", "")
        .trim()
        .to_string())
}

enum StageTest {
    Contains(&'static str),
    OneOf(&'static [&'static str]),
}

// First match wins, walked top to bottom. " FINAL" carries its leading
// space so that the hyphenated semi/quarter stage names never reach it, and
// the numbered rounds sit above the group test.
const CUP_ROUND_RULES: &[(StageTest, &str)] = &[
    (StageTest::Contains(" FINAL"), "F"),
    (StageTest::OneOf(&["PLAY-OFFS", "SEMI-FINALS"]), "SF"),
    (StageTest::Contains("QUARTER-FINALS"), "QF"),
    (StageTest::Contains("FIFTH ROUND"), "5"),
    (StageTest::Contains("FOURTH ROUND"), "4"),
    (StageTest::Contains("THIRD ROUND"), "3"),
    (StageTest::Contains("SECOND ROUND"), "2"),
    (StageTest::Contains("FIRST ROUND"), "1"),
    (StageTest::Contains("GROUP"), "G"),
];

pub fn cup_round_code(stage: &str) -> Option<&'static str> {
    let upper = stage.to_uppercase();
    for (test, code) in CUP_ROUND_RULES {
        let hit = match test {
            StageTest::Contains(pat) => upper.contains(pat),
            StageTest::OneOf(names) => names.iter().any(|n| upper == *n),
        };
        if hit {
            return Some(code);
        }
    }
    None
}

fn stage_and_section(round: &Value) -> (Option<String>, Option<String>) {
    let Some(stage) = round
        .get("name")
        .and_then(|n| n.get("full"))
        .and_then(|v| v.as_str())
    else {
        return (None, None);
    };
    let section = cup_section(stage);
    (Some(stage.to_string()), section)
}

fn cup_section(stage: &str) -> Option<String> {
    let idx = stage.find("North")?;
    let rest = &stage[idx + "North".len()..];
    if rest.starts_with("ern") {
        Some("Northern".to_string())
    } else {
        Some("North".to_string())
    }
}

fn cup_leg(event: &Value) -> Option<String> {
    let event_type = event.get("eventType").and_then(|v| v.as_str())?;
    if event_type.contains("leg") {
        event_type.chars().next().map(|c| c.to_string())
    } else {
        None
    }
}

fn cup_replay(event: &Value) -> Option<bool> {
    let event_type = event.get("eventType").and_then(|v| v.as_str())?;
    if event_type.eq_ignore_ascii_case("replay") {
        Some(true)
    } else {
        None
    }
}

fn aet_flag(event: &Value) -> Option<bool> {
    let progress = event.get("eventProgress").and_then(|v| v.as_str())?;
    if progress == "EXTRATIMECOMPLETE" {
        Some(true)
    } else {
        None
    }
}

fn decider(event: &Value) -> Option<String> {
    match event.get("eventOutcomeType").and_then(|v| v.as_str()) {
        Some("shootout") => Some("pens".to_string()),
        Some("extra-time") => Some("extra time".to_string()),
        _ => None,
    }
}

fn score_of(side: &Value) -> Option<u32> {
    side.get("scores").and_then(|s| s.get("score")).and_then(as_u32_any)
}

fn sub_scores(doc: &MatchDocument, kind: &str) -> (Option<u32>, Option<u32>) {
    let pick = |side: &Value| {
        side.get("scores")
            .and_then(|s| s.get(kind))
            .and_then(as_u32_any)
    };
    (pick(doc.ours()), pick(doc.theirs()))
}

// Shared law for penalty and aggregate sub-scores: both halves present
// yields an outcome and an "F-A" score string, anything else yields neither.
fn sub_outcome(gf: Option<u32>, ga: Option<u32>) -> (Option<Outcome>, Option<String>) {
    match (gf, ga) {
        (Some(gf), Some(ga)) => (
            Some(Outcome::from_scores(gf, ga)),
            Some(format!("{gf}-{ga}")),
        ),
        _ => (None, None),
    }
}

// Only a tie resolved beyond this leg's ninety minutes gets a cup outcome.
// When the feed omits its own event-outcome letter the plain match outcome
// stands in (extra time ending level before penalties is the known case).
fn cup_outcome(
    doc: &MatchDocument,
    outcome: Outcome,
    aet: Option<bool>,
    pen_outcome: Option<Outcome>,
    agg_outcome: Option<Outcome>,
) -> Option<Outcome> {
    if aet.is_none() && pen_outcome.is_none() && agg_outcome.is_none() {
        return None;
    }
    let fed = doc
        .ours()
        .get("eventOutcome")
        .and_then(|v| v.as_str())
        .and_then(|s| s.chars().next())
        .map(|c| c.to_ascii_uppercase());
    match fed {
        Some('W') => Some(Outcome::W),
        Some('L') => Some(Outcome::L),
        Some('D') => Some(Outcome::D),
        _ => Some(outcome),
    }
}

fn outcome_desc(
    pen_outcome: Option<Outcome>,
    pen_score: Option<&str>,
    agg_outcome: Option<Outcome>,
    agg_score: Option<&str>,
) -> Option<String> {
    let won_or_lost = |o: Outcome| if o == Outcome::W { "Won" } else { "Lost" };
    if let (Some(pen), Some(pen_score)) = (pen_outcome, pen_score) {
        let word = won_or_lost(pen);
        if let Some(agg_score) = agg_score.filter(|_| agg_outcome.is_some()) {
            Some(format!("{agg_score}. {word} {pen_score} on pens"))
        } else {
            Some(format!("{word} {pen_score} on pens"))
        }
    } else if let (Some(agg), Some(agg_score)) = (agg_outcome, agg_score) {
        Some(format!("{} {agg_score} on agg", won_or_lost(agg)))
    } else {
        None
    }
}

pub fn venue_for(stadium: &str) -> Venue {
    if stadium == NEUTRAL_GROUND {
        Venue::N
    } else if stadium == HOME_GROUND {
        Venue::H
    } else {
        Venue::A
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).expect("valid date")
    }

    #[test]
    fn season_splits_on_august() {
        assert_eq!(season_for_date(d(2023, 8, 19)), "2023/24");
        assert_eq!(season_for_date(d(2024, 5, 3)), "2023/24");
        assert_eq!(season_for_date(d(1999, 10, 2)), "1999/00");
    }

    #[test]
    fn outcome_law() {
        assert_eq!(Outcome::from_scores(2, 1), Outcome::W);
        assert_eq!(Outcome::from_scores(0, 0), Outcome::D);
        assert_eq!(Outcome::from_scores(1, 3), Outcome::L);
    }

    #[test]
    fn cup_round_cascade_precedence() {
        assert_eq!(cup_round_code("FA Cup Final"), Some("F"));
        assert_eq!(cup_round_code("FA Cup Quarter-Finals"), Some("QF"));
        assert_eq!(cup_round_code("Semi-Finals"), Some("SF"));
        assert_eq!(cup_round_code("Play-offs"), Some("SF"));
        assert_eq!(cup_round_code("FA Cup Third Round"), Some("3"));
        assert_eq!(cup_round_code("Group B"), Some("G"));
        assert_eq!(cup_round_code("Qualifying"), None);
    }

    #[test]
    fn section_extends_to_northern() {
        assert_eq!(cup_section("Northern Group B"), Some("Northern".to_string()));
        assert_eq!(cup_section("North Quarter-Finals"), Some("North".to_string()));
        assert_eq!(cup_section("Southern Group A"), None);
    }

    #[test]
    fn venue_is_a_closed_trichotomy() {
        assert_eq!(venue_for("Prenton Park"), Venue::H);
        assert_eq!(venue_for("Wembley Stadium"), Venue::N);
        assert_eq!(venue_for("Edgeley Park"), Venue::A);
    }
}
