use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde_json::Value;

use crate::http_client::fetch_text;
use crate::lookups::{OUR_TEAM, OUR_TEAM_SLUG};

const MATCH_LIST_BASE: &str =
    "https://push.api.bbci.co.uk/data/bbc-morph-football-scores-match-list-data";
const LINEUPS_BASE: &str =
    "https://push.api.bbci.co.uk/data/bbc-morph-sport-football-team-lineups-data";

static NULL: Value = Value::Null;

// One fixture's slice of the scores feed: the event object itself plus the
// tournament and round context it was published under, with the home/away
// keys resolved to "ours" and "theirs".
#[derive(Debug, Clone)]
pub struct MatchDocument {
    pub game_date: NaiveDate,
    pub event: Value,
    pub tournament: Value,
    pub round: Value,
    pub event_key: Option<String>,
    pub our_side: String,
    pub their_side: String,
}

impl MatchDocument {
    pub fn ours(&self) -> &Value {
        self.event.get(&self.our_side).unwrap_or(&NULL)
    }

    pub fn theirs(&self) -> &Value {
        self.event.get(&self.their_side).unwrap_or(&NULL)
    }
}

#[derive(Debug, Clone)]
pub struct LineupDocument {
    pub meta: Value,
    pub players: Vec<Value>,
}

pub fn fetch_match_document(client: &Client, date: NaiveDate) -> Result<Option<MatchDocument>> {
    let url = match_list_url(date);
    let body = fetch_text(client, &url).context("match list request failed")?;
    parse_match_list_json(&body, date)
}

pub fn fetch_lineup_document(
    client: &Client,
    event_key: &str,
    our_side: &str,
) -> Result<LineupDocument> {
    let url = lineup_url(event_key);
    let body = fetch_text(client, &url).context("lineup request failed")?;
    parse_lineup_json(&body, our_side)
}

fn match_list_url(date: NaiveDate) -> String {
    let d = date.format("%Y-%m-%d");
    format!(
        "{MATCH_LIST_BASE}/endDate/{d}/startDate/{d}/team/{OUR_TEAM_SLUG}/todayDate/{d}/version/2.4.6/withPlayerActions/true?timeout=5"
    )
}

fn lineup_url(event_key: &str) -> String {
    format!("{LINEUPS_BASE}/event/{event_key}/version/1.0.8")
}

// Ok(None) means the feed has no match for the requested date; anything
// structurally missing below matchData is a malformed document instead.
pub fn parse_match_list_json(raw: &str, game_date: NaiveDate) -> Result<Option<MatchDocument>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    let root: Value = serde_json::from_str(trimmed).context("invalid match list json")?;

    let Some(first) = root
        .get("matchData")
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
    else {
        return Ok(None);
    };

    let day = first
        .get("tournamentDatesWithEvents")
        .and_then(|v| v.as_object())
        .and_then(|m| m.values().next())
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .ok_or_else(|| anyhow!("match list missing tournament dates"))?;

    let event = day
        .get("events")
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .cloned()
        .ok_or_else(|| anyhow!("match list missing event"))?;

    let round = day.get("round").cloned().unwrap_or(Value::Null);
    let tournament = first
        .get("tournamentMeta")
        .cloned()
        .unwrap_or(Value::Null);

    let event_key = event
        .get("eventKey")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    let home_name = event
        .get("homeTeam")
        .and_then(|t| t.get("name"))
        .and_then(|n| n.get("full"))
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    let (our_side, their_side) = if home_name == OUR_TEAM {
        ("homeTeam", "awayTeam")
    } else {
        ("awayTeam", "homeTeam")
    };

    Ok(Some(MatchDocument {
        game_date,
        event,
        tournament,
        round,
        event_key,
        our_side: our_side.to_string(),
        their_side: their_side.to_string(),
    }))
}

pub fn parse_lineup_json(raw: &str, our_side: &str) -> Result<LineupDocument> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(anyhow!("empty lineup response"));
    }
    let root: Value = serde_json::from_str(trimmed).context("invalid lineup json")?;

    let meta = root.get("meta").cloned().unwrap_or(Value::Null);
    let team = root
        .get("teams")
        .and_then(|t| t.get(our_side))
        .ok_or_else(|| anyhow!("lineup missing {our_side} block"))?;
    let players = team
        .get("players")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();

    Ok(LineupDocument { meta, players })
}

pub fn as_u64_any(v: &Value) -> Option<u64> {
    if let Some(n) = v.as_u64() {
        return Some(n);
    }
    v.as_str()?
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect::<String>()
        .parse::<u64>()
        .ok()
}

pub fn as_u32_any(v: &Value) -> Option<u32> {
    let n = as_u64_any(v)?;
    u32::try_from(n).ok()
}

pub fn opt_str(v: &Value, key: &str) -> Option<String> {
    v.get(key)
        .and_then(|x| x.as_str())
        .map(|s| s.to_string())
}

pub fn full_name(v: &Value) -> Option<String> {
    v.get("name")
        .and_then(|n| n.get("full"))
        .and_then(|x| x.as_str())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::as_u32_any;
    use serde_json::json;

    #[test]
    fn numbers_parse_from_number_or_string() {
        assert_eq!(as_u32_any(&json!(7)), Some(7));
        assert_eq!(as_u32_any(&json!("23")), Some(23));
        assert_eq!(as_u32_any(&json!("5,594")), Some(5594));
        assert_eq!(as_u32_any(&json!("n/a")), None);
    }
}
