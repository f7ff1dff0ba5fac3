use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use reqwest::blocking::Client;

use crate::html::{collect_tag_blocks, first_tag_block, strip_tags};
use crate::http_client::fetch_text;
use crate::lookups::OUR_NAME_MARKER;
use crate::match_record::Venue;

const RESULTS_URL: &str =
    "https://www.soccerbase.com/teams/team.sd?team_id=2598&teamTabs=results";

// Full-time plus the slack the feed needs to settle before a result page is
// worth scraping.
const MATCH_WINDOW_MINS: i64 = 135;

#[derive(Debug, Clone)]
pub struct Fixture {
    pub day: String,
    pub game_date: NaiveDate,
    pub ko_time: String,
    pub opposition: String,
    pub venue: Venue,
    pub competition: String,
    pub kickoff: NaiveDateTime,
    pub end_time: NaiveDateTime,
}

pub fn fetch_fixture_list(client: &Client) -> Result<Vec<Fixture>> {
    let body = fetch_text(client, RESULTS_URL).context("results page request failed")?;
    Ok(parse_results_page(&body))
}

// Fixture rows carry one cell whose text ends with the kickoff stamp
// "YYYY-MM-DD HH:MM" after the competition name, then the home and away
// team links in page order. Rows missing either piece are not fixtures.
pub fn parse_results_page(html: &str) -> Vec<Fixture> {
    let mut out = Vec::new();
    for row in collect_tag_blocks(html, "<tr", "</tr>") {
        let cells = collect_tag_blocks(row, "<td", "</td>");
        if cells.is_empty() {
            continue;
        }

        let mut comp_and_ko = None;
        let mut teams = Vec::new();
        for cell in &cells {
            let text = strip_tags(cell);
            if comp_and_ko.is_none()
                && let Some(parsed) = split_competition_kickoff(&text)
            {
                comp_and_ko = Some(parsed);
                continue;
            }
            if let Some(anchor) = first_tag_block(cell, "<a ", "</a>") {
                let name = strip_tags(anchor);
                if !name.is_empty() {
                    teams.push(name);
                }
            }
        }

        let Some((competition, kickoff)) = comp_and_ko else {
            continue;
        };
        if teams.len() < 2 {
            continue;
        }
        let home = &teams[0];
        let away = &teams[1];
        let venue = if home.contains(OUR_NAME_MARKER) {
            Venue::H
        } else {
            Venue::A
        };
        let opposition = if venue == Venue::H {
            away.clone()
        } else {
            home.clone()
        };

        out.push(Fixture {
            day: kickoff.date().format("%A").to_string(),
            game_date: kickoff.date(),
            ko_time: kickoff.format("%H:%M").to_string(),
            opposition,
            venue,
            competition,
            kickoff,
            end_time: kickoff + Duration::minutes(MATCH_WINDOW_MINS),
        });
    }
    out
}

fn split_competition_kickoff(text: &str) -> Option<(String, NaiveDateTime)> {
    const STAMP_LEN: usize = "YYYY-MM-DD HH:MM".len();
    if text.len() < STAMP_LEN || !text.is_char_boundary(text.len() - STAMP_LEN) {
        return None;
    }
    let (head, tail) = text.split_at(text.len() - STAMP_LEN);
    let kickoff = NaiveDateTime::parse_from_str(tail, "%Y-%m-%d %H:%M").ok()?;
    let competition = head.trim().to_string();
    if competition.is_empty() {
        return None;
    }
    Some((competition, kickoff))
}

pub fn played(fixtures: &[Fixture], now: NaiveDateTime) -> Vec<Fixture> {
    fixtures
        .iter()
        .filter(|f| f.end_time < now)
        .cloned()
        .collect()
}

pub fn unplayed(fixtures: &[Fixture], now: NaiveDateTime) -> Vec<Fixture> {
    fixtures
        .iter()
        .filter(|f| f.end_time >= now)
        .cloned()
        .collect()
}

pub fn today(fixtures: &[Fixture], date: NaiveDate) -> Vec<Fixture> {
    fixtures
        .iter()
        .filter(|f| f.game_date == date)
        .cloned()
        .collect()
}

// Today's fixture date once its window has elapsed, i.e. ready to process.
pub fn ready_date(fixtures: &[Fixture], date: NaiveDate, now: NaiveDateTime) -> Option<NaiveDate> {
    today(fixtures, date)
        .into_iter()
        .find(|f| f.end_time < now)
        .map(|f| f.game_date)
}

pub fn played_dates(fixtures: &[Fixture], now: NaiveDateTime) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = played(fixtures, now).iter().map(|f| f.game_date).collect();
    dates.sort_unstable();
    dates.dedup();
    dates
}
