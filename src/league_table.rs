use anyhow::{Context, Result, anyhow};
use chrono::{Duration, NaiveDate};
use reqwest::blocking::Client;

use crate::html::{collect_tag_blocks, first_tag_block, strip_tags};
use crate::http_client::fetch_text;
use crate::lookups::OUR_NAME_MARKER;
use crate::match_record::Venue;

const LEAGUE_TABLE_BASE: &str = "https://www.11v11.com/league-tables/league-two";

#[derive(Debug, Clone)]
pub struct TableRow {
    pub pos: u32,
    pub team: String,
    pub pts: u32,
}

pub fn table_url(date: NaiveDate, venue: Option<Venue>) -> String {
    let day = date.format("%d");
    let month = date.format("%B").to_string().to_lowercase();
    let year = date.format("%Y");
    let mut url = format!("{LEAGUE_TABLE_BASE}/{day}-{month}-{year}/");
    match venue {
        Some(Venue::H) => url.push_str("home"),
        Some(Venue::A) => url.push_str("away"),
        _ => {}
    }
    url
}

// The table as it stood the day before kickoff.
pub fn prematch_date(date: NaiveDate) -> NaiveDate {
    date - Duration::days(1)
}

// Positions are positional: the site's own rank column is ignored and the
// 1-based body-row index used instead. Points are the last numeric cell.
pub fn parse_league_table(html: &str) -> Vec<TableRow> {
    let Some(table) = first_tag_block(html, "<table", "</table>") else {
        return Vec::new();
    };
    let mut rows = Vec::new();
    for tr in collect_tag_blocks(table, "<tr", "</tr>") {
        let cells: Vec<String> = collect_tag_blocks(tr, "<td", "</td>")
            .iter()
            .map(|c| strip_tags(c))
            .collect();
        if cells.is_empty() {
            continue;
        }
        let Some(team) = cells
            .iter()
            .find(|c| c.chars().any(|ch| ch.is_alphabetic()))
            .cloned()
        else {
            continue;
        };
        let Some(pts) = cells.iter().rev().find_map(|c| c.parse::<u32>().ok()) else {
            continue;
        };
        rows.push(TableRow {
            pos: rows.len() as u32 + 1,
            team,
            pts,
        });
    }
    rows
}

pub fn club_position(rows: &[TableRow], club: &str) -> Option<(u32, u32)> {
    rows.iter()
        .find(|r| r.team.contains(club))
        .map(|r| (r.pos, r.pts))
}

pub fn fetch_league_position(client: &Client, date: NaiveDate) -> Result<(u32, u32)> {
    let url = table_url(date, None);
    let body = fetch_text(client, &url).context("league table request failed")?;
    let rows = parse_league_table(&body);
    club_position(&rows, OUR_NAME_MARKER)
        .ok_or_else(|| anyhow!("no league table containing {OUR_NAME_MARKER} found for {date}"))
}
