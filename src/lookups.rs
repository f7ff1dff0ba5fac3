use std::collections::HashMap;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use reqwest::blocking::Client;

use crate::http_client::fetch_text;

pub const OUR_TEAM: &str = "Tranmere Rovers";
pub const OUR_NAME_MARKER: &str = "Tranmere";
pub const OUR_TEAM_SLUG: &str = "tranmere-rovers";
pub const HOME_GROUND: &str = "Prenton Park";
pub const NEUTRAL_GROUND: &str = "Wembley Stadium";

pub const DOMESTIC_LEAGUES: [&str; 3] = ["League One", "League Two", "National League"];

const MANAGERS_URL: &str =
    "https://raw.githubusercontent.com/petebrown/pre-2023-data-prep/main/data/managers.csv";

static GENERIC_COMPS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Bristol Street Motors Trophy", "Associate Members' Cup"),
        ("Carabao Cup", "League Cup"),
        ("FA Cup Qualifying", "FA Cup Qualifying"),
        ("Isuzu FA Trophy", "FA Trophy"),
        ("League One", "Football League"),
        ("League Two", "Football League"),
        ("National League", "Non-League"),
        ("Papa John's Trophy", "Associate Members' Cup"),
        ("The Emirates FA Cup", "FA Cup"),
    ])
});

static LEAGUE_TIERS: Lazy<HashMap<&'static str, u8>> = Lazy::new(|| {
    HashMap::from([("League One", 3), ("League Two", 4), ("National League", 5)])
});

pub fn generic_comp(competition: &str) -> Result<&'static str> {
    GENERIC_COMPS
        .get(competition)
        .copied()
        .ok_or_else(|| anyhow!("no generic bucket for competition {competition:?}"))
}

pub fn league_tier(competition: &str) -> Result<u8> {
    LEAGUE_TIERS
        .get(competition)
        .copied()
        .ok_or_else(|| anyhow!("no league tier for competition {competition:?}"))
}

#[derive(Debug, Clone)]
pub struct ManagerSpell {
    pub manager_name: String,
    pub date_from: NaiveDate,
    pub date_to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct ManagerRoster {
    spells: Vec<ManagerSpell>,
}

impl ManagerRoster {
    // The published roster is three plain columns without quoting, so a
    // line/comma split is enough. Column order comes from the header.
    pub fn parse_csv(raw: &str) -> Result<Self> {
        let mut lines = raw.lines().filter(|l| !l.trim().is_empty());
        let header = lines.next().ok_or_else(|| anyhow!("empty roster csv"))?;
        let cols = header.split(',').map(str::trim).collect::<Vec<_>>();
        let name_idx = column_index(&cols, "manager_name")?;
        let from_idx = column_index(&cols, "date_from")?;
        let to_idx = column_index(&cols, "date_to")?;

        let mut spells = Vec::new();
        for line in lines {
            let fields = line.split(',').map(str::trim).collect::<Vec<_>>();
            let name = fields.get(name_idx).copied().unwrap_or_default();
            let from = fields.get(from_idx).copied().unwrap_or_default();
            if name.is_empty() || from.is_empty() {
                continue;
            }
            let date_from = NaiveDate::parse_from_str(from, "%Y-%m-%d")
                .with_context(|| format!("bad date_from in roster row {line:?}"))?;
            let date_to = fields
                .get(to_idx)
                .copied()
                .filter(|s| !s.is_empty())
                .map(|s| {
                    NaiveDate::parse_from_str(s, "%Y-%m-%d")
                        .with_context(|| format!("bad date_to in roster row {line:?}"))
                })
                .transpose()?;
            spells.push(ManagerSpell {
                manager_name: name.to_string(),
                date_from,
                date_to,
            });
        }
        Ok(Self { spells })
    }

    pub fn manager_on(&self, date: NaiveDate) -> Result<&str> {
        self.spells
            .iter()
            .find(|s| s.date_from <= date && s.date_to.is_none_or(|to| to >= date))
            .map(|s| s.manager_name.as_str())
            .ok_or_else(|| anyhow!("no manager on record for {date}"))
    }
}

fn column_index(cols: &[&str], name: &str) -> Result<usize> {
    cols.iter()
        .position(|c| *c == name)
        .ok_or_else(|| anyhow!("roster csv missing column {name:?}"))
}

pub fn fetch_manager_roster(client: &Client) -> Result<ManagerRoster> {
    let body = fetch_text(client, MANAGERS_URL).context("manager roster request failed")?;
    ManagerRoster::parse_csv(&body)
}
