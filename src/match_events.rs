use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::feed::{LineupDocument, MatchDocument, as_u32_any, full_name};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub game_date: NaiveDate,
    pub player_name: String,
    pub goal_min: u32,
    pub penalty: bool,
    pub own_goal: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerAppearance {
    pub game_date: NaiveDate,
    pub player_name: String,
    pub shirt_no: Option<u32>,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Substitution {
    pub game_date: NaiveDate,
    pub shirt_no: Option<u32>,
    pub player_name: String,
    pub on_for: Option<u32>,
    pub off_for: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubstitutionMinutes {
    pub game_date: NaiveDate,
    pub player_name: String,
    pub min_off: Option<u32>,
    pub min_on: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub game_date: NaiveDate,
    pub player_name: String,
    pub minute: u32,
    pub card_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YellowCard {
    pub game_date: NaiveDate,
    pub player_name: String,
    pub min_yc: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedCard {
    pub game_date: NaiveDate,
    pub player_name: String,
    pub min_so: u32,
}

#[derive(Debug, Clone, Default)]
pub struct MatchEvents {
    pub goals: Vec<Goal>,
    pub player_apps: Vec<PlayerAppearance>,
    pub subs: Vec<Substitution>,
    pub sub_mins: Vec<SubstitutionMinutes>,
    pub yellow_cards: Vec<YellowCard>,
    pub red_cards: Vec<RedCard>,
}

pub fn build_match_events(doc: &MatchDocument, lineup: &LineupDocument) -> MatchEvents {
    let date = doc.game_date;
    let goals = build_goals(doc);
    let (subs, sub_mins) = build_subs(&lineup.players, date);
    let player_apps = build_player_apps(&lineup.players, date, &subs);
    let cards = build_cards(&lineup.players, date);
    MatchEvents {
        goals,
        player_apps,
        subs,
        sub_mins,
        yellow_cards: yellow_cards(&cards),
        red_cards: red_cards(&cards),
    }
}

pub fn build_goals(doc: &MatchDocument) -> Vec<Goal> {
    let mut goals = Vec::new();
    let Some(actions) = doc
        .ours()
        .get("playerActions")
        .and_then(|v| v.as_array())
    else {
        return goals;
    };
    for player in actions {
        let Some(player_name) = full_name(player) else {
            continue;
        };
        let Some(entries) = player.get("actions").and_then(|v| v.as_array()) else {
            continue;
        };
        for action in entries {
            if action.get("type").and_then(|v| v.as_str()) != Some("goal") {
                continue;
            }
            let Some(goal_min) = action.get("timeElapsed").and_then(as_u32_any) else {
                continue;
            };
            goals.push(Goal {
                game_date: doc.game_date,
                player_name: player_name.clone(),
                goal_min,
                penalty: flag(action, "penalty"),
                own_goal: flag(action, "ownGoal"),
            });
        }
    }
    goals
}

// One on-row and one off-row per substitution event, each also mirrored
// into the minutes table. The replaced player owns the event in the feed.
pub fn build_subs(players: &[Value], date: NaiveDate) -> (Vec<Substitution>, Vec<SubstitutionMinutes>) {
    let mut subs = Vec::new();
    let mut sub_mins = Vec::new();

    for player in players {
        let Some(player_name) = full_name(player) else {
            continue;
        };
        let player_shirt_no = shirt_no(player);
        let Some(sub) = player
            .get("substitutions")
            .and_then(|v| v.as_array())
            .and_then(|arr| arr.first())
        else {
            continue;
        };
        let Some(sub_min) = sub.get("timeElapsed").and_then(as_u32_any) else {
            continue;
        };
        let Some(replacement) = sub.get("replacedBy") else {
            continue;
        };
        let Some(player_on) = full_name(replacement) else {
            continue;
        };
        let sub_on_no = shirt_no(replacement);

        sub_mins.push(SubstitutionMinutes {
            game_date: date,
            player_name: player_on.clone(),
            min_off: None,
            min_on: Some(sub_min),
        });
        sub_mins.push(SubstitutionMinutes {
            game_date: date,
            player_name: player_name.clone(),
            min_off: Some(sub_min),
            min_on: None,
        });

        subs.push(Substitution {
            game_date: date,
            shirt_no: sub_on_no,
            player_name: player_on,
            on_for: player_shirt_no,
            off_for: None,
        });
        subs.push(Substitution {
            game_date: date,
            shirt_no: player_shirt_no,
            player_name,
            on_for: None,
            off_for: sub_on_no,
        });
    }

    (subs, sub_mins)
}

// A bench player only earns an appearance row if they actually came on,
// which the substitution rows already know.
pub fn build_player_apps(
    players: &[Value],
    date: NaiveDate,
    subs: &[Substitution],
) -> Vec<PlayerAppearance> {
    let subbed: HashSet<&str> = subs.iter().map(|s| s.player_name.as_str()).collect();

    let mut apps = Vec::new();
    for player in players {
        let Some(player_name) = full_name(player) else {
            continue;
        };
        let status = player
            .get("meta")
            .and_then(|m| m.get("status"))
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        let role = if status == "bench" { "sub" } else { status };
        if role != "starter" && !subbed.contains(player_name.as_str()) {
            continue;
        }
        apps.push(PlayerAppearance {
            game_date: date,
            player_name,
            shirt_no: shirt_no(player),
            role: role.to_string(),
        });
    }
    apps
}

pub fn build_cards(players: &[Value], date: NaiveDate) -> Vec<Card> {
    let mut cards = Vec::new();
    for player in players {
        let Some(player_name) = full_name(player) else {
            continue;
        };
        let Some(bookings) = player.get("bookings").and_then(|v| v.as_array()) else {
            continue;
        };
        for booking in bookings {
            let Some(minute) = booking.get("timeElapsed").and_then(as_u32_any) else {
                continue;
            };
            let Some(card_type) = booking.get("type").and_then(|v| v.as_str()) else {
                continue;
            };
            cards.push(Card {
                game_date: date,
                player_name: player_name.clone(),
                minute,
                card_type: card_type.to_string(),
            });
        }
    }
    cards
}

pub fn yellow_cards(cards: &[Card]) -> Vec<YellowCard> {
    cards
        .iter()
        .filter(|c| c.card_type == "yellow-card")
        .map(|c| YellowCard {
            game_date: c.game_date,
            player_name: c.player_name.clone(),
            min_yc: c.minute,
        })
        .collect()
}

pub fn red_cards(cards: &[Card]) -> Vec<RedCard> {
    cards
        .iter()
        .filter(|c| c.card_type.contains("red"))
        .map(|c| RedCard {
            game_date: c.game_date,
            player_name: c.player_name.clone(),
            min_so: c.minute,
        })
        .collect()
}

fn flag(v: &Value, key: &str) -> bool {
    v.get(key).and_then(|x| x.as_bool()).unwrap_or(false)
}

fn shirt_no(player: &Value) -> Option<u32> {
    player
        .get("meta")
        .and_then(|m| m.get("uniformNumber"))
        .and_then(as_u32_any)
}
