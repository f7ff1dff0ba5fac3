use std::cmp::Ordering;
use std::collections::HashSet;

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::match_events::{
    Goal, PlayerAppearance, RedCard, Substitution, SubstitutionMinutes, YellowCard,
};
use crate::match_record::MatchRecord;
use crate::sequence;
use crate::store::LedgerStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    Results,
    Goals,
    PlayerApps,
    Subs,
    SubMins,
    YellowCards,
    RedCards,
}

impl Dataset {
    pub const ALL: [Dataset; 7] = [
        Dataset::Results,
        Dataset::Goals,
        Dataset::PlayerApps,
        Dataset::Subs,
        Dataset::SubMins,
        Dataset::YellowCards,
        Dataset::RedCards,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Dataset::Results => "results",
            Dataset::Goals => "goals",
            Dataset::PlayerApps => "player_apps",
            Dataset::Subs => "subs",
            Dataset::SubMins => "sub_mins",
            Dataset::YellowCards => "yellow_cards",
            Dataset::RedCards => "red_cards",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    NoUpdates,
    Updated(usize),
}

// A ledger row knows its date key and its dataset's persisted ordering.
pub trait LedgerRow {
    fn game_date(&self) -> NaiveDate;
    fn cmp_rows(&self, other: &Self) -> Ordering;
}

impl LedgerRow for MatchRecord {
    fn game_date(&self) -> NaiveDate {
        self.game_date
    }
    fn cmp_rows(&self, other: &Self) -> Ordering {
        self.game_date.cmp(&other.game_date)
    }
}

impl LedgerRow for Goal {
    fn game_date(&self) -> NaiveDate {
        self.game_date
    }
    fn cmp_rows(&self, other: &Self) -> Ordering {
        (self.game_date, self.goal_min).cmp(&(other.game_date, other.goal_min))
    }
}

impl LedgerRow for PlayerAppearance {
    fn game_date(&self) -> NaiveDate {
        self.game_date
    }
    fn cmp_rows(&self, other: &Self) -> Ordering {
        let key = |r: &Self| {
            (
                r.game_date,
                r.role.clone(),
                r.shirt_no.unwrap_or(u32::MAX),
            )
        };
        key(self).cmp(&key(other))
    }
}

impl LedgerRow for Substitution {
    fn game_date(&self) -> NaiveDate {
        self.game_date
    }
    fn cmp_rows(&self, other: &Self) -> Ordering {
        self.game_date.cmp(&other.game_date)
    }
}

impl LedgerRow for SubstitutionMinutes {
    fn game_date(&self) -> NaiveDate {
        self.game_date
    }
    fn cmp_rows(&self, other: &Self) -> Ordering {
        self.game_date.cmp(&other.game_date)
    }
}

impl LedgerRow for YellowCard {
    fn game_date(&self) -> NaiveDate {
        self.game_date
    }
    fn cmp_rows(&self, other: &Self) -> Ordering {
        (self.game_date, self.min_yc).cmp(&(other.game_date, other.min_yc))
    }
}

impl LedgerRow for RedCard {
    fn game_date(&self) -> NaiveDate {
        self.game_date
    }
    fn cmp_rows(&self, other: &Self) -> Ordering {
        (self.game_date, self.min_so).cmp(&(other.game_date, other.min_so))
    }
}

pub fn existing_dates(store: &LedgerStore) -> Result<HashSet<NaiveDate>> {
    let records: Vec<MatchRecord> = store.load(Dataset::Results.name())?;
    Ok(records.iter().map(|r| r.game_date).collect())
}

// A date already present is fully processed for this dataset, even if it
// was only partially populated.
fn net_new<R: LedgerRow>(existing: &[R], candidates: Vec<R>) -> Vec<R> {
    let known: HashSet<NaiveDate> = existing.iter().map(LedgerRow::game_date).collect();
    candidates
        .into_iter()
        .filter(|row| !known.contains(&row.game_date()))
        .collect()
}

// LOADED -> DEDUPED -> {NOOP | ARCHIVED -> MERGED -> SORTED -> PERSISTED}.
// The archive write strictly precedes the overwrite, which is the final
// step, so a failure anywhere leaves the last-known-good table on disk.
pub fn update_events<R>(
    store: &LedgerStore,
    dataset: Dataset,
    candidates: Vec<R>,
    stamp: &str,
) -> Result<UpdateOutcome>
where
    R: LedgerRow + Serialize + DeserializeOwned,
{
    let name = dataset.name();
    let existing: Vec<R> = store.load(name)?;
    let fresh = net_new(&existing, candidates);
    if fresh.is_empty() {
        log::info!("no updates required for {name}");
        return Ok(UpdateOutcome::NoUpdates);
    }
    let added = fresh.len();
    log::info!("{added} updates being made to {name}");

    store.archive(name, &existing, stamp)?;

    let mut merged = existing;
    merged.extend(fresh);
    merged.sort_by(LedgerRow::cmp_rows);
    store.save(name, &merged)?;
    Ok(UpdateOutcome::Updated(added))
}

// The results ledger additionally recomputes its sequence columns between
// the merge and the final sort: newest-first after concatenation, renumber
// in ascending date order, then the persisted ascending order.
pub fn update_results(
    store: &LedgerStore,
    candidates: Vec<MatchRecord>,
    stamp: &str,
) -> Result<UpdateOutcome> {
    let name = Dataset::Results.name();
    let existing: Vec<MatchRecord> = store.load(name)?;
    let fresh = net_new(&existing, candidates);
    if fresh.is_empty() {
        log::info!("no updates required for {name}");
        return Ok(UpdateOutcome::NoUpdates);
    }
    let added = fresh.len();
    log::info!("{added} updates being made to {name}");

    store.archive(name, &existing, stamp)?;

    let mut merged = existing;
    merged.extend(fresh);
    merged.sort_by(|a, b| b.game_date.cmp(&a.game_date));
    sequence::renumber(&mut merged);
    merged.sort_by(LedgerRow::cmp_rows);
    store.save(name, &merged)?;
    Ok(UpdateOutcome::Updated(added))
}
