use anyhow::{Context, Result, anyhow};
use chrono::{NaiveDate, Utc};
use reqwest::blocking::Client;

use rovers_ledger::feed;
use rovers_ledger::fixtures;
use rovers_ledger::http_client::http_client;
use rovers_ledger::league_table;
use rovers_ledger::ledger::{self, Dataset, UpdateOutcome};
use rovers_ledger::lookups::{self, ManagerRoster};
use rovers_ledger::match_events::build_match_events;
use rovers_ledger::match_record::{GameType, MatchContext, build_match_record, classify_game_type};
use rovers_ledger::store::LedgerStore;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let data_dir = flag_value(&args, "--data-dir")
        .or_else(|| opt_env("LEDGER_DATA_DIR"))
        .unwrap_or_else(|| "./data".to_string());
    let archive_dir = flag_value(&args, "--archive-dir")
        .or_else(|| opt_env("LEDGER_ARCHIVE_DIR"))
        .unwrap_or_else(|| "./archive".to_string());
    let store = LedgerStore::new(data_dir, archive_dir);

    let client = http_client()?;
    let dates = resolve_dates(client, &args)?;
    if dates.is_empty() {
        log::info!("nothing to update");
        return Ok(());
    }

    let known = ledger::existing_dates(&store)?;
    let pending: Vec<NaiveDate> = dates
        .into_iter()
        .filter(|date| {
            if known.contains(date) {
                log::info!("already have record for {date}");
                false
            } else {
                true
            }
        })
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let roster = lookups::fetch_manager_roster(client)?;
    for date in pending {
        if let Err(err) = process_date(client, &store, &roster, date) {
            log::warn!("{date}: {err:#}");
        }
    }
    Ok(())
}

fn process_date(
    client: &Client,
    store: &LedgerStore,
    roster: &ManagerRoster,
    date: NaiveDate,
) -> Result<()> {
    log::info!("trying to get match records for {date}");

    let Some(doc) = feed::fetch_match_document(client, date)? else {
        log::info!("no matches found for {date}");
        return Ok(());
    };
    let event_key = doc
        .event_key
        .clone()
        .ok_or_else(|| anyhow!("match document missing event key"))?;
    let lineup = feed::fetch_lineup_document(client, &event_key, &doc.our_side)?;

    let game_type = classify_game_type(&doc);
    let (league_pos, pts) = if game_type == GameType::League {
        let (pos, pts) = league_table::fetch_league_position(client, date)?;
        (Some(pos), Some(pts))
    } else {
        (None, None)
    };
    let ctx = MatchContext {
        manager: roster.manager_on(date)?.to_string(),
        league_pos,
        pts,
    };

    let record = build_match_record(&doc, &lineup, &ctx)?;
    let events = build_match_events(&doc, &lineup);

    let stamp = Utc::now().format("%Y-%m-%d-%H%M%S").to_string();
    report(Dataset::Results, ledger::update_results(store, vec![record], &stamp)?);
    report(
        Dataset::PlayerApps,
        ledger::update_events(store, Dataset::PlayerApps, events.player_apps, &stamp)?,
    );
    report(
        Dataset::Subs,
        ledger::update_events(store, Dataset::Subs, events.subs, &stamp)?,
    );
    report(
        Dataset::SubMins,
        ledger::update_events(store, Dataset::SubMins, events.sub_mins, &stamp)?,
    );
    report(
        Dataset::Goals,
        ledger::update_events(store, Dataset::Goals, events.goals, &stamp)?,
    );
    report(
        Dataset::YellowCards,
        ledger::update_events(store, Dataset::YellowCards, events.yellow_cards, &stamp)?,
    );
    report(
        Dataset::RedCards,
        ledger::update_events(store, Dataset::RedCards, events.red_cards, &stamp)?,
    );
    Ok(())
}

fn report(dataset: Dataset, outcome: UpdateOutcome) {
    match outcome {
        UpdateOutcome::NoUpdates => log::info!("{}: no updates performed", dataset.name()),
        UpdateOutcome::Updated(n) => log::info!("{}: {n} rows merged", dataset.name()),
    }
}

fn resolve_dates(client: &Client, args: &[String]) -> Result<Vec<NaiveDate>> {
    if let Some(raw) = flag_value(args, "--dates") {
        return parse_date_list(&raw);
    }

    let mode = positional_mode(args).unwrap_or("today");
    let all = fixtures::fetch_fixture_list(client)?;
    let now = Utc::now().naive_utc();

    match mode {
        "played" | "all" | "available" => Ok(fixtures::played_dates(&all, now)),
        "today" => {
            let date = now.date();
            let todays = fixtures::today(&all, date);
            let Some(next) = todays.first() else {
                log::info!("no game today");
                return Ok(Vec::new());
            };
            match fixtures::ready_date(&all, date, now) {
                Some(ready) => {
                    log::info!("update available for today's game against {}", next.opposition);
                    Ok(vec![ready])
                }
                None => {
                    log::info!(
                        "there is a game today against {}, but it is not ready for update yet",
                        next.opposition
                    );
                    Ok(Vec::new())
                }
            }
        }
        other => Err(anyhow!("unknown mode {other:?}")),
    }
}

// First bare argument, skipping any "--flag value" pair.
fn positional_mode(args: &[String]) -> Option<&str> {
    let mut after_flag = false;
    for arg in args {
        if after_flag {
            after_flag = false;
            continue;
        }
        if let Some(rest) = arg.strip_prefix("--") {
            after_flag = !rest.contains('=');
            continue;
        }
        return Some(arg);
    }
    None
}

fn parse_date_list(raw: &str) -> Result<Vec<NaiveDate>> {
    let mut dates = Vec::new();
    for part in raw.split([',', ';', ' ']) {
        let trimmed = part.trim();
        if trimmed.is_empty() {
            continue;
        }
        let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .with_context(|| format!("bad date {trimmed:?}"))?;
        dates.push(date);
    }
    dates.sort_unstable();
    dates.dedup();
    Ok(dates)
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
        {
            let trimmed = next.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

fn opt_env(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|val| {
        let trimmed = val.trim().to_string();
        if trimmed.is_empty() { None } else { Some(trimmed) }
    })
}
