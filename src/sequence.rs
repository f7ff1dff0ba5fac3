use std::collections::HashMap;

use chrono::NaiveDate;

use crate::match_record::MatchRecord;

const CORRECTED_ATTENDANCE: u32 = 5594;

// Whole-table recomputation: a backdated insert shifts every later rank in
// its partition, so the counters are never carried incrementally.
pub fn renumber(records: &mut [MatchRecord]) {
    let mut order: Vec<usize> = (0..records.len()).collect();
    order.sort_by_key(|&i| records[i].game_date);

    let mut per_season: HashMap<String, u32> = HashMap::new();
    let mut per_season_comp: HashMap<(String, String), u32> = HashMap::new();

    for &i in &order {
        let record = &mut records[i];
        let season = record.season.clone();

        let n = per_season.entry(season.clone()).or_insert(0);
        *n += 1;
        record.game_no = Some(*n);

        let n = per_season_comp
            .entry((season, record.competition.clone()))
            .or_insert(0);
        *n += 1;
        record.ssn_comp_game_no = Some(*n);

        record.weekday = Some(record.game_date.format("%A").to_string());
    }

    apply_known_corrections(records);
}

// 2023-08-19: the feed published the away allocation only; the club's
// figure is 5594.
fn apply_known_corrections(records: &mut [MatchRecord]) {
    let corrected = NaiveDate::from_ymd_opt(2023, 8, 19);
    for record in records {
        if Some(record.game_date) == corrected {
            record.attendance = Some(CORRECTED_ATTENDANCE);
        }
    }
}
