pub mod feed;
pub mod fixtures;
pub mod html;
pub mod http_client;
pub mod league_table;
pub mod ledger;
pub mod lookups;
pub mod match_events;
pub mod match_record;
pub mod sequence;
pub mod store;
