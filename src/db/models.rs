use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::db::schema::kv_pairs;

#[derive(Insertable)]
#[diesel(table_name = kv_pairs)]
pub(crate) struct NewPair<'a> {
    pub pair_key: &'a str,
    pub pair_value: &'a str,
    pub updated_at: String,
}

impl<'a> NewPair<'a> {
    pub fn new(key: &'a str, raw_value: &'a str, now: DateTime<Utc>) -> Self {
        Self {
            pair_key: key,
            pair_value: raw_value,
            updated_at: now.to_rfc3339(),
        }
    }
}
