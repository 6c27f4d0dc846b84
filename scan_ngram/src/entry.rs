use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Usage record for one word or word sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NgramEntry {
    #[serde(default = "one")]
    pub count: u64,
    /// Written as RFC 3339 UTC. Offset-less ISO-8601 is read as local time.
    #[serde(
        default = "epoch",
        deserialize_with = "deserialize_timestamp"
    )]
    pub last_used: DateTime<Utc>,
}

impl NgramEntry {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            count: 1,
            last_used: now,
        }
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.count += 1;
        self.last_used = self.last_used.max(now);
    }

    /// Folds a duplicate entry (same key after case folding) into this one.
    pub fn absorb(&mut self, other: NgramEntry) {
        self.count += other.count;
        self.last_used = self.last_used.max(other.last_used);
    }

    /// Seconds since last use, never negative.
    pub fn age_secs(&self, now: DateTime<Utc>) -> f64 {
        let millis = (now - self.last_used).num_milliseconds().max(0);
        millis as f64 / 1000.0
    }

    /// `1 / (seconds_since_last_used + 1)`: 1.0 right after use, tending to 0.
    pub fn recency(&self, now: DateTime<Utc>) -> f64 {
        1.0 / (self.age_secs(now) + 1.0)
    }

    pub fn used_within(&self, now: DateTime<Utc>, secs: u64) -> bool {
        self.age_secs(now) < secs as f64
    }
}

fn one() -> u64 {
    1
}

fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| serde::de::Error::custom(format!("bad timestamp: {raw}")))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(naive_local_to_utc)
}

/// Files from writers that used naive local time. A wall time skipped by a
/// DST change has no local instant and is taken as UTC.
fn naive_local_to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    naive
        .and_local_timezone(Local)
        .earliest()
        .map_or_else(|| naive.and_utc(), |local| local.with_timezone(&Utc))
}
