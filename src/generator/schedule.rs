use crate::model::Task;
use chrono::{Duration, NaiveDateTime};
use rand::Rng;

/// The longest gap, in days, between two consecutive transactions before jitter.
const MAX_INTERVAL_DAYS: i64 = 14;

/// The base spacing in days for an archetype frequency. Frequencies above one per day still step a
/// whole day at a time.
pub fn base_interval_days(n_per_day: f64) -> i64 {
    let per_transaction = if n_per_day > 0.0 {
        (1.0 / n_per_day).floor() as i64
    } else {
        MAX_INTERVAL_DAYS
    };
    per_transaction.clamp(1, MAX_INTERVAL_DAYS)
}

/// Walks forward from the start of the task window in jittered steps and returns every timestamp
/// that is not after `end_date`. The result is strictly increasing.
pub fn timestamps<R: Rng>(rng: &mut R, task: &Task) -> Vec<NaiveDateTime> {
    let end = task.end_date();
    let base = base_interval_days(task.archetype().desc().n_per_day);
    let jitter = (base as f64 * 0.2).floor() as i64;

    let mut result = Vec::new();
    let mut current = task.start_date();
    while current < end {
        let jitter_days = rng.gen_range(-jitter..=jitter);
        let jitter_hours = rng.gen_range(-12..=12);
        let next = current + Duration::days(base + jitter_days) + Duration::hours(jitter_hours);
        if next > end {
            break;
        }
        result.push(next);
        current = next;
    }
    result
}
