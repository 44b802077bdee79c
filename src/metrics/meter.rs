use crate::lease::Snapshot;

// Metric name constants
pub const LEASE_ACQUIRED: &str = "lease_acquired_total";
pub const LEASE_ACQUIRE_FAILED: &str = "lease_acquire_failed_total";
pub const LEASE_RELEASED: &str = "lease_released_total";
pub const LEASE_REVOKED: &str = "lease_revoked_total";

pub const TASKS_PERFORMED: &str = "lease_tasks_performed_total";
pub const TASKS_REFUSED: &str = "lease_tasks_refused_total";
pub const TASKS_EXPIRED: &str = "lease_tasks_expired_total";
pub const TASKS_ENDED: &str = "lease_tasks_ended_total";

pub const IS_LEASE_ACTIVE: &str = "lease_active";
pub const LEASE_TASKS: &str = "lease_tasks";

fn add(name: &'static str, value: i64) {
    if value > 0 {
        metrics::counter!(name).increment(value as u64);
    }
}

/// Adds the counter deltas collected since the previous flush.
pub fn add_lease_stat_counters(stats: &Snapshot) {
    add(LEASE_ACQUIRED, stats.acquisitions);
    add(LEASE_ACQUIRE_FAILED, stats.acquisition_failures);
    add(LEASE_RELEASED, stats.releases);
    add(LEASE_REVOKED, stats.revocations);
    add(TASKS_PERFORMED, stats.performed);
    add(TASKS_REFUSED, stats.refused);
    add(TASKS_EXPIRED, stats.expired);
    add(TASKS_ENDED, stats.ended);
}

/// Sets whether a grant is held and how many tasks share it.
pub fn set_lease_state(is_active: bool, tasks: usize) {
    metrics::gauge!(IS_LEASE_ACTIVE).set(if is_active { 1.0 } else { 0.0 });
    metrics::gauge!(LEASE_TASKS).set(tasks as f64);
}
