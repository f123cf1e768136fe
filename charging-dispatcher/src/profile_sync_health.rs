//! Public sync-health metadata for profile reload attempts.

use std::time::SystemTime;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProfileSyncHealth {
    pub last_attempt_at: Option<SystemTime>,
    pub last_success_at: Option<SystemTime>,
    pub last_attempt_succeeded: Option<bool>,
    pub previous_attempt_succeeded: Option<bool>,
    pub snapshot_version: u64,
}

impl ProfileSyncHealth {
    pub(crate) fn record_attempt(&mut self, succeeded: bool, snapshot_version: u64) {
        let now = SystemTime::now();
        self.previous_attempt_succeeded = self.last_attempt_succeeded;
        self.last_attempt_succeeded = Some(succeeded);
        self.last_attempt_at = Some(now);
        if succeeded {
            self.last_success_at = Some(now);
        }
        self.snapshot_version = snapshot_version;
    }
}

#[cfg(test)]
mod tests {
    use super::ProfileSyncHealth;

    #[test]
    fn record_attempt_shifts_previous_outcome() {
        let mut health = ProfileSyncHealth::default();

        health.record_attempt(true, 1);
        assert_eq!(health.last_attempt_succeeded, Some(true));
        assert_eq!(health.previous_attempt_succeeded, None);
        assert!(health.last_success_at.is_some());

        let last_success = health.last_success_at;
        health.record_attempt(false, 1);
        assert_eq!(health.last_attempt_succeeded, Some(false));
        assert_eq!(health.previous_attempt_succeeded, Some(true));
        assert_eq!(health.last_success_at, last_success);
        assert_eq!(health.snapshot_version, 1);
    }
}
