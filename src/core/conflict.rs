//! Version validation for the compare-and-write path
//!
//! This module provides the `ConflictDetector`, which a store consults inside
//! its per-record critical section to decide whether a write may proceed and
//! which version the record carries afterwards.
//!
//! # Policies
//!
//! - `None`: every write is accepted; the record stays unversioned
//! - `TokenBased`: the presented token must equal the stored one; the next
//!   token is the stored token plus one
//! - `RowVersionBased`: the presented stamp must equal the stored one; the
//!   next stamp is freshly issued by the detector
//!
//! Row-version stamps are derived from a per-detector sequence mixed with a
//! random salt, so a stamp is never issued twice by the same detector and a
//! superseded stamp can never validate again.

use crate::types::{AccountError, AccountId, ConcurrencyPolicy, RowVersion, Version};
use std::sync::atomic::{AtomicU64, Ordering};

/// Decides whether a write may commit and produces the next version
#[derive(Debug)]
pub struct ConflictDetector {
    /// Policy enforced by this detector
    policy: ConcurrencyPolicy,

    /// Salt mixed into every issued row-version stamp
    stamp_salt: u64,

    /// Sequence of issued row-version stamps
    next_stamp: AtomicU64,
}

impl ConflictDetector {
    /// Create a detector enforcing `policy`
    pub fn new(policy: ConcurrencyPolicy) -> Self {
        Self {
            policy,
            stamp_salt: rand::random(),
            next_stamp: AtomicU64::new(0),
        }
    }

    /// Policy enforced by this detector
    pub fn policy(&self) -> ConcurrencyPolicy {
        self.policy
    }

    /// Version assigned to a freshly inserted record
    pub fn initial_version(&self) -> Version {
        match self.policy {
            ConcurrencyPolicy::None => Version::Unversioned,
            ConcurrencyPolicy::TokenBased => Version::Token(0),
            ConcurrencyPolicy::RowVersionBased => Version::RowVersion(self.issue_stamp()),
        }
    }

    /// Check the version a writer read against the version currently stored
    ///
    /// # Errors
    ///
    /// Returns `ConcurrencyConflict` when the policy requires a version and
    /// `expected != actual`.
    pub fn validate(
        &self,
        id: AccountId,
        expected: &Version,
        actual: &Version,
    ) -> Result<(), AccountError> {
        if !self.policy.requires_version() || expected == actual {
            return Ok(());
        }

        Err(AccountError::concurrency_conflict(id, *expected, *actual))
    }

    /// Version a record carries after a successful write
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` if a concurrency token cannot be advanced.
    pub fn next_version(&self, id: AccountId, current: &Version) -> Result<Version, AccountError> {
        match (self.policy, current) {
            (ConcurrencyPolicy::None, _) => Ok(Version::Unversioned),
            (ConcurrencyPolicy::TokenBased, Version::Token(token)) => token
                .checked_add(1)
                .map(Version::Token)
                .ok_or_else(|| AccountError::arithmetic_overflow("token", id)),
            // Record was not created under this policy; start its token sequence
            (ConcurrencyPolicy::TokenBased, _) => Ok(Version::Token(0)),
            (ConcurrencyPolicy::RowVersionBased, _) => {
                Ok(Version::RowVersion(self.issue_stamp()))
            }
        }
    }

    fn issue_stamp(&self) -> RowVersion {
        let sequence = self.next_stamp.fetch_add(1, Ordering::Relaxed);
        RowVersion::from_bytes((sequence ^ self.stamp_salt).to_be_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashSet;

    #[rstest]
    #[case(ConcurrencyPolicy::None)]
    #[case(ConcurrencyPolicy::TokenBased)]
    #[case(ConcurrencyPolicy::RowVersionBased)]
    fn test_matching_versions_validate(#[case] policy: ConcurrencyPolicy) {
        let detector = ConflictDetector::new(policy);
        let version = detector.initial_version();

        assert!(detector.validate(1, &version, &version).is_ok());
    }

    #[test]
    fn test_none_policy_never_conflicts() {
        let detector = ConflictDetector::new(ConcurrencyPolicy::None);

        let result = detector.validate(1, &Version::Token(0), &Version::Token(5));

        assert!(result.is_ok());
    }

    #[test]
    fn test_stale_token_conflicts() {
        let detector = ConflictDetector::new(ConcurrencyPolicy::TokenBased);

        let result = detector.validate(1, &Version::Token(0), &Version::Token(1));

        assert_eq!(
            result,
            Err(AccountError::concurrency_conflict(
                1,
                Version::Token(0),
                Version::Token(1)
            ))
        );
    }

    #[test]
    fn test_stale_row_version_conflicts() {
        let detector = ConflictDetector::new(ConcurrencyPolicy::RowVersionBased);
        let read = detector.initial_version();
        let stored = detector.next_version(1, &read).unwrap();

        let result = detector.validate(1, &read, &stored);

        assert!(matches!(
            result,
            Err(AccountError::ConcurrencyConflict { id: 1, .. })
        ));
    }

    #[test]
    fn test_wrong_kind_of_version_conflicts() {
        let detector = ConflictDetector::new(ConcurrencyPolicy::TokenBased);

        let result = detector.validate(1, &Version::Unversioned, &Version::Token(0));

        assert!(result.is_err());
    }

    #[rstest]
    #[case(ConcurrencyPolicy::None, Version::Unversioned)]
    #[case(ConcurrencyPolicy::TokenBased, Version::Token(0))]
    fn test_initial_version(#[case] policy: ConcurrencyPolicy, #[case] expected: Version) {
        assert_eq!(ConflictDetector::new(policy).initial_version(), expected);
    }

    #[test]
    fn test_token_advances_by_one() {
        let detector = ConflictDetector::new(ConcurrencyPolicy::TokenBased);

        assert_eq!(
            detector.next_version(1, &Version::Token(0)),
            Ok(Version::Token(1))
        );
        assert_eq!(
            detector.next_version(1, &Version::Token(41)),
            Ok(Version::Token(42))
        );
    }

    #[test]
    fn test_token_overflow_is_reported() {
        let detector = ConflictDetector::new(ConcurrencyPolicy::TokenBased);

        let result = detector.next_version(3, &Version::Token(u64::MAX));

        assert_eq!(result, Err(AccountError::arithmetic_overflow("token", 3)));
    }

    #[test]
    fn test_row_version_stamps_are_never_reissued() {
        let detector = ConflictDetector::new(ConcurrencyPolicy::RowVersionBased);
        let mut seen = HashSet::new();
        let mut current = detector.initial_version();
        seen.insert(current);

        for _ in 0..1000 {
            current = detector.next_version(1, &current).unwrap();
            assert!(matches!(current, Version::RowVersion(_)));
            assert!(seen.insert(current), "stamp {} issued twice", current);
        }
    }
}
