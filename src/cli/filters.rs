//! Filter enums shared by list commands

use clap::ValueEnum;

use crate::core::entity::Status;
use crate::core::evaluator::{Disposition, TestType};

/// Status filter for reference data lists
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// Active entries only - default
    #[default]
    Active,
    /// Inactive entries only
    Inactive,
    /// Everything
    All,
}

impl StatusFilter {
    pub fn matches(&self, status: &Status) -> bool {
        match self {
            StatusFilter::Active => *status == Status::Active,
            StatusFilter::Inactive => *status == Status::Inactive,
            StatusFilter::All => true,
        }
    }
}

/// Disposition filter for drop test lists
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum DispositionFilter {
    InProgress,
    Accept,
    Retest,
    Reject,
    /// Anything but in-progress
    Decided,
    /// All dispositions - default
    #[default]
    All,
}

impl DispositionFilter {
    pub fn matches(&self, disposition: &Disposition) -> bool {
        match self {
            DispositionFilter::InProgress => *disposition == Disposition::InProgress,
            DispositionFilter::Accept => *disposition == Disposition::Accept,
            DispositionFilter::Retest => *disposition == Disposition::Retest,
            DispositionFilter::Reject => *disposition == Disposition::Reject,
            DispositionFilter::Decided => *disposition != Disposition::InProgress,
            DispositionFilter::All => true,
        }
    }
}

/// Test type filter for drop test lists
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum TestTypeFilter {
    RegularRun,
    Retest,
}

impl TestTypeFilter {
    pub fn matches(&self, test_type: &TestType) -> bool {
        match self {
            TestTypeFilter::RegularRun => *test_type == TestType::RegularRun,
            TestTypeFilter::Retest => *test_type == TestType::Retest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_filter() {
        assert!(StatusFilter::Active.matches(&Status::Active));
        assert!(!StatusFilter::Active.matches(&Status::Inactive));
        assert!(StatusFilter::All.matches(&Status::Inactive));
    }

    #[test]
    fn test_disposition_filter() {
        assert!(DispositionFilter::Decided.matches(&Disposition::Retest));
        assert!(!DispositionFilter::Decided.matches(&Disposition::InProgress));
        assert!(DispositionFilter::InProgress.matches(&Disposition::InProgress));
        assert!(DispositionFilter::All.matches(&Disposition::Accept));
        assert!(DispositionFilter::Decided.matches(&Disposition::Reject));
        assert!(DispositionFilter::Reject.matches(&Disposition::Reject));
        assert!(!DispositionFilter::Retest.matches(&Disposition::Reject));
    }

    #[test]
    fn test_test_type_filter() {
        assert!(TestTypeFilter::Retest.matches(&TestType::Retest));
        assert!(!TestTypeFilter::Retest.matches(&TestType::RegularRun));
        assert!(TestTypeFilter::RegularRun.matches(&TestType::RegularRun));
    }
}
