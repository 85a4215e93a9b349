//! Capability table and section gating.
//!
//! Every protected action is resolved by a single `match` on the action and
//! the caller's role, producing a [`Policy`]. Services gather the facts the
//! policy needs (ownership, purchase, unlock state) and ask it for a verdict.

use super::user::UserRole;

/// Protected operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Read a section, its lessons and its questions
    ViewSection,
    /// Submit or reset quiz answers in a section
    AnswerQuiz,
    /// Mark lessons finished or unfinished
    TrackLesson,
    /// Read the caller's own course progress
    ViewProgress,
    /// Create or edit course content
    ManageCourse,
    /// Create, change or remove a rating
    RateCourse,
    /// Buy courses
    Checkout,
    /// Read an instructor's earnings
    ViewEarnings,
    /// Settle a pending order
    SettlePayment,
}

/// Requirement an action places on the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Allow,
    Deny,
    /// Caller owns the course
    Owner,
    /// Caller holds a completed purchase of the course
    Purchased,
    /// Purchased and the section is unlocked for the caller
    PurchasedAndUnlocked,
    /// Owner, or purchased and unlocked
    OwnerOrPurchasedAndUnlocked,
    /// Owner, or purchased
    OwnerOrPurchased,
}

/// Facts about the caller relative to the target resource
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessFacts {
    pub is_owner: bool,
    pub has_purchase: bool,
    pub section_unlocked: bool,
}

impl Policy {
    pub fn permits(&self, facts: &AccessFacts) -> bool {
        match self {
            Policy::Allow => true,
            Policy::Deny => false,
            Policy::Owner => facts.is_owner,
            Policy::Purchased => facts.has_purchase,
            Policy::PurchasedAndUnlocked => facts.has_purchase && facts.section_unlocked,
            Policy::OwnerOrPurchasedAndUnlocked => {
                facts.is_owner || (facts.has_purchase && facts.section_unlocked)
            }
            Policy::OwnerOrPurchased => facts.is_owner || facts.has_purchase,
        }
    }
}

/// The capability table.
pub fn policy(action: Action, role: UserRole) -> Policy {
    use Action::*;
    use UserRole::*;

    match (action, role) {
        (ViewSection | AnswerQuiz, Admin) => Policy::Allow,
        (ViewSection | AnswerQuiz, Instructor) => Policy::OwnerOrPurchasedAndUnlocked,
        (ViewSection | AnswerQuiz, Student) => Policy::PurchasedAndUnlocked,

        (TrackLesson, Admin) => Policy::Deny,
        (TrackLesson, Instructor) => Policy::OwnerOrPurchasedAndUnlocked,
        (TrackLesson, Student) => Policy::PurchasedAndUnlocked,

        (ViewProgress, Admin) => Policy::Deny,
        (ViewProgress, Instructor) => Policy::OwnerOrPurchased,
        (ViewProgress, Student) => Policy::Purchased,

        (ManageCourse, Admin) => Policy::Allow,
        (ManageCourse, Instructor) => Policy::Owner,
        (ManageCourse, Student) => Policy::Deny,

        (RateCourse, Admin) => Policy::Deny,
        (RateCourse, Instructor | Student) => Policy::Purchased,

        (Checkout, Admin) => Policy::Deny,
        (Checkout, Instructor | Student) => Policy::Allow,

        (ViewEarnings, Admin) => Policy::Allow,
        (ViewEarnings, Instructor) => Policy::Owner,
        (ViewEarnings, Student) => Policy::Deny,

        (SettlePayment, Admin) => Policy::Allow,
        (SettlePayment, Instructor | Student) => Policy::Deny,
    }
}

/// Evaluate an action for a role against gathered facts.
pub fn is_permitted(action: Action, role: UserRole, facts: &AccessFacts) -> bool {
    policy(action, role).permits(facts)
}

/// A section is unlocked when it is the default, has no predecessor, or the
/// caller passed the quiz of the immediately preceding section.
pub fn section_unlocked(is_default: bool, has_predecessor: bool, previous_passed: bool) -> bool {
    is_default || !has_predecessor || previous_passed
}
