//! Aggregate status state machine
//!
//! The unified order status is a pure function of the item-status multiset,
//! re-evaluated after every item transition. No clock, no global state.
//!
//! ERROR is sticky: once any item has failed the order stays
//! PARTIALLY_FULFILLED even if every other item later completes. This is a
//! modeled property of the workflow, not an oversight; partial failure is
//! surfaced to the caller for manual handling instead of being masked by a
//! later COMPLETED.

use super::model::{ItemStatus, OrderStatus};

/// Compute the order status from its items' statuses.
pub fn aggregate(statuses: &[ItemStatus]) -> OrderStatus {
    if statuses.is_empty() {
        return OrderStatus::New;
    }
    if statuses.iter().any(|s| *s == ItemStatus::Error) {
        return OrderStatus::PartiallyFulfilled;
    }
    if statuses.iter().all(|s| *s == ItemStatus::Completed) {
        return OrderStatus::Completed;
    }
    if statuses
        .iter()
        .any(|s| matches!(s, ItemStatus::InProgress | ItemStatus::Requested))
    {
        return OrderStatus::PartiallyFulfilled;
    }
    OrderStatus::New
}

#[cfg(test)]
mod tests {
    use super::*;
    use ItemStatus::*;

    #[test]
    fn empty_is_new() {
        assert_eq!(aggregate(&[]), OrderStatus::New);
    }

    #[test]
    fn any_error_is_partially_fulfilled() {
        assert_eq!(aggregate(&[Error]), OrderStatus::PartiallyFulfilled);
        assert_eq!(
            aggregate(&[Completed, Error]),
            OrderStatus::PartiallyFulfilled
        );
        assert_eq!(
            aggregate(&[Error, InProgress, Requested]),
            OrderStatus::PartiallyFulfilled
        );
    }

    #[test]
    fn error_is_sticky_over_all_completed() {
        // Every sibling succeeded, one failed earlier: never COMPLETED.
        assert_eq!(
            aggregate(&[Completed, Completed, Error]),
            OrderStatus::PartiallyFulfilled
        );
    }

    #[test]
    fn all_completed_is_completed() {
        assert_eq!(aggregate(&[Completed]), OrderStatus::Completed);
        assert_eq!(aggregate(&[Completed, Completed]), OrderStatus::Completed);
    }

    #[test]
    fn pending_work_is_partially_fulfilled() {
        assert_eq!(aggregate(&[Requested]), OrderStatus::PartiallyFulfilled);
        assert_eq!(aggregate(&[InProgress]), OrderStatus::PartiallyFulfilled);
        assert_eq!(
            aggregate(&[Completed, InProgress]),
            OrderStatus::PartiallyFulfilled
        );
        assert_eq!(
            aggregate(&[Requested, InProgress]),
            OrderStatus::PartiallyFulfilled
        );
    }

    #[test]
    fn deterministic_over_repeated_calls() {
        let multiset = [Completed, Error, InProgress, Requested, Completed];
        let first = aggregate(&multiset);
        for _ in 0..100 {
            assert_eq!(aggregate(&multiset), first);
        }
    }
}
