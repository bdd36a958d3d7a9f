//! GATE-1 (P4): the Execution Gate grants access in non-increasing priority
//! order; among equal priorities, in arrival order.

use super::Violation;

/// Check a `(priority, arrival)` snapshot of the gate's waiter queue, as
/// produced by [`crate::ExecutionGate::snapshot_queue`].
///
/// Priority must be non-increasing step to step; within a run of equal
/// priorities, arrival must be strictly increasing.
pub fn check(snapshot: &[(i32, u64)]) -> Result<(), Violation> {
    for (i, window) in snapshot.windows(2).enumerate() {
        let (prev_priority, prev_arrival) = window[0];
        let (priority, arrival) = window[1];
        if priority > prev_priority {
            return Err(Violation::GateOutOfOrder { position: i + 1 });
        }
        if priority == prev_priority && arrival <= prev_arrival {
            return Err(Violation::GateOutOfOrder { position: i + 1 });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descending_priority_passes() {
        let snapshot = vec![(10, 0), (5, 1), (5, 2), (1, 3)];
        assert!(check(&snapshot).is_ok());
    }

    #[test]
    fn ascending_priority_is_flagged() {
        let snapshot = vec![(1, 0), (10, 1)];
        let err = check(&snapshot).unwrap_err();
        assert_eq!(err, Violation::GateOutOfOrder { position: 1 });
    }

    #[test]
    fn out_of_order_arrival_within_a_priority_is_flagged() {
        let snapshot = vec![(5, 2), (5, 1)];
        let err = check(&snapshot).unwrap_err();
        assert_eq!(err, Violation::GateOutOfOrder { position: 1 });
    }

    #[test]
    fn empty_and_singleton_snapshots_pass() {
        assert!(check(&[]).is_ok());
        assert!(check(&[(5, 0)]).is_ok());
    }
}
