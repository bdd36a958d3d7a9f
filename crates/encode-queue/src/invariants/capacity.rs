//! CAP-1 (I1): `|Running Set| <= concurrentEncodeNum` at all times observable
//! outside the gate.

use super::Violation;
use crate::RunningSet;

pub fn check(running: &RunningSet, concurrent_encode_num: i64) -> Result<(), Violation> {
    let limit = concurrent_encode_num.max(0) as usize;
    if running.len() > limit {
        return Err(Violation::OverCapacity {
            len: running.len(),
            limit,
        });
    }
    Ok(())
}
