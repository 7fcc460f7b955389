use crate::error::TxError;

/// Adds `delta` to a running cost and enforces `limit`.
///
/// This is the only place in the crate where cost grows. The error reports
/// the attempted delta and the limit; an overflow of the counter is reported
/// the same way as exceeding the limit.
pub fn add_cost_limited(current: u64, delta: u64, limit: u64) -> Result<u64, TxError> {
    match current.checked_add(delta) {
        Some(v) if v <= limit => Ok(v),
        _ => Err(TxError::CostLimitExceeded {
            current,
            delta,
            limit,
        }),
    }
}

/// `count * unit_cost` with overflow detection, for fixed per-item costs.
/// The result is not limit-checked; it is meant to be fed to
/// `add_cost_limited`.
pub fn mul_cost(count: usize, unit_cost: u64) -> Result<u64, TxError> {
    let count = u64::try_from(count).map_err(|_| TxError::CostOverflow {
        count: u64::MAX,
        unit: unit_cost,
    })?;
    count
        .checked_mul(unit_cost)
        .ok_or(TxError::CostOverflow {
            count,
            unit: unit_cost,
        })
}

/// Running cost of one reduce or sign call, relative to a caller-supplied base.
///
/// A block validator threads cumulative cost across transactions by passing
/// the previous total as `base`; `spent()` reports only what this call added.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CostAccumulator {
    base: u64,
    current: u64,
    limit: u64,
}

impl CostAccumulator {
    pub fn new(base: u64, limit: u64) -> Result<Self, TxError> {
        if base > limit {
            return Err(TxError::CostLimitExceeded {
                current: base,
                delta: 0,
                limit,
            });
        }
        Ok(Self {
            base,
            current: base,
            limit,
        })
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    pub fn current(&self) -> u64 {
        self.current
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn spent(&self) -> u64 {
        self.current - self.base
    }

    pub fn add(&mut self, delta: u64) -> Result<u64, TxError> {
        self.current = add_cost_limited(self.current, delta, self.limit)?;
        Ok(self.current)
    }

    /// Moves to a cumulative-inclusive total reported by a collaborator that
    /// was handed `current()` as its starting cost.
    ///
    /// The total must not fall below `current()`; the step is routed through
    /// `add_cost_limited` so the limit check is the same as for `add`.
    pub fn advance_to(&mut self, total: u64) -> Result<u64, TxError> {
        let Some(delta) = total.checked_sub(self.current) else {
            return Err(TxError::StructuralMismatch(format!(
                "reported cumulative cost {total} is below running cost {}",
                self.current
            )));
        };
        self.add(delta)
    }
}

#[cfg(kani)]
mod verification {
    use super::*;

    /// A successful add never exceeds the limit and never decreases the cost.
    #[kani::proof]
    fn verify_add_cost_limited_bounds() {
        let current: u64 = kani::any();
        let delta: u64 = kani::any();
        let limit: u64 = kani::any();
        if let Ok(v) = add_cost_limited(current, delta, limit) {
            assert!(v <= limit);
            assert!(v >= current);
            assert_eq!(v - current, delta);
        }
    }

    /// add_cost_limited never panics, including on overflow.
    #[kani::proof]
    fn verify_add_cost_limited_no_panic() {
        let current: u64 = kani::any();
        let delta: u64 = kani::any();
        let limit: u64 = kani::any();
        let _ = add_cost_limited(current, delta, limit);
    }

    #[kani::proof]
    fn verify_accumulator_spent_matches_adds() {
        let base: u64 = kani::any();
        let limit: u64 = kani::any();
        let a: u64 = kani::any();
        let b: u64 = kani::any();
        if let Ok(mut acc) = CostAccumulator::new(base, limit) {
            if acc.add(a).is_ok() && acc.add(b).is_ok() {
                assert_eq!(acc.spent(), a + b);
            }
        }
    }
}
