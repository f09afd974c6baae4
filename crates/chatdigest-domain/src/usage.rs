//! Token usage accounting for LLM calls

use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Token counters reported by an LLM provider
///
/// `total_tokens` is whatever the provider reported; it is never recomputed
/// from the other two fields. Addition saturates at `u64::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens consumed by the prompt
    pub prompt_tokens: u64,

    /// Tokens produced in the completion
    pub completion_tokens: u64,

    /// Total as reported by the provider
    pub total_tokens: u64,
}

impl TokenUsage {
    /// Create a usage record
    pub fn new(prompt_tokens: u64, completion_tokens: u64, total_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens,
        }
    }

    /// Zero usage, returned by every degraded path
    pub fn zero() -> Self {
        Self::default()
    }

    /// Whether all counters are zero
    pub fn is_zero(&self) -> bool {
        *self == Self::zero()
    }
}

impl Add for TokenUsage {
    type Output = TokenUsage;

    fn add(self, rhs: TokenUsage) -> TokenUsage {
        TokenUsage {
            prompt_tokens: self.prompt_tokens.saturating_add(rhs.prompt_tokens),
            completion_tokens: self.completion_tokens.saturating_add(rhs.completion_tokens),
            total_tokens: self.total_tokens.saturating_add(rhs.total_tokens),
        }
    }
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: TokenUsage) {
        *self = *self + rhs;
    }
}

impl Sum for TokenUsage {
    fn sum<I: Iterator<Item = TokenUsage>>(iter: I) -> Self {
        iter.fold(TokenUsage::zero(), Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_total_is_not_recomputed() {
        let usage = TokenUsage::new(10, 5, 99);
        assert_eq!(usage.total_tokens, 99);
    }

    #[test]
    fn test_sum_with_zeros() {
        let total: TokenUsage = [TokenUsage::zero(), TokenUsage::new(3, 4, 7), TokenUsage::zero()]
            .into_iter()
            .sum();
        assert_eq!(total, TokenUsage::new(3, 4, 7));
        assert!(TokenUsage::zero().is_zero());
    }

    #[test]
    fn test_addition_saturates() {
        let huge = TokenUsage::new(u64::MAX, 1, u64::MAX - 1);
        let total: TokenUsage = [huge, TokenUsage::new(5, 2, 5)].into_iter().sum();
        assert_eq!(total, TokenUsage::new(u64::MAX, 3, u64::MAX));
    }

    proptest! {
        #[test]
        fn prop_sum_is_fieldwise(a in 0u64..1_000_000, b in 0u64..1_000_000, c in 0u64..1_000_000) {
            let mut acc = TokenUsage::zero();
            acc += TokenUsage::new(a, b, c);
            acc += TokenUsage::new(c, a, b);
            prop_assert_eq!(acc, TokenUsage::new(a + c, b + a, c + b));
        }
    }
}
