//! Verification cookie generation.
//!
//! A cookie is a random integer the push server can only know by actually
//! receiving it over the channel under test. The threat model is
//! misconfiguration, so the thread RNG is plenty.

use std::fmt;

use rand::Rng;
use serde::Serialize;

use crate::constants::COOKIE_MAX;

/// Random token used to prove a channel carries a value end to end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Cookie(i64);

impl Cookie {
    /// Draws a cookie uniformly from `1..=2^30` using the thread RNG.
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::rng())
    }

    /// Draws a cookie from the given RNG.
    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.random_range(1..=COOKIE_MAX))
    }

    /// Wraps a known value, e.g. when a test needs a predictable cookie.
    pub fn from_value(value: i64) -> Self {
        Self(value)
    }

    /// The integer value.
    pub fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generated_cookies_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10_000 {
            let cookie = Cookie::generate_with(&mut rng);
            assert!((1..=COOKIE_MAX).contains(&cookie.value()));
        }
    }

    #[test]
    fn test_generated_cookies_vary() {
        let mut rng = StdRng::seed_from_u64(42);
        let first = Cookie::generate_with(&mut rng);
        let distinct = (0..32)
            .map(|_| Cookie::generate_with(&mut rng))
            .any(|c| c != first);
        assert!(distinct, "32 draws should not all repeat the first cookie");
    }

    #[test]
    fn test_display_is_plain_integer() {
        assert_eq!(Cookie::from_value(123_456).to_string(), "123456");
    }
}
