// Copyright 2024-2026 ImageGate Contributors
// Licensed under the Apache License, Version 2.0

use rand::Rng;

/// Drawn seeds fall in `0..SEED_SPACE` so they round-trip through 32-bit
/// generator APIs unchanged.
pub const SEED_SPACE: u64 = 1 << 32;

/// Draw a fresh seed.
pub fn random_seed() -> u64 {
    rand::thread_rng().gen_range(0..SEED_SPACE)
}

/// Use the requested seed, or draw one when none was given.
pub fn resolve_seed(requested: Option<u64>) -> u64 {
    requested.unwrap_or_else(random_seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requested_seed_is_kept() {
        assert_eq!(resolve_seed(Some(42)), 42);
        assert_eq!(resolve_seed(Some(u64::MAX)), u64::MAX);
    }

    #[test]
    fn drawn_seeds_stay_in_range() {
        for _ in 0..1000 {
            assert!(resolve_seed(None) < SEED_SPACE);
        }
    }
}
