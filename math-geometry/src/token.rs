//! Identity tokens for triangles, tetrahedra, edges and faces
//!
//! Tokens are drawn eagerly from one process-wide monotonic counter when an
//! object is constructed, so they are unique without any per-object locking.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Draw the next unique identity token
pub fn next_token() -> u64 {
    NEXT_TOKEN.fetch_add(1, Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_tokens_are_unique_across_threads() {
        let tokens: Vec<u64> = (0..1000).into_par_iter().map(|_| next_token()).collect();
        let unique: HashSet<u64> = tokens.iter().copied().collect();
        assert_eq!(unique.len(), tokens.len());
    }
}
