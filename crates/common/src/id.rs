//! ID generation utilities.

use std::sync::{Arc, Mutex};

use ulid::Generator;

use crate::error::{AppError, AppResult};

/// Monotonic ULID generator for message identifiers.
///
/// ULIDs are:
/// - Lexicographically sortable
/// - Strictly increasing within the same millisecond (monotonic random tail)
/// - Shorter than UUIDs when represented as strings
///
/// The generator state is shared behind a mutex so that every identifier
/// produced by one process is strictly greater than all of its predecessors,
/// which is what makes the identifier usable as a pagination cursor.
#[derive(Clone)]
pub struct IdGenerator {
    generator: Arc<Mutex<Generator>>,
}

impl std::fmt::Debug for IdGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdGenerator").finish_non_exhaustive()
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            generator: Arc::new(Mutex::new(Generator::new())),
        }
    }

    /// Generate a new ULID-based ID.
    ///
    /// Fails only if the monotonic random tail overflows within a single
    /// millisecond or the generator mutex is poisoned; both are fatal since
    /// no ordering guarantee can be given afterwards.
    pub fn generate(&self) -> AppResult<String> {
        let mut generator = self
            .generator
            .lock()
            .map_err(|_| AppError::Internal("ULID generator mutex poisoned".to_string()))?;

        let ulid = generator
            .generate()
            .map_err(|e| AppError::Internal(format!("ULID generation failed: {e}")))?;

        Ok(ulid.to_string().to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_ulid_shape() {
        let id_gen = IdGenerator::new();
        let id = id_gen.generate().unwrap();

        assert_eq!(id.len(), 26);
        assert!(id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_generate_strictly_increasing() {
        let id_gen = IdGenerator::new();

        // Rapid calls land in the same millisecond; the monotonic tail must
        // still keep them strictly ordered.
        let ids: Vec<String> = (0..1000)
            .map(|_| id_gen.generate().unwrap())
            .collect();

        for pair in ids.windows(2) {
            assert!(pair[0] < pair[1], "{} !< {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_clones_share_monotonic_state() {
        let id_gen = IdGenerator::new();
        let other = id_gen.clone();

        let a = id_gen.generate().unwrap();
        let b = other.generate().unwrap();
        assert!(a < b);
    }
}
