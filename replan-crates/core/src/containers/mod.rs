//! Collections shared by the engine and the model.
mod keyed_vec;

use fnv::FnvBuildHasher;
pub use keyed_vec::*;

/// A hash map with the FNV hasher, so iteration order does not vary between runs.
#[allow(clippy::disallowed_types, reason = "the deterministic alias itself")]
pub type HashMap<K, V, Hasher = FnvBuildHasher> = std::collections::HashMap<K, V, Hasher>;
/// A hash set with the FNV hasher, so iteration order does not vary between runs.
#[allow(clippy::disallowed_types, reason = "the deterministic alias itself")]
pub type HashSet<K, Hasher = FnvBuildHasher> = std::collections::HashSet<K, Hasher>;
