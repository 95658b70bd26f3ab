//! Content hashing with FxHash.
//!
//! Used to tell a real template edit from a save that left the file
//! unchanged.

use rustc_hash::FxHasher;
use std::hash::Hasher;

/// Compute a 64-bit hash of byte data.
#[inline]
pub fn compute<T: AsRef<[u8]> + ?Sized>(data: &T) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(data.as_ref());
    hasher.finish()
}
