use std::fmt::{Debug, Display, Formatter};

/// The size of a BLAKE3 hash in bytes.
pub const BLAKE3_HASH_SIZE: usize = 32;

/// A BLAKE3 cryptographic hash.
///
/// Grant keys are built from it, so equality and hashing work directly on the
/// digest bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Blake3Hash([u8; BLAKE3_HASH_SIZE]);

impl Blake3Hash {
    /// Derives a digest in the key-derivation mode of BLAKE3, so that digests
    /// produced under different `context` strings never coincide even for the
    /// same input chunks.
    ///
    /// Chunks are hashed as one contiguous input. Callers are responsible for
    /// making the concatenation unambiguous, for example by only feeding
    /// fixed-width chunks.
    ///
    /// ```rust
    /// use delegation_common::Blake3Hash;
    ///
    /// let one = Blake3Hash::derive("example one", [b"abc".as_slice()]);
    /// let two = Blake3Hash::derive("example two", [b"abc".as_slice()]);
    /// assert_ne!(one, two);
    /// ```
    pub fn derive<'a, I>(context: &str, bytes: I) -> Self
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        let mut hasher = blake3::Hasher::new_derive_key(context);
        for chunk in bytes {
            hasher.update(chunk);
        }
        Self(hasher.finalize().into())
    }
}

impl Display for Blake3Hash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl Debug for Blake3Hash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Blake3Hash").field(&self.to_string()).finish()
    }
}
