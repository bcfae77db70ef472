//! Deterministic fingerprints for signals and configurations.
//!
//! Fields are fed to BLAKE3 length-prefixed and floats by their bit pattern,
//! so two records hash equal exactly when they are byte-identical.

/// Incremental BLAKE3 fingerprint builder.
#[derive(Debug, Clone, Default)]
pub struct Fingerprint {
    hasher: blake3::Hasher,
}

impl Fingerprint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, value: &str) -> Self {
        self.hasher.update(&(value.len() as u64).to_le_bytes());
        self.hasher.update(value.as_bytes());
        self
    }

    pub fn number(mut self, value: f64) -> Self {
        self.hasher.update(&value.to_bits().to_le_bytes());
        self
    }

    pub fn integer(mut self, value: i64) -> Self {
        self.hasher.update(&value.to_le_bytes());
        self
    }

    /// Hex digest.
    pub fn finish(self) -> String {
        self.hasher.finalize().to_hex().to_string()
    }
}
