//! API key generation

use rand::Rng;

const KEY_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Default number of random characters after the prefix
pub const DEFAULT_KEY_LENGTH: usize = 32;

/// Generator for opaque API keys
#[derive(Debug, Clone)]
pub struct ApiKeyGenerator {
    /// Prefix for all generated keys (e.g., "dk_live_", "dk_test_")
    prefix: String,
    /// Number of random characters
    length: usize,
}

impl ApiKeyGenerator {
    /// Create a new API key generator
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            length: DEFAULT_KEY_LENGTH,
        }
    }

    /// Create a generator for production keys
    pub fn production() -> Self {
        Self::new("dk_live_")
    }

    /// Create a generator for test keys
    pub fn test() -> Self {
        Self::new("dk_test_")
    }

    /// Set the number of random characters
    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Generate a new API key
    pub fn generate(&self) -> String {
        let mut rng = rand::thread_rng();
        let random: String = (0..self.length)
            .map(|_| KEY_ALPHABET[rng.gen_range(0..KEY_ALPHABET.len())] as char)
            .collect();

        format!("{}{}", self.prefix, random)
    }
}

impl Default for ApiKeyGenerator {
    fn default() -> Self {
        Self::production()
    }
}
