use std::sync::Arc;

use scribe_api::{CommentStyle, GenerationContext};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::{CommentCache, CommentOracle, OracleError, OracleRequest, OracleResult};

/// Read-through cache in front of a [`CommentOracle`].
///
/// A miss calls the oracle exactly once; failures propagate and are never
/// cached. Concurrent misses on the same key may each call the oracle.
pub struct CommentGenerator {
    oracle: Arc<dyn CommentOracle>,
    cache: CommentCache,
}

impl CommentGenerator {
    /// Pair an oracle with a cache.
    #[must_use]
    pub fn new(oracle: Arc<dyn CommentOracle>, cache: CommentCache) -> Self {
        Self { oracle, cache }
    }

    /// The cache backing this generator.
    #[must_use]
    pub const fn cache(&self) -> &CommentCache {
        &self.cache
    }

    /// Comment text for one declaration, served from cache when possible.
    ///
    /// # Errors
    ///
    /// Propagates the oracle's [`OracleError`] on a cache miss.
    pub fn generate(
        &self,
        language: &str,
        snippet: &str,
        context: &GenerationContext,
        style: CommentStyle,
    ) -> OracleResult<String> {
        let key = content_key(snippet, context, style)?;
        if let Some(text) = self.cache.get(&key) {
            debug!(name = %context.name, "comment cache hit");
            return Ok(text);
        }

        let request = OracleRequest {
            language: language.to_owned(),
            snippet: snippet.to_owned(),
            context: context.clone(),
            style,
        };
        debug!(oracle = self.oracle.id(), name = %context.name, "comment cache miss");
        let response = self.oracle.generate(&request)?;
        self.cache.insert(key, response.text.clone());
        Ok(response.text)
    }
}

impl std::fmt::Debug for CommentGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommentGenerator")
            .field("oracle", &self.oracle.id())
            .field("cache", &self.cache)
            .finish()
    }
}

/// Lowercase hex SHA-256 of the JSON encoding of `(snippet, context, style)`.
///
/// # Errors
///
/// Returns [`OracleError::Malformed`] if the request cannot be encoded.
pub fn content_key(
    snippet: &str,
    context: &GenerationContext,
    style: CommentStyle,
) -> OracleResult<String> {
    let encoded = serde_json::to_vec(&(snippet, context, style))
        .map_err(|err| OracleError::malformed(format!("failed to encode request: {err}")))?;
    let mut hasher = Sha256::new();
    hasher.update(&encoded);
    Ok(format!("{:x}", hasher.finalize()))
}
