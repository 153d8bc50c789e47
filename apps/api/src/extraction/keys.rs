//! API key ring and the optional shared rotation index.

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use redis::AsyncCommands;

/// At most this many keys take part in rotation.
pub const MAX_KEYS: usize = 3;

/// Counter key holding the next starting slot.
pub const ROTATION_KEY: &str = "folio:vision:key_index";

/// Ordered API keys. Never prints the keys themselves.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct KeyRing {
    keys: Vec<String>,
}

impl KeyRing {
    /// Trims each key, drops empties and keeps the first `MAX_KEYS`.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys = keys
            .into_iter()
            .map(|k| k.as_ref().trim().to_string())
            .filter(|k| !k.is_empty())
            .take(MAX_KEYS)
            .collect();
        Self { keys }
    }

    /// Parses a comma-separated list, e.g. `"key-a, key-b"`.
    pub fn parse(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Key at `slot`, wrapping around the ring.
    pub fn get(&self, slot: usize) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }
        self.keys.get(slot % self.keys.len()).map(String::as_str)
    }
}

impl fmt::Debug for KeyRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyRing({} keys)", self.keys.len())
    }
}

/// Shared integer store for the rotation index. Reads and writes are not
/// transactional; concurrent callers may both advance the index.
#[async_trait]
pub trait RotationCounter: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<i64>>;
    async fn set(&self, key: &str, value: i64) -> Result<()>;
}

/// Rotation index kept in Redis so every instance continues the same round-robin.
pub struct RedisRotationCounter {
    client: redis::Client,
}

impl RedisRotationCounter {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RotationCounter for RedisRotationCounter {
    async fn get(&self, key: &str) -> Result<Option<i64>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let value: Option<i64> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: i64) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set::<_, _, ()>(key, value).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_drops_empties_and_caps() {
        let ring = KeyRing::parse(" a , ,b,c,d ");
        assert_eq!(ring.len(), MAX_KEYS);
        assert_eq!(ring.get(0), Some("a"));
        assert_eq!(ring.get(1), Some("b"));
        assert_eq!(ring.get(2), Some("c"));
    }

    #[test]
    fn test_get_wraps_around() {
        let ring = KeyRing::parse("a,b");
        assert_eq!(ring.get(2), Some("a"));
        assert_eq!(ring.get(5), Some("b"));
        assert_eq!(KeyRing::parse(" , ").get(0), None);
    }

    #[test]
    fn test_debug_hides_keys() {
        let ring = KeyRing::parse("sk-secret-1,sk-secret-2");
        let printed = format!("{ring:?}");
        assert_eq!(printed, "KeyRing(2 keys)");
        assert!(!printed.contains("secret"));
    }
}
