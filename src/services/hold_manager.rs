//! Hold manager
//!
//! A TTL-bounded exclusive claim on `(cabinId, checkInDate, checkOutDate)`
//! backed by Redis, with an in-process fallback map for when Redis is
//! unreachable. Grounded on `examples/original_source/src/hold.py`
//! (`HoldManager`) for the key scheme, TTL default, and degraded-mode
//! behavior — but `create_hold` uses [`crate::redis::RedisManager::set_nx_ex`]
//! (an atomic `SET NX EX`) instead of the source's racy GET-then-SETEX, since
//! that race is exactly what the hold exists to prevent.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::hold::{Hold, HoldStatus};
use crate::redis::RedisManager;

/// Wire shape stored in Redis under both the primary and by-id keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredHold {
    id: Uuid,
    cabin_id: String,
    check_in_date: NaiveDate,
    check_out_date: NaiveDate,
    customer_id: Option<Uuid>,
    customer_name: Option<String>,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl From<StoredHold> for Hold {
    fn from(s: StoredHold) -> Self {
        Hold {
            id: s.id,
            cabin_id: s.cabin_id,
            check_in_date: s.check_in_date,
            check_out_date: s.check_out_date,
            customer_id: s.customer_id,
            customer_name: s.customer_name,
            status: HoldStatus::Active,
            created_at: s.created_at,
            expires_at: s.expires_at,
        }
    }
}

/// In-process fallback store used only when Redis is unreachable. Explicitly
/// non-authoritative across instances — see `SPEC_FULL.md` §4.C.
static FALLBACK: Lazy<Mutex<HashMap<String, StoredHold>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Result of a successful `create_hold` call, distinguishing the normal path
/// from the degraded in-process fallback.
pub struct CreatedHold {
    pub hold: Hold,
    pub warning: Option<String>,
}

pub struct HoldManager {
    redis: RedisManager,
    ttl_secs: u64,
}

impl HoldManager {
    pub fn new(connection: ConnectionManager, ttl_secs: u64) -> Self {
        Self {
            redis: RedisManager::from_connection_manager(connection),
            ttl_secs,
        }
    }

    fn primary_key(cabin_id: &str, check_in: NaiveDate, check_out: NaiveDate) -> String {
        Hold::primary_key(cabin_id, check_in, check_out)
    }

    /// Creates a hold, failing with [`AppError::HoldAlreadyExists`] if one is
    /// already active for the same key. Degrades to the in-process map (with
    /// a `warning`) if Redis is unreachable.
    pub async fn create_hold(
        &mut self,
        cabin_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
        customer_id: Option<Uuid>,
        customer_name: Option<String>,
    ) -> AppResult<CreatedHold> {
        let primary_key = Self::primary_key(cabin_id, check_in, check_out);
        let now = Utc::now();
        let expires_at = now + chrono::Duration::seconds(self.ttl_secs as i64);
        let id = Uuid::new_v4();

        let stored = StoredHold {
            id,
            cabin_id: cabin_id.to_string(),
            check_in_date: check_in,
            check_out_date: check_out,
            customer_id,
            customer_name,
            created_at: now,
            expires_at,
        };

        match self.try_create_in_redis(&primary_key, &stored).await {
            Ok(true) => Ok(CreatedHold {
                hold: stored.into(),
                warning: None,
            }),
            Ok(false) => {
                // Someone else holds this key; surface their expiry.
                let existing = self.redis.get_json::<StoredHold>(&primary_key).await.ok().flatten();
                let expires_at = existing.map(|h| h.expires_at).unwrap_or(expires_at);
                tracing::info!(
                    cabin = cabin_id,
                    check_in = %check_in,
                    check_out = %check_out,
                    expires_at = %expires_at,
                    "hold creation lost the race"
                );
                Err(AppError::Conflict(format!(
                    "Cabin {cabin_id} is already on hold until {expires_at}"
                )))
            },
            Err(redis_err) => {
                tracing::warn!(
                    error = %redis_err,
                    "redis unavailable, falling back to in-process hold map"
                );
                let mut map = FALLBACK.lock().await;
                sweep_expired(&mut map);
                if map.contains_key(&primary_key) {
                    return Err(AppError::HoldAlreadyExists);
                }
                map.insert(primary_key, stored.clone());
                Ok(CreatedHold {
                    hold: stored.into(),
                    warning: Some("Redis unavailable - hold not protected".to_string()),
                })
            },
        }
    }

    /// Attempts the atomic Redis path. `Ok(true)` = won the claim, `Ok(false)`
    /// = lost the race, `Err` = Redis itself is unreachable (caller degrades).
    async fn try_create_in_redis(
        &mut self,
        primary_key: &str,
        stored: &StoredHold,
    ) -> anyhow::Result<bool> {
        let payload = serde_json::to_string(stored)?;
        let won = self
            .redis
            .set_nx_ex(primary_key, &payload, self.ttl_secs)
            .await?;
        if won {
            let by_id_key = Hold::by_id_key(stored.id);
            self.redis.set_ex(&by_id_key, primary_key, self.ttl_secs).await?;
        }
        Ok(won)
    }

    /// O(1) lookup by hold id via the secondary key.
    pub async fn get_hold(&mut self, id: Uuid) -> AppResult<Option<Hold>> {
        let by_id_key = Hold::by_id_key(id);
        match self.redis.get(&by_id_key).await {
            Ok(Some(primary_key)) => {
                let stored: Option<StoredHold> = self.redis.get_json(&primary_key).await.unwrap_or(None);
                Ok(stored.map(Into::into))
            },
            Ok(None) => Ok(self.get_hold_fallback(id).await),
            Err(_) => Ok(self.get_hold_fallback(id).await),
        }
    }

    async fn get_hold_fallback(&self, id: Uuid) -> Option<Hold> {
        let mut map = FALLBACK.lock().await;
        sweep_expired(&mut map);
        map.values().find(|h| h.id == id).cloned().map(Into::into)
    }

    pub async fn check_hold_exists(
        &mut self,
        cabin_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> bool {
        let key = Self::primary_key(cabin_id, check_in, check_out);
        if let Ok(exists) = self.redis.exists(&key).await {
            if exists {
                return true;
            }
        }
        let mut map = FALLBACK.lock().await;
        sweep_expired(&mut map);
        map.contains_key(&key)
    }

    /// Loads a hold by id and verifies it belongs to `cabin_id`/`check_in`/`check_out`.
    pub async fn get_hold_for_commit(
        &mut self,
        id: Uuid,
        cabin_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> AppResult<Hold> {
        let hold = self
            .get_hold(id)
            .await?
            .ok_or_else(|| AppError::HoldNotFound(id.to_string()))?;

        if hold.is_expired() {
            return Err(AppError::HoldNotFound(id.to_string()));
        }
        if hold.cabin_id != cabin_id || hold.check_in_date != check_in || hold.check_out_date != check_out
        {
            return Err(AppError::HoldMismatch);
        }
        Ok(hold)
    }

    /// Deletes both keys for `id`. Idempotent — returns `true` only the first time.
    pub async fn release_hold(&mut self, id: Uuid) -> bool {
        let by_id_key = Hold::by_id_key(id);
        let primary_key = match self.redis.get(&by_id_key).await {
            Ok(Some(k)) => Some(k),
            _ => None,
        };

        let mut released = false;
        if let Some(primary_key) = primary_key {
            released |= self.redis.delete(&primary_key).await.unwrap_or(false);
            released |= self.redis.delete(&by_id_key).await.unwrap_or(false);
        }

        let mut map = FALLBACK.lock().await;
        if let Some(key) = map
            .iter()
            .find(|(_, h)| h.id == id)
            .map(|(k, _)| k.clone())
        {
            map.remove(&key);
            released = true;
        }

        released
    }

    /// Releases a hold by its composite key rather than its id.
    pub async fn release_hold_by_dates(
        &mut self,
        cabin_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> bool {
        let primary_key = Self::primary_key(cabin_id, check_in, check_out);
        let stored: Option<StoredHold> = self.redis.get_json(&primary_key).await.unwrap_or(None);

        let mut released = false;
        if let Some(stored) = stored {
            released |= self.redis.delete(&primary_key).await.unwrap_or(false);
            released |= self
                .redis
                .delete(&Hold::by_id_key(stored.id))
                .await
                .unwrap_or(false);
        }

        let mut map = FALLBACK.lock().await;
        released |= map.remove(&primary_key).is_some();
        released
    }

    /// Releases the hold and records a 24h diagnostic `converted` marker.
    pub async fn convert_hold_to_booking(&mut self, id: Uuid, booking_id: Uuid) -> bool {
        let hold = match self.get_hold(id).await {
            Ok(Some(h)) => h,
            _ => return false,
        };

        self.release_hold(id).await;

        let marker_key = Hold::converted_marker_key(id);
        let marker = serde_json::json!({
            "hold_id": id,
            "booking_id": booking_id,
            "converted_at": Utc::now(),
        });
        if let Ok(payload) = serde_json::to_string(&marker) {
            let _ = self.redis.set_ex(&marker_key, &payload, 86_400).await;
        }

        let _ = hold;
        true
    }

    /// All active (non-expired) holds across Redis and the fallback map, for
    /// operator visibility.
    pub async fn list_active_holds(&mut self) -> Vec<Hold> {
        let mut holds = Vec::new();

        if let Ok(keys) = self.redis.scan_keys("hold:*").await {
            for key in keys {
                if key.starts_with("hold:by-id:") || key.starts_with("hold:converted:") {
                    continue;
                }
                if let Ok(Some(stored)) = self.redis.get_json::<StoredHold>(&key).await {
                    holds.push(Hold::from(stored));
                }
            }
        }

        let mut map = FALLBACK.lock().await;
        sweep_expired(&mut map);
        holds.extend(map.values().cloned().map(Into::into));
        holds
    }
}

fn sweep_expired(map: &mut HashMap<String, StoredHold>) {
    let now = Utc::now();
    map.retain(|_, h| h.expires_at > now);
}

/// Convenience constructor mirroring the source's `get_hold_manager()`
/// process-wide singleton, but scoped per-request against the shared
/// connection manager rather than a global client.
pub fn hold_manager_for(connection: ConnectionManager, ttl_secs: u64) -> Arc<Mutex<HoldManager>> {
    Arc::new(Mutex::new(HoldManager::new(connection, ttl_secs)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_key_matches_hold_model() {
        let key = HoldManager::primary_key(
            "ZB01",
            "2026-03-10".parse().unwrap(),
            "2026-03-12".parse().unwrap(),
        );
        assert_eq!(key, "hold:ZB01:2026-03-10:2026-03-12");
    }

    #[tokio::test]
    async fn sweep_expired_drops_past_entries() {
        let mut map = HashMap::new();
        map.insert(
            "hold:ZB01:2026-01-01:2026-01-02".to_string(),
            StoredHold {
                id: Uuid::new_v4(),
                cabin_id: "ZB01".to_string(),
                check_in_date: "2026-01-01".parse().unwrap(),
                check_out_date: "2026-01-02".parse().unwrap(),
                customer_id: None,
                customer_name: None,
                created_at: Utc::now() - chrono::Duration::seconds(2000),
                expires_at: Utc::now() - chrono::Duration::seconds(1000),
            },
        );
        sweep_expired(&mut map);
        assert!(map.is_empty());
    }
}
