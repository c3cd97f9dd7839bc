use chrono::Utc;
use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::models::EnrichedRecord;

pub const SESSION_COOKIE: &str = "fencelink_session";

const SESSION_TTL_SECS: i64 = 60 * 60;
const MAX_SESSION_ENTRIES: usize = 10_000;

static MINT_COUNTER: AtomicU64 = AtomicU64::new(0);

struct SessionEntry {
    rows: Vec<EnrichedRecord>,
    touched: i64,
}

/// Per-session buffer holding the most recently aggregated record set,
/// so a later export request can replay it without resubmission.
/// Entries expire on a TTL and the map is capped to bound memory.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<String, SessionEntry>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the session's buffered rows with the latest result set.
    pub async fn store(&self, session_id: &str, rows: Vec<EnrichedRecord>) {
        let now = Utc::now().timestamp();
        let mut guard = self.inner.lock().await;
        guard.retain(|_, entry| now - entry.touched <= SESSION_TTL_SECS);
        if guard.len() > MAX_SESSION_ENTRIES {
            guard.clear();
        }
        guard.insert(
            session_id.to_string(),
            SessionEntry { rows, touched: now },
        );
    }

    /// Returns the buffered rows for the session, refreshing its TTL.
    pub async fn fetch(&self, session_id: &str) -> Option<Vec<EnrichedRecord>> {
        let now = Utc::now().timestamp();
        let mut guard = self.inner.lock().await;
        if guard
            .get(session_id)
            .is_some_and(|entry| now - entry.touched > SESSION_TTL_SECS)
        {
            guard.remove(session_id);
            return None;
        }
        let entry = guard.get_mut(session_id)?;
        entry.touched = now;
        Some(entry.rows.clone())
    }
}

/// Mints an opaque session id. Unforgeability comes from the HMAC in
/// the cookie, not from the id itself; this only needs to be unique
/// within the process.
pub fn mint_session_id() -> String {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let count = MINT_COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut hasher = Sha256::new();
    hasher.update(nanos.to_be_bytes());
    hasher.update(count.to_be_bytes());
    hex::encode(&hasher.finalize()[..16])
}

/// Cookie payload: `<id>.<hex hmac-sha256 of id>`.
pub fn cookie_value(session_id: &str, secret: &str) -> String {
    format!("{session_id}.{}", sign(session_id, secret))
}

/// Checks the signature on a cookie payload and returns the session id
/// it vouches for. Tampered, truncated, or foreign-key cookies yield
/// `None`.
pub fn verify_cookie_value(value: &str, secret: &str) -> Option<String> {
    let (session_id, sig_hex) = value.rsplit_once('.')?;
    let presented = hex::decode(sig_hex).ok()?;
    let expected = hex::decode(sign(session_id, secret)).ok()?;
    if presented.len() == expected.len() && constant_time_eq(&presented, &expected) {
        Some(session_id.to_string())
    } else {
        None
    }
}

fn sign(session_id: &str, secret: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(session_id.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
