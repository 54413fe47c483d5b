use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use digipost_lookup::LookupError;
use digipost_lookup::LookupConfig;
use digipost_lookup::identifier::ValidIdentifier;
use digipost_lookup::registry::{Channel, LookupFuture, RegistryClient};

/// In-memory registry with scripted answers, delays and failures
///
/// Tracks every identifier it is asked about and the highest number of
/// lookups it saw in flight at once.
#[derive(Debug, Default)]
pub struct ScriptedRegistry {
    registered: HashSet<String>,
    failures: HashMap<String, LookupError>,
    delays: HashMap<String, Duration>,
    default_delay: Duration,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer "registered" for these identifiers
    #[must_use]
    pub fn registered<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.registered.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Fail the lookup of `id` with `error`
    #[must_use]
    pub fn failing(mut self, id: &str, error: LookupError) -> Self {
        self.failures.insert(id.to_string(), error);
        self
    }

    /// Delay the answer for `id`
    #[must_use]
    pub fn delayed(mut self, id: &str, delay: Duration) -> Self {
        self.delays.insert(id.to_string(), delay);
        self
    }

    /// Delay every answer without an explicit delay
    #[must_use]
    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    /// Identifiers looked up so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl RegistryClient for ScriptedRegistry {
    fn is_registered<'a>(
        &'a self,
        identifier: &'a ValidIdentifier,
        _channel: Channel,
    ) -> LookupFuture<'a> {
        Box::pin(async move {
            let key = identifier.as_str().to_string();
            self.calls.lock().unwrap().push(key.clone());

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            let delay = self.delays.get(&key).copied().unwrap_or(self.default_delay);
            tokio::time::sleep(delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            match self.failures.get(&key) {
                Some(error) => Err(error.clone()),
                None => Ok(self.registered.contains(&key)),
            }
        })
    }
}

/// A valid CPR number for every `i` below 33 600, with leading zeros for
/// days 1-9
#[must_use]
pub fn cpr(i: usize) -> String {
    let day = i % 28 + 1;
    let month = (i / 28) % 12 + 1;
    let yy = (i / 336) % 100;
    let serial_digit = i % 4;
    format!("{day:02}{month:02}{yy:02}{serial_digit}{:03}", i % 1000)
}

/// `n` distinct valid CPR numbers
#[must_use]
pub fn cprs(n: usize) -> Vec<String> {
    (0..n).map(cpr).collect()
}

/// Lookup configuration for tests: no progress bar
#[must_use]
pub fn test_config() -> LookupConfig {
    LookupConfig::default().with_progress(false)
}
