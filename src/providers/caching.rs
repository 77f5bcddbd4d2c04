use crate::core::error::{InvoiceError, Result};
use crate::core::rates::{ExchangeRateProvider, RateQuery};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

type RatesResult = std::result::Result<HashMap<String, f64>, String>;

/// Memoizes rate lookups per query, failures included.
#[derive(Clone)]
pub struct CachingRateProvider<T: ExchangeRateProvider> {
    inner: T,
    cache: Arc<Mutex<HashMap<RateQuery, RatesResult>>>,
}

impl<T: ExchangeRateProvider> CachingRateProvider<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl<T: ExchangeRateProvider> ExchangeRateProvider for CachingRateProvider<T> {
    async fn fetch_rates(&self, query: &RateQuery) -> Result<HashMap<String, f64>> {
        let mut cache = self.cache.lock().await;
        if let Some(cached_result) = cache.get(query) {
            debug!("Cache hit for rates: {}", query.symbols());
            return cached_result.clone().map_err(InvoiceError::RateService);
        }
        debug!("Cache miss for rates: {}", query.symbols());
        let result = self.inner.fetch_rates(query).await;
        let cached = match &result {
            Ok(rates) => Ok(rates.clone()),
            Err(e) => Err(e.to_string()),
        };
        cache.insert(query.clone(), cached);
        result
    }
}
