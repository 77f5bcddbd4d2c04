pub mod caching;
pub mod exchangerates_api;

pub use caching::CachingRateProvider;
pub use exchangerates_api::ExchangeRatesApiProvider;
