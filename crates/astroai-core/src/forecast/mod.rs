//! Daily forecast keys, records and the offline fallback table.

mod fallback;
mod model;

pub use fallback::FallbackMessages;
pub use model::{DailyForecast, ForecastCacheEntry, ForecastKey, ForecastOrigin, ForecastSign};
