/// Scheduled-task trigger engine
///
/// The core of the service: a periodic job that evaluates user-defined
/// conditional actions against the clock and a shared, TTL-cached price
/// sample, transitions each satisfied task exactly once via the store's
/// conditional update, and fans the result out over SSE plus a best-effort
/// email.

pub mod clock;
pub mod evaluator;
pub mod job;
pub mod oracle;

pub use clock::{Clock, SystemClock};
pub use evaluator::{should_trigger, TriggerCondition};
pub use job::{TriggerJob, NATIVE_TOKEN};
pub use oracle::{CoinGeckoFeed, PriceFeed, PriceOracle, DEFAULT_PRICE_TTL};
