//! Domain types: candles in, signals out.

pub mod candle;
pub mod signal;

pub use candle::{validate_candles, Candle, PriceBar};
pub use signal::{Direction, Signal};
