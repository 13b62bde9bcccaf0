// Tickertape: price indicators and news headline analysis.
//
// This is the library root. `prices` and `indicators` form the price
// pipeline; `text`, `topics` and `sentiment` form the headline pipeline.
// The two share nothing but the error type.

pub mod config;
pub mod error;
pub mod indicators;
pub mod output;
pub mod prices;
pub mod sentiment;
pub mod text;
pub mod topics;
