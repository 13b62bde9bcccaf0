// Technical indicators: the engine that appends `ta` indicators to a
// PriceSeries, plus simple returns.

pub mod engine;
pub mod returns;
