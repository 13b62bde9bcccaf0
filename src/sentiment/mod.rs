// Sentiment scoring: lexicon-based polarity for raw headlines.

pub mod traits;
pub mod vader;
