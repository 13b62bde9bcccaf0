// Text helpers: cleaning, stopwords, publisher domains, news CSV input.

pub mod clean;
pub mod news;
pub mod publisher;
pub mod stopwords;
