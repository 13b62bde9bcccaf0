// Topic modeling: dictionary, corpus preparation, LDA training.

pub mod corpus;
pub mod dictionary;
pub mod lda;
pub mod traits;
