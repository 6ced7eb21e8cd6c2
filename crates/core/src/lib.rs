#![forbid(unsafe_code)]

//! Storage-free task model: column catalogue, values, RFC 5545 durations,
//! timezone offsets and the n-gram generator used by the search index.

pub mod duration;
pub mod model;
pub mod ngrams;
pub mod zone;
