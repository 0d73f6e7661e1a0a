pub mod aggregator;
pub mod catalog;
pub mod extractor;
pub mod handlers;
pub mod normalize;
