pub mod allocator;
pub mod exact;
pub mod fuzzy;
pub mod manager;
pub mod merge;
pub mod normalize;
pub mod similarity;
