/// Condition code encoding and comparison.
pub mod condition;
/// Word codec properties.
pub mod word;
