//! Matching predicates
//!
//! Pure price-compatibility checks shared by the ladders and the book.

pub mod crossing;
