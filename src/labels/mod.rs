//! Classifier label parsing and the static lookup tables behind it.

pub mod advice;
mod parse;
pub mod tables;

pub use advice::{advice_for, DiseaseAdvice};
pub use parse::{humanize, parse_label, ParsedLabel};
