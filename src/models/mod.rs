pub mod history;
pub mod prediction;

pub use history::HistoryEntry;
pub use prediction::{ClassScore, PredictionResult};
