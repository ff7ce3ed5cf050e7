pub mod bands;
pub mod threshold;

pub use bands::{apply_classification, classify_value};
pub use threshold::{apply_thresholds, Verdict};
