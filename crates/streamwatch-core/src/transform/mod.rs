//! Record-level transformations applied between loading and output.

pub mod enrich;
pub mod filter;
pub mod normalize;
pub mod units;
pub mod values;
