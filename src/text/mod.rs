//! Query and template text preparation.
//!
//! - [`normalize`] folds surface-form variance so that query and template
//!   questions are embedded the same way.
//! - [`products`] spots catalog product names mentioned in a query.

pub mod normalize;
pub mod products;

pub use normalize::normalize_text;
pub use products::{PRODUCT_NAMES, ProductDetector, detect_products};
