//! Fixing rules
//!
//! A rule finds candidates by kind, text and relative position, decides from
//! chain-traversable information only, and edits through the chain API.
//! Applying a rule to its own output must make zero edits.

pub mod class_body;
pub mod default_values_in_constructor;

use crate::chain::{Chain, ChainError};

pub use default_values_in_constructor::DefaultValuesInConstructor;

pub trait Rule {
    /// Stable identifier used in logs and reports
    fn name(&self) -> &'static str;

    fn apply(&self, chain: &mut Chain) -> Result<(), ChainError>;
}

/// Every rule shipped with the crate, in application order
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![Box::new(DefaultValuesInConstructor)]
}
