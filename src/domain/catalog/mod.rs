pub mod features;
pub mod plans;
