pub mod apartments;
pub mod reports;
