mod apartment_handler;

pub use apartment_handler::*;
