mod apartment;

pub use apartment::{Apartment, ApartmentDirectory};
