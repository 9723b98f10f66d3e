mod car;
mod dealership;
mod review;

pub use car::{CarCatalog, CarListing, CarMake, CarModel, CarType, check_car_catalog};
pub use dealership::Dealership;
pub use review::{NewReview, Review};
