pub mod destination;
pub mod location;
pub mod route;
pub mod trip;
