// Domain layer: models shared by the web surface and the refresh job, plus the
// ports implemented by the backend and places adapters.

pub mod model;
pub mod places;
pub mod ports;
