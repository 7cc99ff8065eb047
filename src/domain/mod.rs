// Domain layer: listing model, ports, and the pure flatten/normalize services.

pub mod model;
pub mod ports;

pub mod services;
