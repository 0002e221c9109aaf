//! Route-file generation.
//!
//! Every episode gets its own demand: `n_vehicles` depart times drawn from a Weibull
//! distribution of shape 2 and stretched over the episode, and for every vehicle a
//! class and a route. 75% of the vehicles are private cars, the rest are buses (75%)
//! and taxis (25%). The origin of a vehicle is drawn by the weights of the
//! [`Topology`], its route uniformly among the routes leaving that origin.
mod config;
mod generator;
mod topology;
pub use config::RouteGeneratorConfig;
pub use generator::{PlannedVehicle, RouteGenerator};
pub use topology::{Origin, Topology, VehicleType};
