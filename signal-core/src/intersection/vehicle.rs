/// Vehicle classes distinguished by the controller.
///
/// Only buses and taxis are visible to the state encoding and the reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleClass {
    /// Private car.
    Car,

    /// Bus.
    Bus,

    /// Taxi.
    Taxi,
}

impl VehicleClass {
    /// Classifies a vehicle by its type id. Unknown types are private cars.
    pub fn from_type_id(type_id: &str) -> Self {
        match type_id {
            "bus" => Self::Bus,
            "taxi" => Self::Taxi,
            _ => Self::Car,
        }
    }

    /// `true` for buses and taxis.
    pub fn is_public(&self) -> bool {
        !matches!(self, Self::Car)
    }

    /// Value written into the occupancy block of the state.
    pub fn occupancy(&self) -> Option<f32> {
        match self {
            Self::Bus => Some(2.0),
            Self::Taxi => Some(1.0),
            Self::Car => None,
        }
    }

    /// Weight of the accumulated waiting time in the reward.
    pub fn reward_weight(&self) -> f64 {
        match self {
            Self::Bus => 2.0,
            Self::Taxi => 1.0,
            Self::Car => 0.0,
        }
    }
}
