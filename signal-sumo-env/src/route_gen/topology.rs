use serde::{Deserialize, Serialize};

/// A vehicle type of the route file.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleType {
    /// Type id.
    pub id: &'static str,

    /// Prefix of the ids of vehicles of this type.
    pub prefix: &'static str,

    /// SUMO vehicle class.
    pub vclass: &'static str,

    /// Length in m.
    pub length: f64,

    /// Maximum speed in m/s.
    pub max_speed: f64,

    /// Speed at departure in m/s.
    pub depart_speed: f64,

    /// Color in the GUI.
    pub color: &'static str,
}

/// Routes sharing an origin, and the probability of the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Origin {
    /// Name of the origin.
    pub name: &'static str,

    /// Relative weight of the origin.
    pub weight: f64,

    /// Ids of the routes leaving the origin.
    pub routes: &'static [&'static str],
}

/// Road network of an experiment.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub enum Topology {
    /// A single intersection with three approaches.
    Single,

    /// Two coordinated intersections.
    Dual,
}

const SINGLE_ROUTES: &[(&str, &str)] = &[
    ("D_B", "E2 1011411824 724597257 26430484#0 26430484#1 26430484#2"),
    ("D_K", "E2 724597254#0 724597254#1 724597253#0 724597253#1"),
    ("K_G", "E3 1011411822 724597252 1099844081#0 1099844081#1 1099844081#2"),
    ("K_B", "E3 724597257 26430484#0 26430484#1 26430484#2"),
    ("B_D", "E4 724597252 1099844081#0 1099844081#1 1099844081#2"),
    ("B_K", "E4 724597252 1011411823 724597254#0 724597254#1 724597253#0 724597253#1"),
];

const SINGLE_ORIGINS: &[Origin] = &[
    Origin {
        name: "D",
        weight: 1.0,
        routes: &["D_B", "D_K"],
    },
    Origin {
        name: "K",
        weight: 1.0,
        routes: &["K_G", "K_B"],
    },
    Origin {
        name: "B",
        weight: 1.0,
        routes: &["B_D", "B_K"],
    },
];

const DUAL_ROUTES: &[(&str, &str)] = &[
    ("sk1", "E20 E2 E19"),
    ("sk2", "E20 E2 E32 E33 E13 E15 E16 E5 E35 E8"),
    ("sd1", "E14 E7 E37 E11 E12 E1 E31 E19"),
    ("sd2", "E14 E7 E37 E11 E12 E1 E21"),
    ("sb1", "E18 E3 E33 E13 E15 E16 E5 E35 E8"),
    ("sb2", "E18 E3 E33 E30 E21"),
    ("gk1", "E10 E4 E34 E9"),
    ("gk2", "E10 E4 E11 E12 E1 E21"),
    ("gk3", "E10 E4 E34 E35 E8"),
    ("gb1", "E18 E3 E33 E13 E15 E16 E5 E35 E8"),
    ("gb2", "E20 E2 E32 E33 E13 E15 E16 E5 E9"),
    ("gb3", "E20 E2 E32 E33 E13 E15 E16 E5 E35 E36 E0"),
    ("gg1", "E17 E6 E8"),
    ("gg2", "E17 E6 E36 E0"),
    ("gg3", "E17 E6 E36 E37 E11 E12 E1 E31 E19"),
    ("gd1", "E14 E7 E37 E11 E12 E1 E21"),
    ("gd2", "E14 E7 E37 E34 E9"),
    ("gd3", "E14 E7 E0"),
];

const DUAL_ORIGINS: &[Origin] = &[
    Origin {
        name: "sk",
        weight: 0.155,
        routes: &["sk1", "sk2"],
    },
    Origin {
        name: "sd",
        weight: 0.14,
        routes: &["sd1", "sd2"],
    },
    Origin {
        name: "sb",
        weight: 0.205,
        routes: &["sb1", "sb2"],
    },
    Origin {
        name: "gk",
        weight: 0.125,
        routes: &["gk1", "gk2", "gk3"],
    },
    Origin {
        name: "gb",
        weight: 0.125,
        routes: &["gb1", "gb2", "gb3"],
    },
    Origin {
        name: "gg",
        weight: 0.125,
        routes: &["gg1", "gg2", "gg3"],
    },
    Origin {
        name: "gd",
        weight: 0.125,
        routes: &["gd1", "gd2", "gd3"],
    },
];

fn vehicle_type(
    id: &'static str,
    prefix: &'static str,
    vclass: &'static str,
    (length, max_speed, depart_speed): (f64, f64, f64),
    color: &'static str,
) -> VehicleType {
    VehicleType {
        id,
        prefix,
        vclass,
        length,
        max_speed,
        depart_speed,
        color,
    }
}

impl Topology {
    /// Named routes as pairs of id and space-separated edges.
    pub fn routes(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Single => SINGLE_ROUTES,
            Self::Dual => DUAL_ROUTES,
        }
    }

    /// Origins of the vehicles.
    pub fn origins(&self) -> &'static [Origin] {
        match self {
            Self::Single => SINGLE_ORIGINS,
            Self::Dual => DUAL_ORIGINS,
        }
    }

    /// Types of private cars, buses and taxis, in this order.
    pub fn vehicle_types(&self) -> [VehicleType; 3] {
        let (car, bus) = match self {
            Self::Single => ((5.0, 25.0), (10.0, 15.0)),
            Self::Dual => ((4.0, 13.0), (8.0, 8.0)),
        };
        [
            vehicle_type("standart_car", "car", "passenger", (car.0, car.1, 8.0), "cyan"),
            vehicle_type("bus", "bus", "bus", (bus.0, bus.1, 5.0), "red"),
            vehicle_type("taxi", "taxi", "taxi", (car.0, car.1, 8.0), "yellow"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origins_reference_routes() {
        for topology in [Topology::Single, Topology::Dual] {
            let ids: Vec<&str> = topology.routes().iter().map(|(id, _)| *id).collect();
            let mut n_routes = 0;
            for origin in topology.origins() {
                assert!(origin.weight > 0.0);
                for route in origin.routes {
                    assert!(ids.contains(route), "{} is not a route", route);
                }
                n_routes += origin.routes.len();
            }
            assert_eq!(n_routes, ids.len());
        }
        let total: f64 = Topology::Dual.origins().iter().map(|o| o.weight).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }
}
