// Domain layer: schema/code models and ports. Only std, serde and zip here.

pub mod model;
pub mod ports;
