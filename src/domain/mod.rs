// Domain layer: data model and ports. The classification rules live in core.

pub mod model;
pub mod ports;
