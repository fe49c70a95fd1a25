// Domain layer: core models and ports (interfaces). No transport code here.

pub mod model;
pub mod ports;
