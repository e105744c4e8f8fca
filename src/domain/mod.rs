// Domain layer: shared models and ports (interfaces) used by every tool.

pub mod model;
pub mod ports;
