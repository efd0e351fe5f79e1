// Domain layer: wire models and ports. No HTTP or CLI concerns here.

pub mod model;
pub mod ports;
