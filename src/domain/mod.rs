// Domain layer: API payload models, the parsed response tree and ports (interfaces).

pub mod model;
pub mod payload;
pub mod ports;
