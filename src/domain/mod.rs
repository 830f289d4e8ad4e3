// Domain layer: models and the two capability interfaces (weather source, audio player).

pub mod model;
pub mod ports;
