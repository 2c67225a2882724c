// Domain layer: flat records and the ports each external API wrapper implements.

pub mod model;
pub mod ports;
