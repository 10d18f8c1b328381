// Domain layer: records, headers, reports and the storage port. No IO here.

pub mod model;
pub mod ports;
