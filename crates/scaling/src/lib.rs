//! Analysis toolchain for scalability experiments of the MIO distributed
//! datagram-processing system: experiment record model, derived metrics
//! (speedup, efficiency, benefit classification) and report rendering.

pub mod metrics;
pub mod record;
pub mod report;
