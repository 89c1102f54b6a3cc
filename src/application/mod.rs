pub mod dto;
pub mod enrichment;
pub mod geolocation;
pub mod intake;
pub mod orchestrator;
pub mod ports;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;
