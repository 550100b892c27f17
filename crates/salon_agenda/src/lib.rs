// --- File: crates/salon_agenda/src/lib.rs ---
// Declare modules within this crate
pub mod clock;
pub mod doc;
pub mod handlers;
#[cfg(test)]
mod handlers_test;
pub mod logic;
#[cfg(test)]
mod logic_proptest;
pub mod routes;
#[cfg(test)]
mod routes_test;
pub mod service;
#[cfg(test)]
mod service_test;
pub mod store;
#[cfg(test)]
mod test_support;

pub use clock::{Clock, FixedClock, SystemClock};
pub use service::{AgendaError, AgendaService};
pub use store::InMemoryAgendaStore;
