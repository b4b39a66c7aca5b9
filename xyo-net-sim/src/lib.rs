//! XYO Net Sim
//!
//! In-memory transport for tests and simulation: duplex-stream links with a
//! disconnect control, producing the same [`xyo_net::Pipe`] implementations
//! the production framing uses.

pub mod duplex_pipe;

pub use duplex_pipe::{link, SimLink, SimSocket};
