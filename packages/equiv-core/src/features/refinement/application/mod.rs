pub mod controller;

pub use controller::{CegarController, RunOutcome, RunRequest};
