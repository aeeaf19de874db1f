pub mod prescription;

pub use prescription::{prescription_select, PrescriptionService};
