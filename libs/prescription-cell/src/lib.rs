pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{Medicine, Prescription, PrescriptionError};
pub use router::prescription_routes;
pub use services::PrescriptionService;
