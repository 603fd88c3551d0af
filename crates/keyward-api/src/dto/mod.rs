//! Request and response bodies.

pub mod request;
pub mod response;

pub use request::{LoginRequest, RegisterRequest, ValidateRequest};
pub use response::{HealthResponse, LoginResponse, RegisterResponse, ValidateResponse};
