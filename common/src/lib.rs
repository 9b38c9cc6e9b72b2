//! Models and request/response payloads shared between the survey admin
//! backend and its dashboard client.

pub mod model;
pub mod requests;
pub mod responses;
