pub mod area;
pub mod entity;
pub mod geometry;
pub mod token;
pub mod user;
pub mod ward;
