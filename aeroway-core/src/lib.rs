pub mod filters;
pub mod models;
pub mod repository;
pub mod validation;
