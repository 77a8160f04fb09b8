pub mod auth;
pub mod errors;
pub mod flash;
pub mod openapi;
pub mod origin;
pub mod pages;
pub mod products;
pub mod routes;
pub mod startup;
pub mod state;
pub mod views;

pub use startup::run;
