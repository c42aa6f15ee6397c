#![doc = "The `todoforge` library crate."]
#![doc = ""]
#![doc = "Authentication (password hashing, signed access and refresh keys), the todo"]
#![doc = "ownership rule, storage backends, HTTP routes and error handling for the"]
#![doc = "todoforge service. The binary (`main.rs`) wires these together and runs the server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod storage;
pub mod todos;

pub use crate::error::AppError;
pub use crate::routes::AppState;
