//! Todos: the ownership rule and the service that applies it.

pub mod authorizer;
pub mod errors;
pub mod service;

pub use authorizer::{decide, OwnershipAuthorizer};
pub use errors::TodoError;
pub use service::TodosService;
