pub mod app;
mod deserializers;
pub mod errors;
mod pagination;
mod routes;
