pub mod controller;
pub mod page;
pub mod routes;
