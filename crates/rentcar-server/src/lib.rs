//! REST API server: routes, bearer-token authentication, role checks, the
//! response envelope and OpenAPI documentation.

pub mod admin;
pub mod auth;
pub mod config;
pub mod dto;
pub mod envelope;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;
