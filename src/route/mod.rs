//! Route module
//!
//! Declarative description of HTTP endpoints.
//!
//! # Overview
//!
//! A [`RouteDescriptor`] is an immutable value holding everything needed to
//! build a request for one endpoint: method, path, static parameters,
//! parameter encoding and retry budget. Endpoint families are usually modelled
//! as enums implementing [`RouteType`], which converts them into descriptors.
//!
//! [`AdaptedRoute`] decorates a descriptor with typed extensions (extra
//! headers, download progress handlers) without changing the route itself.

mod adapted;
mod types;

pub use adapted::AdaptedRoute;
pub use types::{RouteDescriptor, RouteType};
