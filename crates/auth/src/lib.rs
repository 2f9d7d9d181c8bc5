//! `inventario-auth`: pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it knows what
//! a user and a role are, which views each role may reach, and how to read
//! the claims of a bearer token. Talking to the backend is the client's job.

pub mod authorize;
pub mod claims;
pub mod guard;
pub mod permissions;
pub mod roles;
pub mod user;

pub use authorize::{AuthzError, authorize, can_view, permissions_for};
pub use claims::{TokenClaims, TokenError, TokenValidationError, decode_unverified, validate_claims};
pub use guard::{GuardDecision, GuardState, Route, decide};
pub use permissions::{Action, Permission, Resource};
pub use roles::Role;
pub use user::{NewUser, User, UserUpdate};
