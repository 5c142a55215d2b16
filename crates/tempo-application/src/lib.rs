//! Application layer for Tempo.
//!
//! Wires the domain services from `tempo-core` into the flows a client
//! drives, behind the identity seam.
//!
//! # Module Structure
//!
//! - `focus_usecase`: Session lifecycle orchestration (`FocusUseCase`)
//! - `identity`: Who is signed in (`IdentityProvider`, `FixedIdentity`)
//! - `dto`: Request/response shapes for the session contract

pub mod dto;
pub mod focus_usecase;
pub mod identity;

pub use focus_usecase::{FocusEvent, FocusUseCase};
pub use identity::{FixedIdentity, IdentityProvider};
