//! Identity seam.
//!
//! Authentication itself is an external collaborator; the application layer
//! only needs to know who (if anyone) is signed in. Session ownership checks
//! and the "must be signed in to start" rule hang off this trait.

/// Supplies the identity of the current user.
pub trait IdentityProvider: Send + Sync {
    /// Returns the signed-in user's identifier, or `None` when nobody is
    /// signed in.
    fn current_user(&self) -> Option<String>;
}

/// A fixed identity, as used by the CLI (`--owner` flag) and tests.
pub struct FixedIdentity {
    owner: Option<String>,
}

impl FixedIdentity {
    /// An identity that is signed in as `owner`.
    pub fn signed_in(owner: impl Into<String>) -> Self {
        Self {
            owner: Some(owner.into()),
        }
    }

    /// An identity with nobody signed in.
    pub fn signed_out() -> Self {
        Self { owner: None }
    }
}

impl IdentityProvider for FixedIdentity {
    fn current_user(&self) -> Option<String> {
        self.owner.clone()
    }
}
