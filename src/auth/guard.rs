use crate::error::AppError;
use crate::users::repo::User;

/// Role gate: side-effect-free predicate over an already-resolved identity.
pub fn require_admin(user: &User) -> Result<(), AppError> {
    if user.is_admin {
        Ok(())
    } else {
        Err(AppError::InsufficientPrivilege)
    }
}

/// Ownership gate. The caller passes in the owner reference it already
/// fetched; no lookups happen here. A mismatch (or an unowned resource)
/// reports `OwnershipViolation`, which renders as a 404 so the existence
/// of another user's resource is never disclosed.
pub fn require_owner(
    user: &User,
    owner_id: Option<i64>,
    resource: &'static str,
) -> Result<(), AppError> {
    if owner_id == Some(user.id) {
        Ok(())
    } else {
        Err(AppError::OwnershipViolation(resource))
    }
}
