use crate::{
    auth::Claims,
    errors::{AppError, AppResult},
};

/// Guard for the quiz authoring, grading and certificate admin routes.
pub fn require_admin(claims: &Claims) -> AppResult<()> {
    match claims.is_admin() {
        true => Ok(()),
        false => Err(AppError::Forbidden("Admin access required".to_string())),
    }
}

/// Learners may read records they own; admins may read anyone's.
pub fn require_owner_or_admin(claims: &Claims, owner_id: &str) -> AppResult<()> {
    if claims.is_admin() || claims.user_id() == owner_id {
        return Ok(());
    }

    log::debug!("{} denied access to a record owned by {}", claims.sub, owner_id);
    Err(AppError::Forbidden(
        "Not authorized to access this resource".to_string(),
    ))
}
