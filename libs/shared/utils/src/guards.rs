//! Role checks applied inside handlers after `auth_middleware` has run.

use tracing::warn;
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::error::AppError;

pub fn require_doctor(user: &User) -> Result<(), AppError> {
    if !user.is_doctor() {
        warn!("User {} ({}) denied doctor-only access", user.id, user.role);
        return Err(AppError::Forbidden("Access denied. Doctors only.".to_string()));
    }
    Ok(())
}

pub fn require_doctor_or_admin(user: &User) -> Result<(), AppError> {
    if !user.is_doctor() && !user.is_admin() {
        warn!("User {} ({}) denied staff access", user.id, user.role);
        return Err(AppError::Forbidden("Access denied".to_string()));
    }
    Ok(())
}

/// One of the users a record names (its patient or doctor), or an admin.
pub fn require_party_or_admin(user: &User, parties: &[Uuid]) -> Result<(), AppError> {
    if parties.contains(&user.id) || user.is_admin() {
        return Ok(());
    }
    warn!("User {} denied access to record of {:?}", user.id, parties);
    Err(AppError::Forbidden("Access denied".to_string()))
}
