//! Reserved participant identities.

use council_core::error::DomainError;

/// The moderator identity. It may post without joining, is never counted
/// among participants, and is always a valid next speaker.
pub const MODERATOR: &str = "Moderator";

/// Names no participant may join under. Matching is exact and
/// case-sensitive.
pub const RESERVED_NAMES: &[&str] = &[MODERATOR];

/// Returns `true` if `name` is reserved.
#[must_use]
pub fn is_reserved_name(name: &str) -> bool {
    RESERVED_NAMES.contains(&name)
}

/// Rejects reserved names.
///
/// # Errors
///
/// Returns `DomainError::ReservedName` if `name` is reserved.
pub fn ensure_not_reserved(name: &str) -> Result<(), DomainError> {
    if is_reserved_name(name) {
        return Err(DomainError::ReservedName(name.to_owned()));
    }
    Ok(())
}
