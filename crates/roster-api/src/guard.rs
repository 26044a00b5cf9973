//! Request guards that run before a session is opened.

use uuid::Uuid;

use crate::error::ApiError;

/// The identifier in an update body must be present and equal the one in
/// the path.
pub fn check_payload_mismatch(
  path_id: Uuid,
  payload_id: Option<Uuid>,
) -> Result<(), ApiError> {
  match payload_id {
    Some(id) if id == path_id => Ok(()),
    Some(id) => Err(ApiError::BadRequest(format!(
      "payload id {id} does not match path id {path_id}"
    ))),
    None => Err(ApiError::BadRequest(format!(
      "payload must include the id {path_id}"
    ))),
  }
}
