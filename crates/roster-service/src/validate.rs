//! Input validation for person drafts.

use roster_core::person::{
  COORDINATE_LIMIT, Coordinates, HEIGHT_MAX, HEIGHT_MIN, Location, NAME_MAX_LENGTH, NewPerson,
  PersonDraft,
};

use crate::{Result, ServiceError};

/// Check a draft against the aggregate invariants and turn it into a
/// [`NewPerson`]. Nothing here touches storage.
pub(crate) fn validate_draft(draft: PersonDraft) -> Result<NewPerson> {
  if draft.height < HEIGHT_MIN {
    return Err(ServiceError::invalid("height must be > 0"));
  }
  if draft.height > HEIGHT_MAX {
    return Err(ServiceError::invalid(format!("height must be <= {HEIGHT_MAX}")));
  }

  let Some(coordinates) = draft.coordinates else {
    return Err(ServiceError::invalid("coordinates must be provided"));
  };
  let Some(y) = coordinates.y else {
    return Err(ServiceError::invalid("coordinates.y must be not null"));
  };
  check_coordinate("coordinates.x", coordinates.x)?;
  check_coordinate("coordinates.y", y)?;

  if draft.name.trim().is_empty() {
    return Err(ServiceError::invalid("name must not be blank"));
  }
  if draft.name.chars().count() > NAME_MAX_LENGTH {
    return Err(ServiceError::invalid(format!(
      "name must be at most {NAME_MAX_LENGTH} characters"
    )));
  }

  let location = match draft.location {
    Some(loc) if !loc.x.is_finite() => {
      return Err(ServiceError::invalid("location.x must be a finite number"));
    }
    Some(loc) => Some(Location { id: None, x: loc.x, y: loc.y, z: loc.z }),
    None => None,
  };

  Ok(NewPerson {
    name: draft.name,
    coordinates: Coordinates { id: None, x: coordinates.x, y },
    eye_color: draft.eye_color,
    hair_color: draft.hair_color,
    location,
    height: draft.height,
    birthday: draft.birthday,
    nationality: draft.nationality,
  })
}

fn check_coordinate(field: &str, value: f32) -> Result<()> {
  if !value.is_finite() || value.abs() > COORDINATE_LIMIT {
    return Err(ServiceError::invalid(format!(
      "{field} must be between -{COORDINATE_LIMIT} and {COORDINATE_LIMIT}"
    )));
  }
  Ok(())
}
