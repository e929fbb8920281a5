//! Council membership rules.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Maximum length of a council name.
pub const MAX_NAME_LENGTH: usize = 200;

/// A professor's role on a council.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CouncilRole {
    Chairman,
    Secretary,
    Member,
}

impl CouncilRole {
    pub fn as_str(self) -> &'static str {
        match self {
            CouncilRole::Chairman => "chairman",
            CouncilRole::Secretary => "secretary",
            CouncilRole::Member => "member",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "chairman" => Ok(CouncilRole::Chairman),
            "secretary" => Ok(CouncilRole::Secretary),
            "member" => Ok(CouncilRole::Member),
            other => Err(CoreError::Validation(format!(
                "Unknown council role '{other}'. Must be one of: chairman, secretary, member"
            ))),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CouncilRole::Chairman => "Chairman",
            CouncilRole::Secretary => "Secretary",
            CouncilRole::Member => "Member",
        }
    }
}

/// A requested seat on a council.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatRequest {
    pub professor_id: DbId,
    pub role: CouncilRole,
}

/// Validate a council name: non-blank and at most [`MAX_NAME_LENGTH`] chars.
pub fn validate_council_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Council name is required".into()));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Council name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate the seat list of a new council.
///
/// A council needs at least one member and a professor may hold only one
/// seat on it.
pub fn validate_seats(seats: &[SeatRequest]) -> Result<(), CoreError> {
    if seats.is_empty() {
        return Err(CoreError::Validation(
            "A council needs at least one member".into(),
        ));
    }
    let mut seen = HashSet::with_capacity(seats.len());
    for seat in seats {
        if !seen.insert(seat.professor_id) {
            return Err(CoreError::Validation(format!(
                "Professor {} is listed more than once",
                seat.professor_id
            )));
        }
    }
    Ok(())
}

/// Refuse a new seat once scoring has started on any of the council's
/// projects. The member count is what completion is measured against.
pub fn ensure_membership_open(council_id: DbId, scores_recorded: i64) -> Result<(), CoreError> {
    if scores_recorded > 0 {
        return Err(CoreError::Conflict(format!(
            "Council {council_id} already has scores recorded; its membership is frozen"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seat(professor_id: DbId, role: CouncilRole) -> SeatRequest {
        SeatRequest { professor_id, role }
    }

    #[test]
    fn role_parse_round_trip() {
        for role in [CouncilRole::Chairman, CouncilRole::Secretary, CouncilRole::Member] {
            assert_eq!(CouncilRole::parse(role.as_str()).unwrap(), role);
        }
        assert!(CouncilRole::parse("observer").is_err());
    }

    #[test]
    fn blank_name_rejected() {
        assert!(validate_council_name("   ").is_err());
        assert!(validate_council_name("Software Engineering Council A").is_ok());
        assert!(validate_council_name(&"x".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn duplicate_professor_rejected() {
        let seats = [
            seat(10, CouncilRole::Chairman),
            seat(11, CouncilRole::Secretary),
            seat(10, CouncilRole::Member),
        ];
        let err = validate_seats(&seats).unwrap_err();
        assert!(matches!(err, CoreError::Validation(msg) if msg.contains("Professor 10")));
    }

    #[test]
    fn empty_council_rejected() {
        assert!(validate_seats(&[]).is_err());
        assert!(validate_seats(&[seat(1, CouncilRole::Chairman)]).is_ok());
    }

    #[test]
    fn membership_frozen_after_scoring() {
        assert!(ensure_membership_open(4, 0).is_ok());
        assert!(matches!(
            ensure_membership_open(4, 2),
            Err(CoreError::Conflict(_))
        ));
    }
}
