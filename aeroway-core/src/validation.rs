use thiserror::Error;

/// Rejections for structurally invalid writes. Every check here runs before
/// anything touches the store; a failure means no partial write happened.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("the number of {field} must be greater than 0, got {value}")]
    InvalidDimension { field: &'static str, value: i32 },
    #[error("distance must be greater than 0, got {value}")]
    InvalidDistance { value: i32 },
    #[error("{field} must be in the range [1, {max}], got {value}")]
    SeatOutOfRange {
        field: &'static str,
        value: i32,
        max: i32,
    },
}

pub fn validate_airplane(rows: i32, seats_in_rows: i32) -> Result<(), ValidationError> {
    if rows <= 0 {
        return Err(ValidationError::InvalidDimension {
            field: "rows",
            value: rows,
        });
    }
    if seats_in_rows <= 0 {
        return Err(ValidationError::InvalidDimension {
            field: "seats_in_rows",
            value: seats_in_rows,
        });
    }
    Ok(())
}

pub fn validate_route(distance: i32) -> Result<(), ValidationError> {
    if distance <= 0 {
        return Err(ValidationError::InvalidDistance { value: distance });
    }
    Ok(())
}

/// Range check for a candidate seat against the flight's airplane dimensions.
/// Uniqueness of (row, seat) per flight is a separate, store-level constraint.
pub fn validate_ticket(
    row: i32,
    seat: i32,
    rows: i32,
    seats_in_rows: i32,
) -> Result<(), ValidationError> {
    if row < 1 || row > rows {
        return Err(ValidationError::SeatOutOfRange {
            field: "row",
            value: row,
            max: rows,
        });
    }
    if seat < 1 || seat > seats_in_rows {
        return Err(ValidationError::SeatOutOfRange {
            field: "seat",
            value: seat,
            max: seats_in_rows,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn airplane_dimensions_must_be_positive() {
        assert!(validate_airplane(10, 6).is_ok());
        assert_eq!(
            validate_airplane(0, 6),
            Err(ValidationError::InvalidDimension {
                field: "rows",
                value: 0
            })
        );
        assert_eq!(
            validate_airplane(10, -1),
            Err(ValidationError::InvalidDimension {
                field: "seats_in_rows",
                value: -1
            })
        );
    }

    #[test]
    fn route_distance_must_be_positive() {
        assert!(validate_route(5000).is_ok());
        assert_eq!(
            validate_route(0),
            Err(ValidationError::InvalidDistance { value: 0 })
        );
        assert_eq!(
            validate_route(-10),
            Err(ValidationError::InvalidDistance { value: -10 })
        );
    }

    #[test]
    fn ticket_row_and_seat_must_fit_the_airplane() {
        assert!(validate_ticket(1, 1, 10, 6).is_ok());
        assert!(validate_ticket(10, 6, 10, 6).is_ok());

        assert_eq!(
            validate_ticket(0, 1, 10, 6),
            Err(ValidationError::SeatOutOfRange {
                field: "row",
                value: 0,
                max: 10
            })
        );
        assert_eq!(
            validate_ticket(11, 1, 10, 6),
            Err(ValidationError::SeatOutOfRange {
                field: "row",
                value: 11,
                max: 10
            })
        );
        assert_eq!(
            validate_ticket(1, 7, 10, 6),
            Err(ValidationError::SeatOutOfRange {
                field: "seat",
                value: 7,
                max: 6
            })
        );
    }

    #[test]
    fn row_check_precedes_seat_check() {
        // Both out of range reports the row first.
        assert_eq!(
            validate_ticket(0, 0, 10, 6),
            Err(ValidationError::SeatOutOfRange {
                field: "row",
                value: 0,
                max: 10
            })
        );
    }
}
