use chrono::NaiveDate;
use thiserror::Error;

/// Malformed filter parameters are client errors, not empty result sets.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("expected a comma-separated list of integer ids, got {0:?}")]
    BadIdList(String),
    #[error("expected a YYYY-MM-DD date, got {0:?}")]
    BadDate(String),
}

// ============================================================================
// Per-collection filter parameters
//
// Absent fields impose no constraint; present fields are combined with AND.
// ============================================================================

/// Name-only filter, shared by airports and airplane types.
#[derive(Debug, Clone, Default)]
pub struct NameFilter {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AirplaneFilter {
    pub name: Option<String>,
    pub airplane_type: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Default)]
pub struct CrewFilter {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RouteFilter {
    pub destination: Option<String>,
}

/// Matches against the composed route name "{source} - {destination}".
#[derive(Debug, Clone, Default)]
pub struct RouteNameFilter {
    pub route: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub created_at: Option<NaiveDate>,
    pub route: Option<String>,
}

// ============================================================================
// Matching helpers
// ============================================================================

/// Case-insensitive substring containment, the semantics every name filter
/// uses. An empty needle matches everything.
pub fn icontains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Parse the comma-separated id list accepted by the airplane_type filter.
pub fn parse_id_list(raw: &str) -> Result<Vec<i64>, FilterError> {
    raw.split(',')
        .map(|token| {
            token
                .trim()
                .parse::<i64>()
                .map_err(|_| FilterError::BadIdList(raw.to_string()))
        })
        .collect()
}

/// Parse the calendar-day filter on orders.
pub fn parse_date(raw: &str) -> Result<NaiveDate, FilterError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| FilterError::BadDate(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icontains_ignores_case() {
        assert!(icontains("Paris - Tokyo Airport", "paris - tokyo"));
        assert!(icontains("Boeing 777", "boeing"));
        assert!(!icontains("Boeing 777", "airbus"));
    }

    #[test]
    fn icontains_matches_empty_needle() {
        assert!(icontains("anything", ""));
    }

    #[test]
    fn parse_id_list_accepts_comma_separated_integers() {
        assert_eq!(parse_id_list("1,2,3"), Ok(vec![1, 2, 3]));
        assert_eq!(parse_id_list("7"), Ok(vec![7]));
        assert_eq!(parse_id_list(" 4 , 5 "), Ok(vec![4, 5]));
    }

    #[test]
    fn parse_id_list_rejects_non_integer_tokens() {
        assert_eq!(
            parse_id_list("1,two,3"),
            Err(FilterError::BadIdList("1,two,3".to_string()))
        );
        assert_eq!(parse_id_list(""), Err(FilterError::BadIdList(String::new())));
    }

    #[test]
    fn parse_date_accepts_iso_dates_only() {
        assert_eq!(
            parse_date("2024-08-30"),
            Ok(NaiveDate::from_ymd_opt(2024, 8, 30).unwrap())
        );
        assert_eq!(
            parse_date("30-08-2024"),
            Err(FilterError::BadDate("30-08-2024".to_string()))
        );
    }
}
