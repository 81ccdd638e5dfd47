//! Grade normalization
//!
//! Grades are stored either as a bare number ("7") or as a descriptive
//! label ("Grade 03 Instruction").

/// Parse a stored grade value.
///
/// The whole string is tried first; failing that, the first
/// whitespace-delimited token that parses as an integer wins. Anything
/// else is grade 0.
pub fn parse_grade(value: &str) -> i32 {
    if let Ok(grade) = value.trim().parse::<i32>() {
        return grade;
    }

    value
        .split_whitespace()
        .find_map(|part| part.parse::<i32>().ok())
        .unwrap_or(0)
}
