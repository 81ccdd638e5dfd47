//! Stored function names and SQL builders
//!
//! The roster schema is a pinned external contract: every stored function
//! and parameter name the service relies on is declared here.

// Student roster functions. Multi-row functions return SETOF refcursor,
// one cursor per result set, in the order documented next to each name.

/// Schools, grades, teachers, classes
pub const SP_GET_STUDENT_DROPDOWN_DATA: &str = "sp_get_student_dropdown_data";
pub const SP_SEARCH_STUDENTS: &str = "sp_search_students";
pub const SP_GET_STUDENT_COUNT: &str = "sp_get_student_count";
pub const SP_SEARCH_INDIVIDUAL_STUDENT: &str = "sp_search_individual_student";
/// Student row, then enrolled courses
pub const SP_GET_STUDENT_DETAIL: &str = "sp_get_student_detail";
pub const SP_SEARCH_STUDENTS_BY_PROGRAM: &str = "sp_search_students_by_program";
pub const SP_GET_CASCADING_DROPDOWN_DATA: &str = "sp_get_cascading_dropdown_data";

// Teacher directory functions

pub const SP_GET_ALL_TEACHERS: &str = "sp_get_all_teachers";
pub const SP_GET_TEACHER_SCHEDULE: &str = "sp_get_teacher_schedule";
pub const SP_GET_TEACHER_BY_ID: &str = "sp_get_teacher_by_id";
/// Schools, subjects, grades
pub const SP_GET_TEACHER_DROPDOWN_DATA: &str = "sp_get_teacher_dropdown_data";

// Parameter names

pub const P_SCHOOL: &str = "p_school";
pub const P_GRADE: &str = "p_grade";
pub const P_TEACHER: &str = "p_teacher";
pub const P_CLASS: &str = "p_class";
pub const P_LEVEL: &str = "p_level";
pub const P_SEARCH_TERM: &str = "p_search_term";
pub const P_SEARCH_TYPE: &str = "p_search_type";
pub const P_STUDENT_ID: &str = "p_student_id";
pub const P_PROGRAM_TYPE: &str = "p_program_type";
pub const P_EMPLOYEE_ID: &str = "p_employee_id";

/// Name of the connected database
pub const CURRENT_DATABASE: &str = "SELECT current_database()";

/// List all user base tables
pub const LIST_BASE_TABLES: &str = r#"
    SELECT table_name::text
    FROM information_schema.tables
    WHERE table_type = 'BASE TABLE'
        AND table_schema NOT IN ('pg_catalog', 'information_schema')
    ORDER BY table_name
"#;

/// Portal login accounts
pub const CREATE_PORTAL_USERS: &str = r#"
    CREATE TABLE IF NOT EXISTS portal_users (
        id SERIAL PRIMARY KEY,
        email VARCHAR(255) UNIQUE NOT NULL,
        password_hash VARCHAR(255) NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
"#;

pub const FIND_USER_BY_EMAIL: &str = r#"
    SELECT id, email, password_hash
    FROM portal_users
    WHERE lower(email) = lower($1)
"#;

pub const INSERT_USER: &str = r#"
    INSERT INTO portal_users (email, password_hash)
    VALUES ($1, $2)
    ON CONFLICT (email) DO NOTHING
    RETURNING id, email, password_hash
"#;

/// SQL builder for stored function calls
pub struct SqlBuilder;

impl SqlBuilder {
    /// Quote an identifier (function/parameter/cursor name) safely
    pub fn quote_ident(ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    /// Named-notation argument list: `"p_a" => $1, "p_b" => $2`
    fn named_args(params: &[&str]) -> String {
        params
            .iter()
            .enumerate()
            .map(|(i, name)| format!("{} => ${}", Self::quote_ident(name), i + 1))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Call a function returning SETOF refcursor, yielding cursor names as text
    pub fn call_cursor_function(function: &str, params: &[&str]) -> String {
        format!(
            "SELECT cur::text FROM {}({}) AS cur",
            Self::quote_ident(function),
            Self::named_args(params)
        )
    }

    /// Call a scalar function, widened to bigint
    pub fn call_scalar_function(function: &str, params: &[&str]) -> String {
        format!(
            "SELECT ({}({}))::bigint",
            Self::quote_ident(function),
            Self::named_args(params)
        )
    }

    pub fn fetch_all(cursor: &str) -> String {
        format!("FETCH ALL FROM {}", Self::quote_ident(cursor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident_escapes_quotes() {
        assert_eq!(SqlBuilder::quote_ident("sp_x"), "\"sp_x\"");
        assert_eq!(SqlBuilder::quote_ident("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_cursor_call_uses_named_notation() {
        let sql = SqlBuilder::call_cursor_function(SP_SEARCH_STUDENTS, &[P_SCHOOL, P_GRADE]);
        assert_eq!(
            sql,
            "SELECT cur::text FROM \"sp_search_students\"(\"p_school\" => $1, \"p_grade\" => $2) AS cur"
        );
    }

    #[test]
    fn test_cursor_call_without_params() {
        let sql = SqlBuilder::call_cursor_function(SP_GET_ALL_TEACHERS, &[]);
        assert_eq!(sql, "SELECT cur::text FROM \"sp_get_all_teachers\"() AS cur");
    }

    #[test]
    fn test_scalar_call_widens_to_bigint() {
        let sql = SqlBuilder::call_scalar_function(SP_GET_STUDENT_COUNT, &[P_CLASS]);
        assert_eq!(
            sql,
            "SELECT (\"sp_get_student_count\"(\"p_class\" => $1))::bigint"
        );
    }

    #[test]
    fn test_fetch_all_quotes_cursor() {
        assert_eq!(
            SqlBuilder::fetch_all("<unnamed portal 1>"),
            "FETCH ALL FROM \"<unnamed portal 1>\""
        );
    }
}
