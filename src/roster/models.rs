//! Roster records and response envelopes

use serde::Serialize;

/// One selectable dropdown entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropdownOption {
    pub value: String,
    pub text: String,
}

impl DropdownOption {
    pub fn new(value: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            text: text.into(),
        }
    }
}

/// Initial unfiltered option lists
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DropdownData {
    pub schools: Vec<DropdownOption>,
    pub grades: Vec<DropdownOption>,
    pub teachers: Vec<DropdownOption>,
    pub classes: Vec<DropdownOption>,
    pub subjects: Vec<DropdownOption>,
}

/// A student row with denormalized school/teacher/class names
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub row_id: i64,
    pub start_year: i32,
    pub latest_student: Option<bool>,
    pub idash_sid: Option<String>,
    pub last_name: String,
    pub first_name: String,
    pub full_name: String,
    pub grade: i32,
    pub school_id: i32,
    pub homeroom: String,
    pub sex: String,
    pub ethnic: String,
    pub special_ed: String,
    pub esl_code: String,
    pub food_service_code: String,
    pub home: String,
    pub is_504: String,
    pub school_name: String,
    pub teacher_name: String,
    pub class_name: String,
}

/// One enrolled course of a student
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseInfo {
    pub dash_cid: String,
    pub course_name: String,
    pub teacher_name: String,
    pub period: String,
    pub days: String,
    pub semester: String,
}

/// A student together with their schedule
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDetail {
    #[serde(flatten)]
    pub student: StudentRecord,
    pub courses: Vec<CourseInfo>,
    pub primary_teacher: String,
    pub total_courses: usize,
}

impl StudentDetail {
    /// Derive the course summary fields from the consumed course rows
    pub fn new(student: StudentRecord, courses: Vec<CourseInfo>) -> Self {
        let primary_teacher = courses
            .first()
            .map(|c| c.teacher_name.clone())
            .unwrap_or_default();

        Self {
            student,
            total_courses: courses.len(),
            primary_teacher,
            courses,
        }
    }
}

/// A staff member from the users table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherRecord {
    pub employee_id: i32,
    pub last_name: String,
    pub first_name: String,
    pub full_name: String,
    pub title: String,
    pub email: String,
    pub school: String,
    pub dash_user_id: String,
    pub status: String,
    pub is_active: bool,
    pub role: String,
    pub person_id: Option<i32>,
    pub person_id_char: String,
}

/// One scheduled section taught by a teacher
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherScheduleEntry {
    pub id: i32,
    pub dash_cid: String,
    pub start_yy: i32,
    pub school: String,
    pub short_name: String,
    pub class_cd: String,
    pub section: String,
    pub semester: String,
    pub period: Option<i32>,
    pub days: String,
    pub employee_id: i32,
    pub teacher_name: String,
    pub student_count: i32,
}

/// Success/failure envelope around a list of records.
///
/// `total_count` always equals the number of records; a failed search
/// carries no records.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult<T> {
    records: Vec<T>,
    total_count: usize,
    success: bool,
    message: String,
}

impl<T> SearchResult<T> {
    pub fn success(records: Vec<T>, message: impl Into<String>) -> Self {
        Self {
            total_count: records.len(),
            records,
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            records: Vec::new(),
            total_count: 0,
            success: false,
            message: message.into(),
        }
    }

    /// Failure envelope for a caught fault
    pub fn error(cause: impl std::fmt::Display) -> Self {
        Self::failure(format!("Error occurred: {}", cause))
    }

    #[cfg(test)]
    pub fn records(&self) -> &[T] {
        &self.records
    }

    #[cfg(test)]
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    #[cfg(test)]
    pub fn is_success(&self) -> bool {
        self.success
    }

    #[cfg(test)]
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn course(teacher: &str) -> CourseInfo {
        CourseInfo {
            teacher_name: teacher.to_string(),
            ..CourseInfo::default()
        }
    }

    #[test]
    fn test_detail_without_courses() {
        let detail = StudentDetail::new(StudentRecord::default(), Vec::new());
        assert_eq!(detail.total_courses, 0);
        assert_eq!(detail.primary_teacher, "");
    }

    #[test]
    fn test_primary_teacher_is_first_course() {
        let detail = StudentDetail::new(
            StudentRecord::default(),
            vec![course("Okafor"), course("Lindqvist")],
        );
        assert_eq!(detail.total_courses, 2);
        assert_eq!(detail.primary_teacher, "Okafor");
    }

    #[test]
    fn test_success_counts_records() {
        let result = SearchResult::success(vec![1, 2, 3], "done");
        assert!(result.is_success());
        assert_eq!(result.total_count(), result.records().len());
    }

    #[test]
    fn test_failure_is_empty() {
        let result: SearchResult<StudentRecord> = SearchResult::error("timeout expired");
        assert!(!result.is_success());
        assert!(result.records().is_empty());
        assert_eq!(result.total_count(), 0);
        assert_eq!(result.message(), "Error occurred: timeout expired");
    }

    #[test]
    fn test_detail_serializes_flat() {
        let student = StudentRecord {
            row_id: 5,
            first_name: "Ana".to_string(),
            ..StudentRecord::default()
        };
        let json = serde_json::to_value(StudentDetail::new(student, vec![])).unwrap();

        assert_eq!(json["rowId"], 5);
        assert_eq!(json["firstName"], "Ana");
        assert_eq!(json["totalCourses"], 0);
        assert_eq!(json["primaryTeacher"], "");
    }
}
