//! Roster query assembly
//!
//! Every operation issues exactly one stored query, walks its result sets in
//! order and maps rows into records. Faults never escape: they are logged and
//! folded into a failed envelope, a zero count or a missing detail.

use crate::db::queries::{
    P_PROGRAM_TYPE, P_STUDENT_ID, SP_GET_STUDENT_COUNT, SP_GET_STUDENT_DETAIL,
    SP_SEARCH_INDIVIDUAL_STUDENT, SP_SEARCH_STUDENTS, SP_SEARCH_STUDENTS_BY_PROGRAM,
};
use crate::db::{collect_set, param, query_set, RosterStore};
use crate::error::AppError;
use crate::roster::criteria::{Dimension, FilterCriteria, IndividualSearchCriteria, RosterPredicate};
use crate::roster::mapping::{map_course, map_student, map_student_base};
use crate::roster::models::{SearchResult, StudentDetail, StudentRecord};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Tables the roster functions read from
const REQUIRED_TABLES: [(&str, &str); 4] = [
    ("Student", "student"),
    ("Users", "users"),
    ("TeacherSchedule", "teacher_schedule"),
    ("TeacherStudentSchedule", "teacher_student_schedule"),
];

pub struct RosterService {
    store: Arc<dyn RosterStore>,
}

impl RosterService {
    pub fn new(store: Arc<dyn RosterStore>) -> Self {
        Self { store }
    }

    /// Bulk search over the constrained dimensions of `criteria`
    pub async fn search(&self, criteria: &FilterCriteria) -> SearchResult<StudentRecord> {
        let predicate = criteria.predicate();
        debug!(constraints = ?predicate.constraints(), "Searching students");

        let params = predicate.to_params();
        match query_set(self.store.as_ref(), SP_SEARCH_STUDENTS, &params, map_student).await {
            Ok(records) => {
                info!(count = records.len(), "Student search completed");
                SearchResult::success(records, "Search completed successfully")
            }
            Err(e) => {
                error!(criteria = ?criteria, error = %e, "Error searching students");
                SearchResult::error(e)
            }
        }
    }

    /// Number of students matching `criteria`, 0 on any fault
    pub async fn count(&self, criteria: &FilterCriteria) -> i64 {
        let params = criteria.predicate().to_params();

        match self.store.scalar(SP_GET_STUDENT_COUNT, &params).await {
            Ok(count) => count.unwrap_or(0),
            Err(e) => {
                error!(criteria = ?criteria, error = %e, "Error getting student count");
                0
            }
        }
    }

    /// Free-text lookup by name, id or email
    pub async fn search_individual(
        &self,
        criteria: &IndividualSearchCriteria,
    ) -> SearchResult<StudentRecord> {
        let (term, search_type) = match criteria.parse() {
            Ok(parsed) => parsed,
            Err(message) => {
                warn!(search_type = %criteria.search_type, "Rejected individual search: {}", message);
                return SearchResult::failure(message);
            }
        };

        let params = IndividualSearchCriteria::to_params(&term, search_type);
        match query_set(
            self.store.as_ref(),
            SP_SEARCH_INDIVIDUAL_STUDENT,
            &params,
            map_student,
        )
        .await
        {
            Ok(records) => {
                info!(count = records.len(), %search_type, "Individual search completed");
                SearchResult::success(records, "Individual search completed successfully")
            }
            Err(e) => {
                error!(term = %term, %search_type, error = %e, "Error in individual search");
                SearchResult::error(e)
            }
        }
    }

    /// Single student by row id, picked out of an unconstrained search
    pub async fn student(&self, row_id: i64) -> Option<StudentRecord> {
        match query_set(self.store.as_ref(), SP_SEARCH_STUDENTS, &[], map_student).await {
            Ok(records) => {
                let found = records.into_iter().find(|s| s.row_id == row_id);
                if found.is_none() {
                    debug!(row_id, "Student not found");
                }
                found
            }
            Err(e) => {
                error!(row_id, error = %e, "Error getting student");
                None
            }
        }
    }

    /// Student row plus enrolled courses, `None` when not found or on fault
    pub async fn detail(&self, student_id: i32) -> Option<StudentDetail> {
        match self.read_detail(student_id).await {
            Ok(detail) => detail,
            Err(e) => {
                error!(student_id, error = %e, "Error getting student detail");
                None
            }
        }
    }

    async fn read_detail(&self, student_id: i32) -> Result<Option<StudentDetail>, AppError> {
        let params = [param(P_STUDENT_ID, student_id)];
        let mut reader = self.store.open(SP_GET_STUDENT_DETAIL, &params).await?;

        let student = match reader.next_row().await? {
            Some(row) => map_student_base(&row)?,
            None => {
                debug!(student_id, "Student not found");
                reader.close().await?;
                return Ok(None);
            }
        };

        let courses = if reader.next_result().await? {
            collect_set(reader.as_mut(), map_course).await?
        } else {
            Vec::new()
        };

        reader.close().await?;
        Ok(Some(StudentDetail::new(student, courses)))
    }

    /// Students enrolled in a program, optionally narrowed by school and grade
    pub async fn search_by_program(
        &self,
        program_type: &str,
        school: &str,
        grade: &str,
    ) -> SearchResult<StudentRecord> {
        let predicate =
            RosterPredicate::build([(Dimension::School, school), (Dimension::Grade, grade)]);

        let mut params = vec![param(P_PROGRAM_TYPE, program_type)];
        params.extend(predicate.to_params());

        match query_set(
            self.store.as_ref(),
            SP_SEARCH_STUDENTS_BY_PROGRAM,
            &params,
            map_student,
        )
        .await
        {
            Ok(records) => {
                info!(program_type, count = records.len(), "Program search completed");
                SearchResult::success(
                    records,
                    format!("Search by {} program completed successfully", program_type),
                )
            }
            Err(e) => {
                error!(program_type, school, grade, error = %e, "Error searching by program");
                SearchResult::error(e)
            }
        }
    }

    /// Connectivity and schema report for troubleshooting
    pub async fn diagnose(&self) -> BTreeMap<String, String> {
        let mut report = BTreeMap::new();

        match self.store.catalog().await {
            Ok(catalog) => {
                report.insert("DatabaseConnection".to_string(), "SUCCESS".to_string());
                report.insert("DatabaseName".to_string(), catalog.database);
                report.insert("AllTables".to_string(), catalog.tables.join(", "));
                report.insert("TableCount".to_string(), catalog.tables.len().to_string());

                for (key, table) in REQUIRED_TABLES {
                    let present = catalog.tables.iter().any(|t| t.eq_ignore_ascii_case(table));
                    let status = if present { "EXISTS" } else { "MISSING" };
                    report.insert(key.to_string(), status.to_string());
                }
            }
            Err(e) => {
                error!(error = %e, "Database diagnosis failed");
                report.insert("DatabaseConnection".to_string(), "FAILED".to_string());
                report.insert("Error".to_string(), e.to_string());
            }
        }

        report
    }
}
