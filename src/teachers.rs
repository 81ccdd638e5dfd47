//! Teacher directory
//!
//! Staff lookups over the same stored-function boundary as the student
//! roster, with the same envelope and coercion rules.

use crate::db::queries::{
    P_EMPLOYEE_ID, SP_GET_ALL_TEACHERS, SP_GET_TEACHER_BY_ID, SP_GET_TEACHER_DROPDOWN_DATA,
    SP_GET_TEACHER_SCHEDULE,
};
use crate::db::{collect_set, param, query_set, RosterStore};
use crate::error::{ApiResult, AppError};
use crate::roster::mapping::{map_option, map_schedule, map_teacher};
use crate::roster::models::{DropdownData, SearchResult, TeacherRecord, TeacherScheduleEntry};
use std::sync::Arc;
use tracing::{error, info};

pub struct TeacherDirectory {
    store: Arc<dyn RosterStore>,
}

impl TeacherDirectory {
    pub fn new(store: Arc<dyn RosterStore>) -> Self {
        Self { store }
    }

    pub async fn all_teachers(&self) -> SearchResult<TeacherRecord> {
        match query_set(self.store.as_ref(), SP_GET_ALL_TEACHERS, &[], map_teacher).await {
            Ok(teachers) => {
                info!(count = teachers.len(), "Teachers retrieved");
                SearchResult::success(teachers, "Teachers retrieved successfully")
            }
            Err(e) => {
                error!(error = %e, "Error getting teachers");
                SearchResult::error(e)
            }
        }
    }

    pub async fn teacher_schedule(&self, employee_id: i32) -> SearchResult<TeacherScheduleEntry> {
        let params = [param(P_EMPLOYEE_ID, employee_id)];

        match query_set(self.store.as_ref(), SP_GET_TEACHER_SCHEDULE, &params, map_schedule).await {
            Ok(entries) => SearchResult::success(entries, "Teacher schedule retrieved successfully"),
            Err(e) => {
                error!(employee_id, error = %e, "Error getting teacher schedule");
                SearchResult::error(e)
            }
        }
    }

    /// First matching teacher, `None` when absent or on fault
    pub async fn teacher_by_id(&self, employee_id: i32) -> Option<TeacherRecord> {
        match self.read_teacher(employee_id).await {
            Ok(teacher) => teacher,
            Err(e) => {
                error!(employee_id, error = %e, "Error getting teacher by id");
                None
            }
        }
    }

    async fn read_teacher(&self, employee_id: i32) -> Result<Option<TeacherRecord>, AppError> {
        let params = [param(P_EMPLOYEE_ID, employee_id)];
        let mut reader = self.store.open(SP_GET_TEACHER_BY_ID, &params).await?;

        let teacher = match reader.next_row().await? {
            Some(row) => Some(map_teacher(&row)?),
            None => None,
        };

        reader.close().await?;
        Ok(teacher)
    }

    /// Schools, subjects and grades for the teacher filters
    pub async fn teacher_dropdown_data(&self) -> ApiResult<DropdownData> {
        let mut reader = self.store.open(SP_GET_TEACHER_DROPDOWN_DATA, &[]).await?;
        let mut data = DropdownData::default();

        data.schools = collect_set(reader.as_mut(), map_option).await?;
        for list in [&mut data.subjects, &mut data.grades] {
            if !reader.next_result().await? {
                break;
            }
            *list = collect_set(reader.as_mut(), map_option).await?;
        }

        reader.close().await?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::FakeStore;
    use crate::db::{ResultRow, SqlValue};
    use crate::roster::mapping::fixtures::{option_row, teacher_row};
    use pretty_assertions::assert_eq;

    fn schedule_row(id: i32, period: impl Into<SqlValue>) -> ResultRow {
        ResultRow::new()
            .with("id", id)
            .with("DASH_CID", format!("C{}", id))
            .with("START_YY", 2024i32)
            .with("SCHOOL", "MMS")
            .with("SHORT_NAME", "Math 6")
            .with("CLASS_CD", "M6")
            .with("SECTION", "01")
            .with("SEMESTER", SqlValue::Null)
            .with("PERIOD", period)
            .with("DAYS", "MTWRF")
            .with("EmployeeID", 11i32)
            .with("TeacherName", "Okafor, Dana")
            .with("StudentCount", 27i32)
    }

    #[tokio::test]
    async fn test_all_teachers() {
        let store = FakeStore::with_sets(vec![vec![teacher_row(11, "A"), teacher_row(12, "I")]]);
        let directory = TeacherDirectory::new(Arc::new(store));

        let result = directory.all_teachers().await;

        assert!(result.is_success());
        assert_eq!(result.message(), "Teachers retrieved successfully");
        assert_eq!(result.total_count(), 2);
        assert!(result.records()[0].is_active);
        assert!(!result.records()[1].is_active);
    }

    #[tokio::test]
    async fn test_all_teachers_failure() {
        let directory = TeacherDirectory::new(Arc::new(FakeStore::failing("connection refused")));

        let result = directory.all_teachers().await;

        assert!(!result.is_success());
        assert!(result.records().is_empty());
    }

    #[tokio::test]
    async fn test_schedule_passes_employee_id() {
        let store = Arc::new(FakeStore::with_sets(vec![vec![
            schedule_row(1, 2i32),
            schedule_row(2, SqlValue::Null),
        ]]));
        let directory = TeacherDirectory::new(store.clone());

        let result = directory.teacher_schedule(11).await;

        assert_eq!(result.total_count(), 2);
        assert_eq!(result.records()[0].period, Some(2));
        assert_eq!(result.records()[1].period, None);
        assert_eq!(result.records()[0].semester, "");
        assert_eq!(store.log.last_params(), vec![param(P_EMPLOYEE_ID, 11)]);
    }

    #[tokio::test]
    async fn test_teacher_by_id() {
        let store = FakeStore::with_sets(vec![vec![teacher_row(11, "A")]]);
        let directory = TeacherDirectory::new(Arc::new(store));
        assert_eq!(directory.teacher_by_id(11).await.unwrap().employee_id, 11);

        let directory = TeacherDirectory::new(Arc::new(FakeStore::with_sets(vec![vec![]])));
        assert!(directory.teacher_by_id(99).await.is_none());

        let directory = TeacherDirectory::new(Arc::new(FakeStore::failing("timeout expired")));
        assert!(directory.teacher_by_id(11).await.is_none());
    }

    #[tokio::test]
    async fn test_dropdown_sets_are_schools_subjects_grades() {
        let store = FakeStore::with_sets(vec![
            vec![option_row("MMS", "Mesa Middle")],
            vec![option_row("MATH", "Mathematics"), option_row("SCI", "Science")],
            vec![option_row("6", "Grade 6")],
        ]);
        let directory = TeacherDirectory::new(Arc::new(store));

        let data = directory.teacher_dropdown_data().await.unwrap();

        assert_eq!(data.schools.len(), 1);
        assert_eq!(data.subjects.len(), 2);
        assert_eq!(data.grades[0].value, "6");
        assert!(data.teachers.is_empty());
        assert!(data.classes.is_empty());
    }
}
