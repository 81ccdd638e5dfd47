//! Cascading filter resolution
//!
//! Each dropdown level is narrowed by the dimensions already chosen above it.
//! Resolution never fails: a lookup that errors or comes back empty yields
//! the lone "All" option so the client always has something to render.

use crate::db::queries::{
    P_GRADE, P_LEVEL, P_SCHOOL, P_TEACHER, SP_GET_CASCADING_DROPDOWN_DATA,
    SP_GET_STUDENT_DROPDOWN_DATA,
};
use crate::db::{collect_set, param, query_set, RosterStore};
use crate::error::{ApiResult, AppError};
use crate::roster::criteria::{Dimension, ALL};
use crate::roster::mapping::map_option;
use crate::roster::models::{DropdownData, DropdownOption};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error};

/// A non-empty, ordered option list for one dimension
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct OptionSet {
    options: Vec<DropdownOption>,
    #[serde(skip)]
    fallback: bool,
}

impl OptionSet {
    /// The single "All <level>" option
    pub fn fallback(level: &str) -> Self {
        Self {
            options: vec![DropdownOption::new(ALL, format!("All {}", level))],
            fallback: true,
        }
    }

    fn from_lookup(level: &str, options: Vec<DropdownOption>) -> Self {
        if options.is_empty() {
            Self::fallback(level)
        } else {
            Self {
                options,
                fallback: false,
            }
        }
    }

    /// Whether the lookup failed or came back empty
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    #[cfg(test)]
    pub fn options(&self) -> &[DropdownOption] {
        &self.options
    }

    #[cfg(test)]
    pub fn into_vec(self) -> Vec<DropdownOption> {
        self.options
    }
}

/// A parent selection left blank or at its sentinel is not chosen
fn chosen(dimension: Dimension, value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !dimension.is_sentinel(v))
}

pub struct FilterResolver {
    store: Arc<dyn RosterStore>,
}

impl FilterResolver {
    pub fn new(store: Arc<dyn RosterStore>) -> Self {
        Self { store }
    }

    /// Options for `level`, given the parent selections made so far
    pub async fn cascading_options(
        &self,
        level: &str,
        school: Option<&str>,
        grade: Option<&str>,
        teacher: Option<&str>,
    ) -> OptionSet {
        let school = chosen(Dimension::School, school);
        let grade = chosen(Dimension::Grade, grade);
        let teacher = chosen(Dimension::Teacher, teacher);

        match self.lookup(level, school, grade, teacher).await {
            Ok(options) => {
                debug!(level, count = options.len(), "Resolved cascading options");
                OptionSet::from_lookup(level, options)
            }
            Err(e) => {
                error!(
                    level,
                    school = ?school,
                    grade = ?grade,
                    teacher = ?teacher,
                    error = %e,
                    "Error getting cascading dropdown data"
                );
                OptionSet::fallback(level)
            }
        }
    }

    async fn lookup(
        &self,
        level: &str,
        school: Option<&str>,
        grade: Option<&str>,
        teacher: Option<&str>,
    ) -> Result<Vec<DropdownOption>, AppError> {
        let params = [
            param(P_LEVEL, level),
            param(P_SCHOOL, school),
            param(P_GRADE, grade),
            param(P_TEACHER, teacher),
        ];

        query_set(self.store.as_ref(), SP_GET_CASCADING_DROPDOWN_DATA, &params, map_option).await
    }

    /// Unfiltered schools, grades, teachers and classes in one round trip
    pub async fn dropdown_data(&self) -> ApiResult<DropdownData> {
        let mut reader = self.store.open(SP_GET_STUDENT_DROPDOWN_DATA, &[]).await?;
        let mut data = DropdownData::default();

        data.schools = collect_set(reader.as_mut(), map_option).await?;
        for list in [&mut data.grades, &mut data.teachers, &mut data.classes] {
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
    use crate::db::reader::Param;
    use crate::roster::mapping::fixtures::option_row;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_options_come_back_in_store_order() {
        let store = Arc::new(FakeStore::with_sets(vec![vec![
            option_row("Ortiz", "Ortiz, Sam"),
            option_row("Adams", "Adams, Lee"),
        ]]));
        let resolver = FilterResolver::new(store.clone());

        let options = resolver
            .cascading_options("Teachers", Some("MMS"), Some("6"), None)
            .await;

        assert_eq!(
            options.into_vec(),
            vec![
                DropdownOption::new("Ortiz", "Ortiz, Sam"),
                DropdownOption::new("Adams", "Adams, Lee"),
            ]
        );
        assert_eq!(store.log.readers_closed(), 1);
    }

    #[tokio::test]
    async fn test_absent_parents_are_sent_as_null() {
        let store = Arc::new(FakeStore::with_sets(vec![vec![option_row("6", "Grade 6")]]));
        let resolver = FilterResolver::new(store.clone());

        resolver.cascading_options("Grades", Some("MMS"), Some(" "), None).await;

        let params = store.log.last_params();
        assert_eq!(params[0].value, Param::Text(Some("Grades".to_string())));
        assert_eq!(params[1].value, Param::Text(Some("MMS".to_string())));
        assert_eq!(params[2].value, Param::Text(None));
        assert_eq!(params[3].value, Param::Text(None));
    }

    #[tokio::test]
    async fn test_sentinel_parents_are_sent_as_null() {
        let store = Arc::new(FakeStore::with_sets(vec![vec![option_row("Okafor", "Okafor, Dana")]]));
        let resolver = FilterResolver::new(store.clone());

        let options = resolver
            .cascading_options("Teachers", Some("All"), Some("6"), Some(" All "))
            .await;

        let params = store.log.last_params();
        assert_eq!(params[1].value, Param::Text(None));
        assert_eq!(params[2].value, Param::Text(Some("6".to_string())));
        assert_eq!(params[3].value, Param::Text(None));
        assert!(!options.is_fallback());
    }

    #[tokio::test]
    async fn test_real_all_option_is_not_a_fallback() {
        let store = FakeStore::with_sets(vec![vec![option_row("All", "All Teachers")]]);
        let resolver = FilterResolver::new(Arc::new(store));

        let options = resolver.cascading_options("Teachers", None, None, None).await;

        assert!(!options.is_fallback());
        assert_eq!(options.options(), &[DropdownOption::new("All", "All Teachers")]);
    }

    #[tokio::test]
    async fn test_store_failure_yields_single_all_option() {
        let resolver = FilterResolver::new(Arc::new(FakeStore::failing("connection refused")));

        let options = resolver.cascading_options("Classes", None, None, None).await;

        assert!(options.is_fallback());
        assert_eq!(
            options.options(),
            &[DropdownOption::new("All", "All Classes")]
        );
    }

    #[tokio::test]
    async fn test_mid_read_failure_yields_fallback() {
        let store = FakeStore::with_sets(vec![vec![
            option_row("A", "A"),
            option_row("B", "B"),
        ]])
        .fail_after_rows(1);
        let resolver = FilterResolver::new(Arc::new(store));

        let options = resolver.cascading_options("Teachers", None, None, None).await;

        assert_eq!(options.options(), &[DropdownOption::new("All", "All Teachers")]);
    }

    #[tokio::test]
    async fn test_empty_lookup_yields_fallback() {
        let resolver = FilterResolver::new(Arc::new(FakeStore::with_sets(vec![vec![]])));

        let options = resolver.cascading_options("Grades", Some("MMS"), None, None).await;

        assert!(options.is_fallback());
        assert_eq!(options.options()[0].text, "All Grades");
    }

    #[tokio::test]
    async fn test_dropdown_data_reads_sets_in_order() {
        let store = FakeStore::with_sets(vec![
            vec![option_row("MMS", "Mesa Middle")],
            vec![option_row("6", "Grade 6"), option_row("7", "Grade 7")],
            vec![option_row("Okafor", "Okafor, Dana")],
            vec![option_row("M6", "Math 6")],
        ]);
        let resolver = FilterResolver::new(Arc::new(store));

        let data = resolver.dropdown_data().await.unwrap();

        assert_eq!(data.schools.len(), 1);
        assert_eq!(data.grades.len(), 2);
        assert_eq!(data.teachers[0].value, "Okafor");
        assert_eq!(data.classes[0].text, "Math 6");
        assert!(data.subjects.is_empty());
    }

    #[tokio::test]
    async fn test_dropdown_data_propagates_faults() {
        let resolver = FilterResolver::new(Arc::new(FakeStore::failing("timeout expired")));
        assert!(resolver.dropdown_data().await.is_err());
    }
}
