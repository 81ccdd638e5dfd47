//! Search criteria and predicate assembly
//!
//! A dimension left at its sentinel value is unconstrained: it is dropped
//! from the parameter list so the stored function's default disables that
//! predicate, instead of being matched as a literal.

use crate::db::queries::{P_CLASS, P_GRADE, P_SCHOOL, P_SEARCH_TERM, P_SEARCH_TYPE, P_TEACHER};
use crate::db::{param, NamedParam};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// "No constraint" value for every dimension
pub const ALL: &str = "All";

/// Default class sentinel sent by the class dropdown
pub const ALL_CLASSES: &str = "All Classes Selected";

/// One facet of the roster filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    School,
    Grade,
    Teacher,
    Class,
}

impl Dimension {
    pub fn param_name(self) -> &'static str {
        match self {
            Dimension::School => P_SCHOOL,
            Dimension::Grade => P_GRADE,
            Dimension::Teacher => P_TEACHER,
            Dimension::Class => P_CLASS,
        }
    }

    /// Whether `value` means "unconstrained" for this dimension
    pub fn is_sentinel(self, value: &str) -> bool {
        let value = value.trim();
        value.is_empty()
            || value == ALL
            || (self == Dimension::Class && value == ALL_CLASSES)
    }
}

/// Bulk roster search criteria
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    pub school: String,
    pub grade: String,
    pub teacher: String,
    pub class: String,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            school: ALL.to_string(),
            grade: ALL.to_string(),
            teacher: ALL.to_string(),
            class: ALL_CLASSES.to_string(),
        }
    }
}

impl FilterCriteria {
    pub fn value(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::School => &self.school,
            Dimension::Grade => &self.grade,
            Dimension::Teacher => &self.teacher,
            Dimension::Class => &self.class,
        }
    }

    pub fn predicate(&self) -> RosterPredicate {
        RosterPredicate::build(
            [
                Dimension::School,
                Dimension::Grade,
                Dimension::Teacher,
                Dimension::Class,
            ]
            .into_iter()
            .map(|d| (d, self.value(d))),
        )
    }
}

/// The constrained dimensions of a search, in dimension order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RosterPredicate {
    constraints: Vec<(Dimension, String)>,
}

impl RosterPredicate {
    pub fn build<'a>(values: impl IntoIterator<Item = (Dimension, &'a str)>) -> Self {
        let constraints = values
            .into_iter()
            .filter(|(dimension, value)| !dimension.is_sentinel(value))
            .map(|(dimension, value)| (dimension, value.trim().to_string()))
            .collect();

        Self { constraints }
    }

    #[cfg(test)]
    pub fn is_unconstrained(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn constraints(&self) -> &[(Dimension, String)] {
        &self.constraints
    }

    pub fn to_params(&self) -> Vec<NamedParam> {
        self.constraints
            .iter()
            .map(|(dimension, value)| param(dimension.param_name(), value.as_str()))
            .collect()
    }
}

/// Free-text lookup discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchType {
    Name,
    Id,
    Email,
}

impl SearchType {
    /// Value understood by the stored function
    pub fn as_str(self) -> &'static str {
        match self {
            SearchType::Name => "Name",
            SearchType::Id => "ID",
            SearchType::Email => "Email",
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(SearchType::Name),
            "id" => Ok(SearchType::Id),
            "email" => Ok(SearchType::Email),
            other => Err(format!(
                "Unsupported search type '{}' (expected Name, ID or Email)",
                other
            )),
        }
    }
}

/// Single-student free-text search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct IndividualSearchCriteria {
    #[validate(length(max = 200, message = "Search term must be at most 200 characters"))]
    pub search_term: String,
    pub search_type: String,
}

impl Default for IndividualSearchCriteria {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            search_type: SearchType::Name.as_str().to_string(),
        }
    }
}

impl IndividualSearchCriteria {
    /// Check the term and discriminator before anything is sent to the store
    pub fn parse(&self) -> Result<(String, SearchType), String> {
        self.validate().map_err(|e| e.to_string())?;

        let term = self.search_term.trim();
        if term.is_empty() {
            return Err("Search term is required".to_string());
        }

        let search_type = self.search_type.parse::<SearchType>()?;
        Ok((term.to_string(), search_type))
    }

    pub fn to_params(term: &str, search_type: SearchType) -> Vec<NamedParam> {
        vec![
            param(P_SEARCH_TERM, term),
            param(P_SEARCH_TYPE, search_type.as_str()),
        ]
    }
}
