//! Student roster lookup
//!
//! Cascading filter resolution and multi-result-set query assembly over the
//! roster stored functions.

pub mod criteria;
pub mod grade;
pub mod mapping;
pub mod models;
pub mod resolver;
pub mod service;

pub use criteria::{FilterCriteria, IndividualSearchCriteria, ALL};
pub use models::{DropdownData, SearchResult, StudentDetail, StudentRecord};
pub use resolver::{FilterResolver, OptionSet};
pub use service::RosterService;
