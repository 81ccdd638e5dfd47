//! Row to record mapping
//!
//! Column names follow the pinned roster schema (`L_Name`/`F_Name`, text
//! `iDASHsid`). Missing or mistyped columns surface as mapping faults.

use crate::db::{ResultRow, SqlValue};
use crate::error::{coercion_error, AppError};
use crate::roster::grade::parse_grade;
use crate::roster::models::{
    CourseInfo, DropdownOption, StudentRecord, TeacherRecord, TeacherScheduleEntry,
};

/// Grade column stored as an integer or a descriptive label
fn grade(row: &ResultRow, column: &str) -> Result<i32, AppError> {
    match row.get(column)? {
        SqlValue::Null => Ok(0),
        SqlValue::Text(label) => Ok(parse_grade(label)),
        SqlValue::Float(f) => Err(coercion_error(format!(
            "column '{}' holds fractional grade {}",
            column, f
        ))),
        _ => row.int(column),
    }
}

pub fn map_option(row: &ResultRow) -> Result<DropdownOption, AppError> {
    Ok(DropdownOption::new(row.text("Value")?, row.text("Text")?))
}

/// Student columns shared by search and detail rows
pub fn map_student_base(row: &ResultRow) -> Result<StudentRecord, AppError> {
    let last_name = row.text("L_Name")?;
    let first_name = row.text("F_Name")?;

    Ok(StudentRecord {
        row_id: row.long("RowID")?,
        start_year: row.int("Start_Year")?,
        latest_student: row.flag("LatestStudent")?,
        idash_sid: row.opt_text("iDASHsid")?,
        full_name: format!("{} {}", first_name, last_name),
        last_name,
        first_name,
        grade: grade(row, "GRADE")?,
        school_id: row.int("SCHOOL")?,
        homeroom: row.text("HOMEROOM")?,
        sex: row.text("SEX")?,
        ethnic: row.text("ETHNIC")?,
        special_ed: row.text("SPECIAL_ED")?,
        esl_code: row.text("ESL_CODE")?,
        food_service_code: row.text("FOOD_SERVICE_CODE")?,
        home: row.text("Home")?,
        is_504: row.text("IS_504")?,
        school_name: row.text("SchoolName")?,
        teacher_name: String::new(),
        class_name: String::new(),
    })
}

/// Search rows also carry the joined teacher and class names
pub fn map_student(row: &ResultRow) -> Result<StudentRecord, AppError> {
    Ok(StudentRecord {
        teacher_name: row.text("TeacherName")?,
        class_name: row.text("ClassName")?,
        ..map_student_base(row)?
    })
}

pub fn map_course(row: &ResultRow) -> Result<CourseInfo, AppError> {
    Ok(CourseInfo {
        dash_cid: row.text("DASH_CID")?,
        course_name: row.text("CourseName")?,
        teacher_name: row.text("TeacherName")?,
        period: row.text("Period")?,
        days: row.text("Days")?,
        semester: row.text("Semester")?,
    })
}

pub fn map_teacher(row: &ResultRow) -> Result<TeacherRecord, AppError> {
    let last_name = row.text("LastName")?;
    let first_name = row.text("FirstName")?;
    let status = row.text("prem_act_stat")?;

    Ok(TeacherRecord {
        employee_id: row.int("EmployeeID")?,
        full_name: format!("{} {}", first_name, last_name),
        last_name,
        first_name,
        title: row.text("Title")?,
        email: row.text("gsdemail")?,
        school: row.text("School")?,
        dash_user_id: row.text("DashUserID")?,
        is_active: status == "A",
        status,
        role: row.text("URole")?,
        person_id: row.opt_int("PersonID")?,
        person_id_char: row.text("PersonIDChar")?,
    })
}

pub fn map_schedule(row: &ResultRow) -> Result<TeacherScheduleEntry, AppError> {
    Ok(TeacherScheduleEntry {
        id: row.int("id")?,
        dash_cid: row.text("DASH_CID")?,
        start_yy: row.int("START_YY")?,
        school: row.text("SCHOOL")?,
        short_name: row.text("SHORT_NAME")?,
        class_cd: row.text("CLASS_CD")?,
        section: row.text("SECTION")?,
        semester: row.text("SEMESTER")?,
        period: row.opt_int("PERIOD")?,
        days: row.text("DAYS")?,
        employee_id: row.int("EmployeeID")?,
        teacher_name: row.text("TeacherName")?,
        student_count: row.int("StudentCount")?,
    })
}
