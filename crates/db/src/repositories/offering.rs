//! Offering repository.

use crate::entities::{Offering, OfferingStudent, offering, offering_student};
use campus_common::{AppError, AppResult};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;

/// Repository for course offerings and their student rosters.
#[derive(Clone)]
pub struct OfferingRepository {
    db: Arc<DatabaseConnection>,
}

impl OfferingRepository {
    /// Create a new offering repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an offering by its section identifier.
    pub async fn find_by_section(&self, course_sec_id: &str) -> AppResult<Option<offering::Model>> {
        Offering::find()
            .filter(offering::Column::CourseSecId.eq(course_sec_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an offering by its section identifier, returning error if not found.
    pub async fn get_by_section(&self, course_sec_id: &str) -> AppResult<offering::Model> {
        self.find_by_section(course_sec_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Offering not found: {course_sec_id}")))
    }

    /// IDs of the users enrolled as students, in enrollment order.
    pub async fn find_student_ids(&self, offering_id: &str) -> AppResult<Vec<String>> {
        let students = OfferingStudent::find()
            .filter(offering_student::Column::OfferingId.eq(offering_id))
            .order_by_asc(offering_student::Column::EnrolledAt)
            .order_by_asc(offering_student::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(students.into_iter().map(|s| s.user_id).collect())
    }
}
