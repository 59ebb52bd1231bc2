use std::collections::BTreeSet;

use sea_orm::{
    DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ResultEngine, courses, enrollments, util::parse_uuid};

use super::{Engine, with_tx};

/// Partition of requested courses into those the student already owns and
/// those still to be enrolled.
///
/// The two sets are disjoint and every id in them referenced an existing
/// course when resolved.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub already_enrolled: BTreeSet<Uuid>,
    pub to_enroll: BTreeSet<Uuid>,
}

impl Engine {
    pub(super) async fn resolve_enrollments(
        &self,
        db: &DatabaseTransaction,
        student_id: &str,
        course_ids: &[Uuid],
    ) -> ResultEngine<Resolution> {
        let requested: BTreeSet<String> = course_ids.iter().map(Uuid::to_string).collect();
        if requested.is_empty() {
            return Ok(Resolution::default());
        }

        let existing: Vec<String> = courses::Entity::find()
            .select_only()
            .column(courses::Column::Id)
            .filter(courses::Column::Id.is_in(requested.iter().cloned()))
            .into_tuple()
            .all(db)
            .await?;
        let owned: BTreeSet<String> = enrollments::Entity::find()
            .select_only()
            .column(enrollments::Column::CourseId)
            .filter(enrollments::Column::StudentId.eq(student_id.to_string()))
            .filter(enrollments::Column::CourseId.is_in(requested.iter().cloned()))
            .into_tuple::<String>()
            .all(db)
            .await?
            .into_iter()
            .collect();

        let mut resolution = Resolution::default();
        for id in existing {
            let course_id = parse_uuid(&id, "course")?;
            if owned.contains(&id) {
                resolution.already_enrolled.insert(course_id);
            } else {
                resolution.to_enroll.insert(course_id);
            }
        }
        Ok(resolution)
    }

    /// Splits `course_ids` into already-owned and enrollable courses for a
    /// student. Unknown ids and duplicates are dropped.
    pub async fn resolve(&self, student_id: &str, course_ids: &[Uuid]) -> ResultEngine<Resolution> {
        with_tx!(self, |db_tx| {
            self.resolve_enrollments(&db_tx, student_id, course_ids)
                .await
        })
    }

    /// Courses the student is enrolled in.
    pub async fn enrolled_course_ids(&self, student_id: &str) -> ResultEngine<Vec<Uuid>> {
        with_tx!(self, |db_tx| {
            let ids: Vec<String> = enrollments::Entity::find()
                .select_only()
                .column(enrollments::Column::CourseId)
                .filter(enrollments::Column::StudentId.eq(student_id.to_string()))
                .order_by_asc(enrollments::Column::EnrolledAt)
                .order_by_asc(enrollments::Column::CourseId)
                .into_tuple()
                .all(&db_tx)
                .await?;
            ids.iter()
                .map(|id| parse_uuid(id, "course"))
                .collect::<ResultEngine<Vec<_>>>()
        })
    }
}
