use sea_orm::{Statement, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{MoneyCents, ResultEngine, Role, util::parse_uuid};

use super::{Engine, with_tx};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseEarnings {
    pub course_id: Uuid,
    pub title: String,
    pub price: MoneyCents,
    pub student_count: u64,
    /// Sum of the instructor shares paid for this course.
    pub revenue: MoneyCents,
}

/// Dashboard view of an instructor's income.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructorEarnings {
    pub instructor_id: String,
    pub balance: MoneyCents,
    pub total_revenue: MoneyCents,
    pub total_withdrawn: MoneyCents,
    pub courses: Vec<CourseEarnings>,
}

impl Engine {
    pub async fn instructor_earnings(
        &self,
        instructor_id: &str,
    ) -> ResultEngine<InstructorEarnings> {
        with_tx!(self, |db_tx| {
            let instructor = self
                .require_role(&db_tx, instructor_id, Role::Instructor)
                .await?;

            let backend = self.database.get_database_backend();
            let stmt = Statement::from_sql_and_values(
                backend,
                "SELECT c.id AS course_id, c.title AS title, c.price_minor AS price_minor, \
                        COUNT(p.id) AS student_count, \
                        COALESCE(SUM(p.instructor_share_minor), 0) AS revenue \
                 FROM courses c \
                 LEFT JOIN payments p ON p.course_id = c.id \
                 WHERE c.instructor_id = ? \
                 GROUP BY c.id, c.title, c.price_minor, c.created_at \
                 ORDER BY c.created_at ASC, c.id ASC",
                vec![instructor_id.into()],
            );
            let rows = db_tx.query_all(stmt).await?;

            let mut courses = Vec::with_capacity(rows.len());
            for row in rows {
                let course_id: String = row.try_get("", "course_id")?;
                let student_count: i64 = row.try_get("", "student_count")?;
                courses.push(CourseEarnings {
                    course_id: parse_uuid(&course_id, "course")?,
                    title: row.try_get("", "title")?,
                    price: MoneyCents::new(row.try_get("", "price_minor")?),
                    student_count: u64::try_from(student_count).unwrap_or_default(),
                    revenue: MoneyCents::new(row.try_get("", "revenue")?),
                });
            }

            let total_withdrawn = self
                .sum_minor(
                    &db_tx,
                    "SELECT COALESCE(SUM(amount_minor), 0) AS sum \
                     FROM withdrawals WHERE instructor_id = ?",
                    vec![instructor_id.into()],
                )
                .await?;

            Ok(InstructorEarnings {
                instructor_id: instructor.id,
                balance: instructor.balance,
                total_revenue: courses.iter().map(|c| c.revenue).sum(),
                total_withdrawn: MoneyCents::new(total_withdrawn),
                courses,
            })
        })
    }
}
