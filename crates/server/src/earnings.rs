use api_types::earnings::{CourseEarningsView, EarningsResponse};
use axum::{Extension, Json, extract::State};
use engine::User;

use crate::{ServerError, server::ServerState};

pub async fn get_earnings(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<EarningsResponse>, ServerError> {
    let earnings = state.engine.instructor_earnings(&user.id).await?;

    Ok(Json(EarningsResponse {
        balance_minor: earnings.balance.cents(),
        total_revenue_minor: earnings.total_revenue.cents(),
        total_withdrawn_minor: earnings.total_withdrawn.cents(),
        courses: earnings
            .courses
            .into_iter()
            .map(|c| CourseEarningsView {
                course_id: c.course_id,
                title: c.title,
                price_minor: c.price.cents(),
                student_count: c.student_count,
                revenue_minor: c.revenue.cents(),
            })
            .collect(),
    }))
}
