use actix_web::{get, post, put, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{require_admin, AuthenticatedUser},
    errors::AppError,
    models::dto::{ApiResponse, ListResponse, ManualGradeRequest, SubmitAttemptRequest},
};

#[post("/api/quizzes/{id}/start")]
pub async fn start_quiz(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let started = state.attempt_service.start(&id, &auth.0.sub).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(started, "Quiz started successfully")))
}

#[post("/api/attempts/{attempt_id}/submit")]
pub async fn submit_attempt(
    state: web::Data<AppState>,
    attempt_id: web::Path<String>,
    request: web::Json<SubmitAttemptRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let summary = state
        .attempt_service
        .submit(&attempt_id, &auth.0.sub, request.into_inner())
        .await?;
    let message = summary.message();
    Ok(HttpResponse::Ok().json(ApiResponse::new(summary, message)))
}

#[get("/api/quizzes/{quiz_id}/attempts")]
pub async fn list_my_attempts(
    state: web::Data<AppState>,
    quiz_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let attempts = state
        .attempt_service
        .list_user_attempts(&quiz_id, &auth.0.sub)
        .await?;
    Ok(HttpResponse::Ok().json(ListResponse::from(attempts)))
}

#[get("/api/admin/quizzes/{quiz_id}/attempts")]
pub async fn list_quiz_attempts(
    state: web::Data<AppState>,
    quiz_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let attempts = state.attempt_service.list_quiz_attempts(&quiz_id).await?;
    Ok(HttpResponse::Ok().json(ListResponse::from(attempts)))
}

#[put("/api/admin/attempts/{attempt_id}/answers/{question_id}/grade")]
pub async fn grade_answer(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    request: web::Json<ManualGradeRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let (attempt_id, question_id) = path.into_inner();
    let attempt = state
        .attempt_service
        .grade_answer(&attempt_id, &question_id, request.points_earned, &auth.0)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(attempt, "Answer graded successfully")))
}
