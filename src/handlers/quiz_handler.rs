use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{require_admin, AuthenticatedUser, OptionalUser},
    errors::AppError,
    models::dto::{
        ApiResponse, CreateQuizRequest, ListResponse, MessageResponse, UpdateQuizRequest,
    },
};

#[get("/api/quizzes/course/{course_id}")]
pub async fn list_course_quizzes(
    state: web::Data<AppState>,
    course_id: web::Path<String>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let quizzes = state.quiz_service.list_for_course(&course_id).await?;
    Ok(HttpResponse::Ok().json(ListResponse::from(quizzes)))
}

#[get("/api/quizzes/{id}")]
pub async fn get_quiz(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: OptionalUser,
) -> Result<HttpResponse, AppError> {
    let quiz = state.quiz_service.get_quiz(&id, auth.0.as_ref()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(quiz, "Quiz retrieved successfully")))
}

#[get("/api/admin/quizzes/course/{course_id}")]
pub async fn list_admin_course_quizzes(
    state: web::Data<AppState>,
    course_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let quizzes = state.quiz_service.list_for_admin(&course_id).await?;
    Ok(HttpResponse::Ok().json(ListResponse::from(quizzes)))
}

#[post("/api/admin/quizzes")]
pub async fn create_quiz(
    state: web::Data<AppState>,
    request: web::Json<CreateQuizRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let quiz = state
        .quiz_service
        .create_quiz(request.into_inner(), &auth.0.sub)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::new(quiz, "Quiz created successfully")))
}

#[put("/api/admin/quizzes/{id}")]
pub async fn update_quiz(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<UpdateQuizRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let quiz = state
        .quiz_service
        .update_quiz(&id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(quiz, "Quiz updated successfully")))
}

#[delete("/api/admin/quizzes/{id}")]
pub async fn delete_quiz(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    state.quiz_service.delete_quiz(&id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Quiz deleted successfully".to_string(),
    }))
}
