use actix_web::{get, post, put, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{require_admin, AuthenticatedUser},
    errors::AppError,
    models::dto::{ApiResponse, ListResponse},
};

#[post("/api/certificates/generate/{course_id}")]
pub async fn generate_certificate(
    state: web::Data<AppState>,
    course_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let certificate = state
        .certificate_service
        .generate(&course_id, &auth.0.sub)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::new(
        certificate,
        "Certificate generated successfully",
    )))
}

#[get("/api/certificates/mine")]
pub async fn list_my_certificates(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let certificates = state.certificate_service.list_for_user(&auth.0.sub).await?;
    Ok(HttpResponse::Ok().json(ListResponse::from(certificates)))
}

/// Public: anyone holding a certificate number may check it.
#[get("/api/certificates/verify/{certificate_number}")]
pub async fn verify_certificate(
    state: web::Data<AppState>,
    certificate_number: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let verification = state
        .certificate_service
        .verify(&certificate_number)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(verification, "Certificate is valid")))
}

#[get("/api/certificates/{id}")]
pub async fn get_certificate(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let certificate = state.certificate_service.get(&id, &auth.0).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(
        certificate,
        "Certificate retrieved successfully",
    )))
}

#[get("/api/admin/certificates")]
pub async fn list_all_certificates(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let certificates = state.certificate_service.list_all().await?;
    Ok(HttpResponse::Ok().json(ListResponse::from(certificates)))
}

#[put("/api/admin/certificates/{id}/revoke")]
pub async fn revoke_certificate(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let certificate = state.certificate_service.revoke(&id, &auth.0).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(
        certificate,
        "Certificate revoked successfully",
    )))
}
