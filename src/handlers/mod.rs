pub mod attempt_handler;
pub mod certificate_handler;
pub mod health_handler;
pub mod quiz_handler;

use actix_web::web;

use crate::errors::AppError;

/// Malformed bodies surface as validation errors instead of actix's plain
/// text responses.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(512 * 1024)
        .error_handler(|err, _req| {
            AppError::validation(format!("Invalid request body: {}", err)).into()
        })
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        AppError::validation(format!("Invalid path parameter: {}", err)).into()
    })
}

/// Registers every route. Literal segments go before the `{id}` routes
/// they would otherwise be captured by.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .service(health_handler::health_check)
        .service(health_handler::health_check_live)
        .service(health_handler::health_check_ready)
        .service(quiz_handler::list_course_quizzes)
        .service(quiz_handler::get_quiz)
        .service(attempt_handler::start_quiz)
        .service(attempt_handler::list_my_attempts)
        .service(attempt_handler::submit_attempt)
        .service(quiz_handler::list_admin_course_quizzes)
        .service(quiz_handler::create_quiz)
        .service(quiz_handler::update_quiz)
        .service(quiz_handler::delete_quiz)
        .service(attempt_handler::list_quiz_attempts)
        .service(attempt_handler::grade_answer)
        .service(certificate_handler::generate_certificate)
        .service(certificate_handler::list_my_certificates)
        .service(certificate_handler::verify_certificate)
        .service(certificate_handler::get_certificate)
        .service(certificate_handler::list_all_certificates)
        .service(certificate_handler::revoke_certificate);
}
