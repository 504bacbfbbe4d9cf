pub mod certificate_service;
pub mod course_grade;
pub mod grading;
pub mod quiz_attempt_service;
pub mod quiz_service;

pub use certificate_service::{CertificateRepositories, CertificateService};
pub use grading::GradingEngine;
pub use quiz_attempt_service::QuizAttemptService;
pub use quiz_service::QuizService;
