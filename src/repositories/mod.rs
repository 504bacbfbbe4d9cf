pub mod certificate_repository;
pub mod course_repository;
pub mod quiz_attempt_repository;
pub mod quiz_repository;
pub mod user_repository;

pub use certificate_repository::{CertificateRepository, MongoCertificateRepository};
pub use course_repository::{CourseRepository, MongoCourseRepository};
pub use quiz_attempt_repository::{MongoQuizAttemptRepository, QuizAttemptRepository};
pub use quiz_repository::{MongoQuizRepository, QuizRepository};
pub use user_repository::{MongoUserRepository, UserRepository};

#[cfg(test)]
pub use certificate_repository::MockCertificateRepository;
#[cfg(test)]
pub use course_repository::MockCourseRepository;
#[cfg(test)]
pub use quiz_attempt_repository::MockQuizAttemptRepository;
#[cfg(test)]
pub use quiz_repository::MockQuizRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
