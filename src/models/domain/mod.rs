pub mod certificate;
pub mod course;
pub mod quiz;
pub mod quiz_attempt;
pub mod quiz_question;
pub mod user;

pub use certificate::{Certificate, CertificateGrade};
pub use course::Course;
pub use quiz::{AttemptLimit, Quiz, QuizType};
pub use quiz_attempt::{AttemptAnswer, AttemptStatus, QuizAttempt};
pub use quiz_question::{QuestionKind, QuestionOption, QuestionType, QuizQuestion};
pub use user::{User, UserRole};
