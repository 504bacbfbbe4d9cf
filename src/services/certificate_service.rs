use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    auth::{require_owner_or_admin, Claims},
    config::Config,
    errors::{AppError, AppResult},
    models::domain::certificate::{Certificate, CertificateIssue},
    models::dto::CertificateVerification,
    repositories::{
        CertificateRepository, CourseRepository, QuizAttemptRepository, QuizRepository,
        UserRepository,
    },
    services::course_grade,
};

static CERTIFICATE_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.\-]*-\d+-\d{1,4}$")
        .expect("certificate number pattern is valid")
});

pub fn is_well_formed_number(certificate_number: &str) -> bool {
    CERTIFICATE_NUMBER.is_match(certificate_number)
}

/// Issues course certificates from a learner's completed attempts.
pub struct CertificateService {
    certificates: Arc<dyn CertificateRepository>,
    courses: Arc<dyn CourseRepository>,
    users: Arc<dyn UserRepository>,
    quizzes: Arc<dyn QuizRepository>,
    attempts: Arc<dyn QuizAttemptRepository>,
    number_prefix: String,
    issuer: String,
    frontend_url: String,
}

pub struct CertificateRepositories {
    pub certificates: Arc<dyn CertificateRepository>,
    pub courses: Arc<dyn CourseRepository>,
    pub users: Arc<dyn UserRepository>,
    pub quizzes: Arc<dyn QuizRepository>,
    pub attempts: Arc<dyn QuizAttemptRepository>,
}

impl CertificateService {
    pub fn new(repositories: CertificateRepositories, config: &Config) -> Self {
        Self {
            certificates: repositories.certificates,
            courses: repositories.courses,
            users: repositories.users,
            quizzes: repositories.quizzes,
            attempts: repositories.attempts,
            number_prefix: config.certificate_prefix.clone(),
            issuer: config.certificate_issuer.clone(),
            frontend_url: config.frontend_url.clone(),
        }
    }

    /// Scores the learner's completed attempts on the course's active quizzes
    /// and issues a certificate. One active certificate per course.
    pub async fn generate(&self, course_id: &str, user_id: &str) -> AppResult<Certificate> {
        let course = self
            .courses
            .find_by_id(course_id)
            .await?
            .ok_or_else(|| AppError::not_found("Course"))?;

        if self
            .certificates
            .find_active_by_user_and_course(user_id, &course.id)
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyCertified);
        }

        let student = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        let quizzes = self.quizzes.find_active_by_course(&course.id).await?;
        let attempts = self
            .attempts
            .find_completed_by_user_and_course(user_id, &course.id)
            .await?;
        let score = course_grade::aggregate(&quizzes, &attempts);

        let certificate = Certificate::issue(CertificateIssue {
            user_id,
            course_id: &course.id,
            student_name: &student.full_name,
            course_name: &course.title,
            instructor_name: &self.issuer,
            number_prefix: &self.number_prefix,
            frontend_url: &self.frontend_url,
            score: score.overall_score,
            metadata: score.metadata(),
        });

        let certificate = self.certificates.create(certificate).await?;
        log::info!(
            "Issued certificate {} to user {} for course {} (score {}, grade {})",
            certificate.certificate_number,
            user_id,
            course.id,
            certificate.score,
            certificate.grade.as_str()
        );
        Ok(certificate)
    }

    pub async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<Certificate>> {
        self.certificates.find_active_by_user(user_id).await
    }

    pub async fn get(&self, id: &str, caller: &Claims) -> AppResult<Certificate> {
        let certificate = self
            .certificates
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Certificate"))?;

        require_owner_or_admin(caller, &certificate.user_id)?;
        Ok(certificate)
    }

    /// Public lookup. Malformed numbers never reach the store.
    pub async fn verify(&self, certificate_number: &str) -> AppResult<CertificateVerification> {
        let not_found = || AppError::NotFound("Certificate not found or invalid".to_string());

        if !is_well_formed_number(certificate_number) {
            return Err(not_found());
        }

        self.certificates
            .find_active_by_number(certificate_number)
            .await?
            .map(|certificate| CertificateVerification::from(&certificate))
            .ok_or_else(not_found)
    }

    pub async fn list_all(&self) -> AppResult<Vec<Certificate>> {
        self.certificates.find_all().await
    }

    /// Deactivates a certificate, which lets the learner generate a new one.
    pub async fn revoke(&self, id: &str, admin: &Claims) -> AppResult<Certificate> {
        let mut certificate = self
            .certificates
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Certificate"))?;

        certificate.revoke();
        self.certificates.update(&certificate).await?;

        log::info!(
            "Certificate {} revoked by {}",
            certificate.certificate_number,
            admin.sub
        );
        Ok(certificate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::certificate::{CertificateGrade, CertificateMetadata};
    use crate::models::domain::quiz_attempt::AttemptAnswer;
    use crate::models::domain::{
        Course, QuestionKind, Quiz, QuizAttempt, QuizQuestion, QuizType, User, UserRole,
    };
    use crate::repositories::{
        MockCertificateRepository, MockCourseRepository, MockQuizAttemptRepository,
        MockQuizRepository, MockUserRepository,
    };

    fn claims(user_id: &str, role: UserRole) -> Claims {
        Claims {
            sub: user_id.to_string(),
            email: format!("{}@example.com", user_id),
            name: user_id.to_string(),
            role,
            iat: 0,
            exp: 9999999999,
        }
    }

    struct Mocks {
        certificates: MockCertificateRepository,
        courses: MockCourseRepository,
        users: MockUserRepository,
        quizzes: MockQuizRepository,
        attempts: MockQuizAttemptRepository,
    }

    impl Mocks {
        fn new() -> Self {
            Mocks {
                certificates: MockCertificateRepository::new(),
                courses: MockCourseRepository::new(),
                users: MockUserRepository::new(),
                quizzes: MockQuizRepository::new(),
                attempts: MockQuizAttemptRepository::new(),
            }
        }

        fn into_service(self) -> CertificateService {
            CertificateService::new(
                CertificateRepositories {
                    certificates: Arc::new(self.certificates),
                    courses: Arc::new(self.courses),
                    users: Arc::new(self.users),
                    quizzes: Arc::new(self.quizzes),
                    attempts: Arc::new(self.attempts),
                },
                &Config::test_config(),
            )
        }
    }

    fn scored_quiz(quiz_type: QuizType) -> Quiz {
        let mut quiz = Quiz::new("course-1", "Scored", "admin-1");
        quiz.quiz_type = quiz_type;
        quiz.set_questions(vec![QuizQuestion::new("Discuss", QuestionKind::Essay, 100)]);
        quiz
    }

    fn completed(quiz: &Quiz, user_id: &str, percentage: u32) -> QuizAttempt {
        let mut attempt = QuizAttempt::start(quiz, user_id, 0);
        attempt
            .complete(
                vec![AttemptAnswer {
                    question_id: quiz.questions()[0].id.clone(),
                    selected_option: None,
                    answer: None,
                    is_correct: false,
                    points_earned: percentage,
                    time_spent: 0,
                }],
                quiz.total_points(),
                quiz.passing_score,
                0,
            )
            .unwrap();
        attempt
    }

    fn issued(user_id: &str) -> Certificate {
        Certificate::issue(CertificateIssue {
            user_id,
            course_id: "course-1",
            student_name: "Ada Lovelace",
            course_name: "Analytical Engines",
            instructor_name: "Isaac Institute of Technology",
            number_prefix: "IIT",
            frontend_url: "https://academy.example.com",
            score: 92,
            metadata: CertificateMetadata {
                total_quizzes: 1,
                average_quiz_score: 92,
                total_tests: 0,
                average_test_score: 0,
                completion_percentage: 100,
            },
        })
    }

    #[tokio::test]
    async fn generate_scores_attempts_and_issues_certificate() {
        let learner = User::new("Ada Lovelace", "ada@example.com", UserRole::User);
        let user_id = learner.id.clone();
        let practice = scored_quiz(QuizType::Quiz);
        let exam = scored_quiz(QuizType::FinalExam);
        let attempts = vec![
            completed(&practice, &user_id, 90),
            completed(&exam, &user_id, 94),
        ];

        let mut mocks = Mocks::new();
        mocks
            .courses
            .expect_find_by_id()
            .returning(|id| Ok(Some(Course::new(id, "Analytical Engines"))));
        mocks
            .certificates
            .expect_find_active_by_user_and_course()
            .returning(|_, _| Ok(None));
        mocks
            .users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(learner.clone())));
        let quizzes = vec![practice, exam];
        mocks
            .quizzes
            .expect_find_active_by_course()
            .returning(move |_| Ok(quizzes.clone()));
        mocks
            .attempts
            .expect_find_completed_by_user_and_course()
            .returning(move |_, _| Ok(attempts.clone()));
        mocks
            .certificates
            .expect_create()
            .times(1)
            .returning(|certificate| Ok(certificate));

        let certificate = mocks
            .into_service()
            .generate("course-1", &user_id)
            .await
            .unwrap();

        assert_eq!(certificate.score, 92);
        assert_eq!(certificate.grade, CertificateGrade::A);
        assert_eq!(certificate.student_name, "Ada Lovelace");
        assert_eq!(certificate.course_name, "Analytical Engines");
        assert_eq!(certificate.instructor_name, "Isaac Institute of Technology");
        assert_eq!(certificate.metadata.total_quizzes, 1);
        assert_eq!(certificate.metadata.average_test_score, 94);
        assert!(is_well_formed_number(&certificate.certificate_number));
        assert!(certificate
            .verification_url
            .starts_with("https://academy.example.com/verify-certificate/IIT-"));
    }

    #[tokio::test]
    async fn generate_refuses_a_second_active_certificate() {
        let mut mocks = Mocks::new();
        mocks
            .courses
            .expect_find_by_id()
            .returning(|id| Ok(Some(Course::new(id, "Course"))));
        mocks
            .certificates
            .expect_find_active_by_user_and_course()
            .returning(|user, _| Ok(Some(issued(user))));
        mocks.certificates.expect_create().never();

        let result = mocks.into_service().generate("course-1", "user-1").await;
        assert!(matches!(result, Err(AppError::AlreadyCertified)));
    }

    #[tokio::test]
    async fn generate_for_unknown_course_is_not_found() {
        let mut mocks = Mocks::new();
        mocks.courses.expect_find_by_id().returning(|_| Ok(None));

        let result = mocks.into_service().generate("nope", "user-1").await;
        assert!(matches!(result, Err(AppError::NotFound(msg)) if msg == "Course not found"));
    }

    #[tokio::test]
    async fn get_is_limited_to_owner_and_admins() {
        let mut mocks = Mocks::new();
        mocks
            .certificates
            .expect_find_by_id()
            .returning(|_| Ok(Some(issued("user-1"))));
        let service = mocks.into_service();

        assert!(service.get("c", &claims("user-1", UserRole::User)).await.is_ok());
        assert!(service.get("c", &claims("admin", UserRole::Admin)).await.is_ok());
        assert!(matches!(
            service.get("c", &claims("user-2", UserRole::User)).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn verify_rejects_malformed_numbers_without_lookup() {
        let mut mocks = Mocks::new();
        mocks.certificates.expect_find_active_by_number().never();

        let result = mocks.into_service().verify("not a number").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn verify_returns_public_fields() {
        let certificate = issued("user-1");
        let number = certificate.certificate_number.clone();
        let mut mocks = Mocks::new();
        mocks
            .certificates
            .expect_find_active_by_number()
            .returning(move |_| Ok(Some(certificate.clone())));

        let verification = mocks.into_service().verify(&number).await.unwrap();

        assert_eq!(verification.certificate_number, number);
        assert_eq!(verification.grade, "A");
        assert!(verification.is_valid);
    }

    #[tokio::test]
    async fn revoke_deactivates_and_persists() {
        let mut mocks = Mocks::new();
        mocks
            .certificates
            .expect_find_by_id()
            .returning(|_| Ok(Some(issued("user-1"))));
        mocks
            .certificates
            .expect_update()
            .withf(|c| !c.is_active)
            .times(1)
            .returning(|_| Ok(()));

        let revoked = mocks
            .into_service()
            .revoke("c", &claims("admin", UserRole::Admin))
            .await
            .unwrap();
        assert!(!revoked.is_active);
    }

    #[test]
    fn numbers_from_any_accepted_prefix_verify() {
        use crate::models::domain::certificate::{generate_certificate_number, is_valid_number_prefix};

        for prefix in ["IIT", "IIT-ACADEMY", "ISAAC_IIT", "iit.2026"] {
            assert!(is_valid_number_prefix(prefix));
            let number = generate_certificate_number(prefix, chrono::Utc::now());
            assert!(is_well_formed_number(&number), "{} should verify", number);
        }
    }

    #[tokio::test]
    async fn verify_accepts_numbers_issued_under_a_custom_prefix() {
        let mut config = Config::test_config();
        config.certificate_prefix = "IIT-ACADEMY".to_string();
        let mut certificate = issued("user-1");
        certificate.certificate_number =
            crate::models::domain::certificate::generate_certificate_number(
                &config.certificate_prefix,
                chrono::Utc::now(),
            );
        let number = certificate.certificate_number.clone();

        let mut mocks = Mocks::new();
        mocks
            .certificates
            .expect_find_active_by_number()
            .times(1)
            .returning(move |_| Ok(Some(certificate.clone())));
        let service = CertificateService::new(
            CertificateRepositories {
                certificates: Arc::new(mocks.certificates),
                courses: Arc::new(mocks.courses),
                users: Arc::new(mocks.users),
                quizzes: Arc::new(mocks.quizzes),
                attempts: Arc::new(mocks.attempts),
            },
            &config,
        );

        let verification = service.verify(&number).await.unwrap();
        assert!(number.starts_with("IIT-ACADEMY-"));
        assert!(verification.is_valid);
    }

    #[test]
    fn certificate_number_format() {
        assert!(is_well_formed_number("IIT-1700000000000-42"));
        assert!(is_well_formed_number("IIT-1700000000000-9999"));
        assert!(!is_well_formed_number("IIT-1700000000000-10000"));
        assert!(!is_well_formed_number("IIT-abc-1"));
        assert!(!is_well_formed_number("IIT-1-2; drop"));
    }
}
