use std::sync::Arc;

use crate::{
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        CertificateRepository, CourseRepository, MongoCertificateRepository,
        MongoCourseRepository, MongoQuizAttemptRepository, MongoQuizRepository,
        MongoUserRepository, QuizAttemptRepository, QuizRepository, UserRepository,
    },
    services::{CertificateRepositories, CertificateService, QuizAttemptService, QuizService},
};

/// Repository handles the services are wired from.
#[derive(Clone)]
pub struct Repositories {
    pub quizzes: Arc<dyn QuizRepository>,
    pub attempts: Arc<dyn QuizAttemptRepository>,
    pub certificates: Arc<dyn CertificateRepository>,
    pub courses: Arc<dyn CourseRepository>,
    pub users: Arc<dyn UserRepository>,
}

#[derive(Clone)]
pub struct AppState {
    pub quiz_service: Arc<QuizService>,
    pub attempt_service: Arc<QuizAttemptService>,
    pub certificate_service: Arc<CertificateService>,
    pub config: Arc<Config>,
    /// `None` when running against in-memory repositories.
    pub db: Option<Database>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let quiz_repository = Arc::new(MongoQuizRepository::new(&db));
        quiz_repository.ensure_indexes().await?;
        let attempt_repository = Arc::new(MongoQuizAttemptRepository::new(&db));
        attempt_repository.ensure_indexes().await?;
        let certificate_repository = Arc::new(MongoCertificateRepository::new(&db));
        certificate_repository.ensure_indexes().await?;

        let repositories = Repositories {
            quizzes: quiz_repository,
            attempts: attempt_repository,
            certificates: certificate_repository,
            courses: Arc::new(MongoCourseRepository::new(&db)),
            users: Arc::new(MongoUserRepository::new(&db)),
        };

        Ok(Self::from_parts(config, repositories, Some(db)))
    }

    pub fn from_parts(config: Config, repositories: Repositories, db: Option<Database>) -> Self {
        let quiz_service = Arc::new(QuizService::new(
            repositories.quizzes.clone(),
            repositories.attempts.clone(),
        ));
        let attempt_service = Arc::new(QuizAttemptService::new(
            repositories.quizzes.clone(),
            repositories.attempts.clone(),
            repositories.users.clone(),
        ));
        let certificate_service = Arc::new(CertificateService::new(
            CertificateRepositories {
                certificates: repositories.certificates,
                courses: repositories.courses,
                users: repositories.users,
                quizzes: repositories.quizzes,
                attempts: repositories.attempts,
            },
            &config,
        ));

        Self {
            quiz_service,
            attempt_service,
            certificate_service,
            config: Arc::new(config),
            db,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_cloneable() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }
}
