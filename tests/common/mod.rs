#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use academy_server::{
    app_state::{AppState, Repositories},
    auth::JwtService,
    config::Config,
    errors::{AppError, AppResult},
    models::domain::{
        certificate::{self, Certificate},
        quiz::{self, Quiz},
        quiz_attempt::{self, AttemptStatus, QuizAttempt},
        Course, User,
    },
    repositories::{
        CertificateRepository, CourseRepository, QuizAttemptRepository, QuizRepository,
        UserRepository,
    },
};

type Store<T> = Arc<RwLock<HashMap<String, T>>>;

fn store<T>() -> Store<T> {
    Arc::new(RwLock::new(HashMap::new()))
}

#[derive(Clone, Default)]
pub struct InMemoryQuizRepository {
    quizzes: Store<Quiz>,
}

impl InMemoryQuizRepository {
    pub fn new() -> Self {
        Self { quizzes: store() }
    }
}

#[async_trait]
impl QuizRepository for InMemoryQuizRepository {
    async fn create(&self, quiz: Quiz) -> AppResult<Quiz> {
        self.quizzes.write().await.insert(quiz.id.clone(), quiz.clone());
        Ok(quiz)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Quiz>> {
        Ok(self.quizzes.read().await.get(id).cloned())
    }

    async fn find_active_by_course(&self, course_id: &str) -> AppResult<Vec<Quiz>> {
        let mut quizzes: Vec<Quiz> = self
            .quizzes
            .read()
            .await
            .values()
            .filter(|q| q.course_id == course_id && q.is_active)
            .cloned()
            .collect();
        quiz::sort_for_learners(&mut quizzes);
        Ok(quizzes)
    }

    async fn find_by_course(&self, course_id: &str) -> AppResult<Vec<Quiz>> {
        let mut quizzes: Vec<Quiz> = self
            .quizzes
            .read()
            .await
            .values()
            .filter(|q| q.course_id == course_id)
            .cloned()
            .collect();
        quiz::sort_for_admin(&mut quizzes);
        Ok(quizzes)
    }

    async fn update(&self, quiz: Quiz) -> AppResult<Quiz> {
        let mut quizzes = self.quizzes.write().await;
        if !quizzes.contains_key(&quiz.id) {
            return Err(AppError::not_found("Quiz"));
        }
        quizzes.insert(quiz.id.clone(), quiz.clone());
        Ok(quiz)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.quizzes
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found("Quiz"))
    }
}

#[derive(Clone, Default)]
pub struct InMemoryQuizAttemptRepository {
    attempts: Store<QuizAttempt>,
}

impl InMemoryQuizAttemptRepository {
    pub fn new() -> Self {
        Self { attempts: store() }
    }

    async fn filtered(&self, keep: impl Fn(&QuizAttempt) -> bool) -> Vec<QuizAttempt> {
        let mut attempts: Vec<QuizAttempt> = self
            .attempts
            .read()
            .await
            .values()
            .filter(|a| keep(a))
            .cloned()
            .collect();
        quiz_attempt::sort_newest_first(&mut attempts);
        attempts
    }
}

#[async_trait]
impl QuizAttemptRepository for InMemoryQuizAttemptRepository {
    async fn create(&self, attempt: QuizAttempt) -> AppResult<QuizAttempt> {
        self.attempts
            .write()
            .await
            .insert(attempt.id.clone(), attempt.clone());
        Ok(attempt)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizAttempt>> {
        Ok(self.attempts.read().await.get(id).cloned())
    }

    async fn count_completed(&self, user_id: &str, quiz_id: &str) -> AppResult<u64> {
        let count = self
            .filtered(|a| a.user_id == user_id && a.quiz_id == quiz_id && a.is_completed())
            .await
            .len();
        Ok(count as u64)
    }

    async fn find_by_user_and_quiz(
        &self,
        user_id: &str,
        quiz_id: &str,
    ) -> AppResult<Vec<QuizAttempt>> {
        Ok(self
            .filtered(|a| a.user_id == user_id && a.quiz_id == quiz_id)
            .await)
    }

    async fn find_by_quiz(&self, quiz_id: &str) -> AppResult<Vec<QuizAttempt>> {
        Ok(self.filtered(|a| a.quiz_id == quiz_id).await)
    }

    async fn find_completed_by_user_and_course(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> AppResult<Vec<QuizAttempt>> {
        Ok(self
            .filtered(|a| a.user_id == user_id && a.course_id == course_id && a.is_completed())
            .await)
    }

    async fn complete(&self, attempt: &QuizAttempt) -> AppResult<bool> {
        let mut attempts = self.attempts.write().await;
        match attempts.get(&attempt.id) {
            Some(stored) if stored.status != AttemptStatus::Completed => {
                attempts.insert(attempt.id.clone(), attempt.clone());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn update(&self, attempt: &QuizAttempt) -> AppResult<()> {
        let mut attempts = self.attempts.write().await;
        if !attempts.contains_key(&attempt.id) {
            return Err(AppError::not_found("Quiz attempt"));
        }
        attempts.insert(attempt.id.clone(), attempt.clone());
        Ok(())
    }

    async fn delete_by_quiz(&self, quiz_id: &str) -> AppResult<u64> {
        let mut attempts = self.attempts.write().await;
        let before = attempts.len();
        attempts.retain(|_, a| a.quiz_id != quiz_id);
        Ok((before - attempts.len()) as u64)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryCertificateRepository {
    certificates: Store<Certificate>,
}

impl InMemoryCertificateRepository {
    pub fn new() -> Self {
        Self {
            certificates: store(),
        }
    }

    async fn filtered(&self, keep: impl Fn(&Certificate) -> bool) -> Vec<Certificate> {
        let mut certificates: Vec<Certificate> = self
            .certificates
            .read()
            .await
            .values()
            .filter(|c| keep(c))
            .cloned()
            .collect();
        certificate::sort_newest_first(&mut certificates);
        certificates
    }
}

#[async_trait]
impl CertificateRepository for InMemoryCertificateRepository {
    async fn create(&self, certificate: Certificate) -> AppResult<Certificate> {
        let mut certificates = self.certificates.write().await;
        let duplicate = certificates.values().any(|c| {
            c.is_active && c.user_id == certificate.user_id && c.course_id == certificate.course_id
        });
        if duplicate {
            return Err(AppError::AlreadyCertified);
        }
        certificates.insert(certificate.id.clone(), certificate.clone());
        Ok(certificate)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Certificate>> {
        Ok(self.certificates.read().await.get(id).cloned())
    }

    async fn find_active_by_user_and_course(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> AppResult<Option<Certificate>> {
        Ok(self
            .filtered(|c| c.is_active && c.user_id == user_id && c.course_id == course_id)
            .await
            .into_iter()
            .next())
    }

    async fn find_active_by_number(
        &self,
        certificate_number: &str,
    ) -> AppResult<Option<Certificate>> {
        Ok(self
            .filtered(|c| c.is_active && c.certificate_number == certificate_number)
            .await
            .into_iter()
            .next())
    }

    async fn find_active_by_user(&self, user_id: &str) -> AppResult<Vec<Certificate>> {
        Ok(self.filtered(|c| c.is_active && c.user_id == user_id).await)
    }

    async fn find_all(&self) -> AppResult<Vec<Certificate>> {
        Ok(self.filtered(|_| true).await)
    }

    async fn update(&self, certificate: &Certificate) -> AppResult<()> {
        let mut certificates = self.certificates.write().await;
        if !certificates.contains_key(&certificate.id) {
            return Err(AppError::not_found("Certificate"));
        }
        certificates.insert(certificate.id.clone(), certificate.clone());
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryCourseRepository {
    courses: Store<Course>,
}

impl InMemoryCourseRepository {
    pub fn with(courses: Vec<Course>) -> Self {
        let repo = Self { courses: store() };
        if let Ok(mut map) = repo.courses.try_write() {
            map.extend(courses.into_iter().map(|c| (c.id.clone(), c)));
        }
        repo
    }
}

#[async_trait]
impl CourseRepository for InMemoryCourseRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Course>> {
        Ok(self.courses.read().await.get(id).cloned())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Store<User>,
}

impl InMemoryUserRepository {
    pub fn with(users: Vec<User>) -> Self {
        let repo = Self { users: store() };
        if let Ok(mut map) = repo.users.try_write() {
            map.extend(users.into_iter().map(|u| (u.id.clone(), u)));
        }
        repo
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }
}

/// A wired application backed entirely by in-memory stores.
pub struct TestWorld {
    pub state: AppState,
    pub jwt: JwtService,
    pub quizzes: InMemoryQuizRepository,
    pub attempts: InMemoryQuizAttemptRepository,
    pub certificates: InMemoryCertificateRepository,
}

impl TestWorld {
    pub fn new(courses: Vec<Course>, users: Vec<User>) -> Self {
        let config = Config::test_config();
        let jwt = JwtService::new(&config.jwt_secret, config.jwt_expiration_hours);

        let quizzes = InMemoryQuizRepository::new();
        let attempts = InMemoryQuizAttemptRepository::new();
        let certificates = InMemoryCertificateRepository::new();

        let repositories = Repositories {
            quizzes: Arc::new(quizzes.clone()),
            attempts: Arc::new(attempts.clone()),
            certificates: Arc::new(certificates.clone()),
            courses: Arc::new(InMemoryCourseRepository::with(courses)),
            users: Arc::new(InMemoryUserRepository::with(users)),
        };

        Self {
            state: AppState::from_parts(config, repositories, None),
            jwt,
            quizzes,
            attempts,
            certificates,
        }
    }

    pub fn token_for(&self, user: &User) -> String {
        self.jwt.create_token(user).expect("token")
    }

    pub async fn seed_quiz(&self, quiz: Quiz) -> Quiz {
        self.quizzes.create(quiz).await.expect("seed quiz")
    }
}

impl TestWorld {
    pub async fn attempts_for(&self, quiz_id: &str) -> Vec<QuizAttempt> {
        self.attempts.find_by_quiz(quiz_id).await.expect("attempts")
    }
}
