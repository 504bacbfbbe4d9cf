use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::{Database, QUIZ_ATTEMPTS_COLLECTION},
    errors::{AppError, AppResult},
    models::domain::quiz_attempt::{sort_newest_first, AttemptStatus, QuizAttempt},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizAttemptRepository: Send + Sync {
    async fn create(&self, attempt: QuizAttempt) -> AppResult<QuizAttempt>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizAttempt>>;
    async fn count_completed(&self, user_id: &str, quiz_id: &str) -> AppResult<u64>;
    /// Newest first.
    async fn find_by_user_and_quiz(
        &self,
        user_id: &str,
        quiz_id: &str,
    ) -> AppResult<Vec<QuizAttempt>>;
    /// Newest first.
    async fn find_by_quiz(&self, quiz_id: &str) -> AppResult<Vec<QuizAttempt>>;
    async fn find_completed_by_user_and_course(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> AppResult<Vec<QuizAttempt>>;
    /// Persists a freshly completed attempt, but only if the stored copy is
    /// still open. Returns `false` when another submission got there first.
    async fn complete(&self, attempt: &QuizAttempt) -> AppResult<bool>;
    async fn update(&self, attempt: &QuizAttempt) -> AppResult<()>;
    async fn delete_by_quiz(&self, quiz_id: &str) -> AppResult<u64>;
}

pub struct MongoQuizAttemptRepository {
    collection: Collection<QuizAttempt>,
}

impl MongoQuizAttemptRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(QUIZ_ATTEMPTS_COLLECTION);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for quiz_attempts collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let quiz_user_index = IndexModel::builder()
            .keys(doc! { "quizId": 1, "userId": 1, "createdAt": -1 })
            .options(
                IndexOptions::builder()
                    .name("quiz_user_created".to_string())
                    .build(),
            )
            .build();

        let user_course_index = IndexModel::builder()
            .keys(doc! { "userId": 1, "courseId": 1 })
            .options(
                IndexOptions::builder()
                    .name("user_course".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(quiz_user_index).await?;
        self.collection.create_index(user_course_index).await?;

        log::info!("Successfully created indexes for quiz_attempts collection");
        Ok(())
    }
}

#[async_trait]
impl QuizAttemptRepository for MongoQuizAttemptRepository {
    async fn create(&self, attempt: QuizAttempt) -> AppResult<QuizAttempt> {
        self.collection.insert_one(&attempt).await?;
        Ok(attempt)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizAttempt>> {
        let attempt = self.collection.find_one(doc! { "id": id }).await?;
        Ok(attempt)
    }

    async fn count_completed(&self, user_id: &str, quiz_id: &str) -> AppResult<u64> {
        let count = self
            .collection
            .count_documents(doc! {
                "userId": user_id,
                "quizId": quiz_id,
                "status": AttemptStatus::Completed.as_str(),
            })
            .await?;
        Ok(count)
    }

    async fn find_by_user_and_quiz(
        &self,
        user_id: &str,
        quiz_id: &str,
    ) -> AppResult<Vec<QuizAttempt>> {
        let mut attempts: Vec<QuizAttempt> = self
            .collection
            .find(doc! { "userId": user_id, "quizId": quiz_id })
            .await?
            .try_collect()
            .await?;

        sort_newest_first(&mut attempts);
        Ok(attempts)
    }

    async fn find_by_quiz(&self, quiz_id: &str) -> AppResult<Vec<QuizAttempt>> {
        let mut attempts: Vec<QuizAttempt> = self
            .collection
            .find(doc! { "quizId": quiz_id })
            .await?
            .try_collect()
            .await?;

        sort_newest_first(&mut attempts);
        Ok(attempts)
    }

    async fn find_completed_by_user_and_course(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> AppResult<Vec<QuizAttempt>> {
        let attempts = self
            .collection
            .find(doc! {
                "userId": user_id,
                "courseId": course_id,
                "status": AttemptStatus::Completed.as_str(),
            })
            .await?
            .try_collect()
            .await?;
        Ok(attempts)
    }

    async fn complete(&self, attempt: &QuizAttempt) -> AppResult<bool> {
        // The status predicate turns the replace into a compare-and-set.
        let result = self
            .collection
            .replace_one(
                doc! {
                    "id": &attempt.id,
                    "status": { "$ne": AttemptStatus::Completed.as_str() },
                },
                attempt,
            )
            .await?;

        Ok(result.matched_count == 1)
    }

    async fn update(&self, attempt: &QuizAttempt) -> AppResult<()> {
        let result = self
            .collection
            .replace_one(doc! { "id": &attempt.id }, attempt)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::not_found("Quiz attempt"));
        }

        Ok(())
    }

    async fn delete_by_quiz(&self, quiz_id: &str) -> AppResult<u64> {
        let result = self
            .collection
            .delete_many(doc! { "quizId": quiz_id })
            .await?;
        Ok(result.deleted_count)
    }
}
