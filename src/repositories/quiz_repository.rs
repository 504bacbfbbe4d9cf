use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::{Database, QUIZZES_COLLECTION},
    errors::{AppError, AppResult},
    models::domain::quiz::{sort_for_admin, sort_for_learners, Quiz},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizRepository: Send + Sync {
    async fn create(&self, quiz: Quiz) -> AppResult<Quiz>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Quiz>>;
    /// Active quizzes only, in learner display order.
    async fn find_active_by_course(&self, course_id: &str) -> AppResult<Vec<Quiz>>;
    /// Every quiz of the course, in admin display order.
    async fn find_by_course(&self, course_id: &str) -> AppResult<Vec<Quiz>>;
    async fn update(&self, quiz: Quiz) -> AppResult<Quiz>;
    async fn delete(&self, id: &str) -> AppResult<()>;
}

pub struct MongoQuizRepository {
    collection: Collection<Quiz>,
}

impl MongoQuizRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(QUIZZES_COLLECTION);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for quizzes collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let course_order_index = IndexModel::builder()
            .keys(doc! { "courseId": 1, "order": 1 })
            .options(
                IndexOptions::builder()
                    .name("course_order".to_string())
                    .build(),
            )
            .build();

        let course_active_index = IndexModel::builder()
            .keys(doc! { "courseId": 1, "isActive": 1 })
            .options(
                IndexOptions::builder()
                    .name("course_active".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(course_order_index).await?;
        self.collection.create_index(course_active_index).await?;

        log::info!("Successfully created indexes for quizzes collection");
        Ok(())
    }
}

#[async_trait]
impl QuizRepository for MongoQuizRepository {
    async fn create(&self, quiz: Quiz) -> AppResult<Quiz> {
        self.collection.insert_one(&quiz).await?;
        Ok(quiz)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Quiz>> {
        let quiz = self.collection.find_one(doc! { "id": id }).await?;
        Ok(quiz)
    }

    async fn find_active_by_course(&self, course_id: &str) -> AppResult<Vec<Quiz>> {
        let mut quizzes: Vec<Quiz> = self
            .collection
            .find(doc! { "courseId": course_id, "isActive": true })
            .await?
            .try_collect()
            .await?;

        // Timestamps are stored as RFC 3339 strings, so order in memory.
        sort_for_learners(&mut quizzes);
        Ok(quizzes)
    }

    async fn find_by_course(&self, course_id: &str) -> AppResult<Vec<Quiz>> {
        let mut quizzes: Vec<Quiz> = self
            .collection
            .find(doc! { "courseId": course_id })
            .await?
            .try_collect()
            .await?;

        sort_for_admin(&mut quizzes);
        Ok(quizzes)
    }

    async fn update(&self, quiz: Quiz) -> AppResult<Quiz> {
        let result = self
            .collection
            .replace_one(doc! { "id": &quiz.id }, &quiz)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::not_found("Quiz"));
        }

        Ok(quiz)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;

        if result.deleted_count == 0 {
            return Err(AppError::not_found("Quiz"));
        }

        Ok(())
    }
}
