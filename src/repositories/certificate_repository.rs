use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    error::{ErrorKind, WriteFailure},
    options::IndexOptions,
    Collection, IndexModel,
};

use crate::{
    db::{Database, CERTIFICATES_COLLECTION},
    errors::{AppError, AppResult},
    models::domain::certificate::{sort_newest_first, Certificate},
};

const DUPLICATE_KEY: i32 = 11000;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CertificateRepository: Send + Sync {
    /// Fails with `AlreadyCertified` when the learner already holds an active
    /// certificate for the course.
    async fn create(&self, certificate: Certificate) -> AppResult<Certificate>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Certificate>>;
    async fn find_active_by_user_and_course(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> AppResult<Option<Certificate>>;
    async fn find_active_by_number(&self, certificate_number: &str)
        -> AppResult<Option<Certificate>>;
    /// Newest first.
    async fn find_active_by_user(&self, user_id: &str) -> AppResult<Vec<Certificate>>;
    /// Newest first, revoked ones included.
    async fn find_all(&self) -> AppResult<Vec<Certificate>>;
    async fn update(&self, certificate: &Certificate) -> AppResult<()>;
}

pub struct MongoCertificateRepository {
    collection: Collection<Certificate>,
}

const ACTIVE_USER_COURSE_INDEX: &str = "active_user_course_unique";

fn duplicate_key_message(err: &mongodb::error::Error) -> Option<&str> {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY =>
        {
            Some(write_error.message.as_str())
        }
        _ => None,
    }
}

/// The server names the violated index in the E11000 message.
fn violates_active_certificate_index(message: &str) -> bool {
    message.contains(&format!("index: {} ", ACTIVE_USER_COURSE_INDEX))
}

impl MongoCertificateRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(CERTIFICATES_COLLECTION);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for certificates collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let number_index = IndexModel::builder()
            .keys(doc! { "certificateNumber": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("certificate_number_unique".to_string())
                    .build(),
            )
            .build();

        // At most one active certificate per learner and course.
        let active_user_course_index = IndexModel::builder()
            .keys(doc! { "userId": 1, "courseId": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .partial_filter_expression(doc! { "isActive": true })
                    .name(ACTIVE_USER_COURSE_INDEX.to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(number_index).await?;
        self.collection.create_index(active_user_course_index).await?;

        log::info!("Successfully created indexes for certificates collection");
        Ok(())
    }
}

#[async_trait]
impl CertificateRepository for MongoCertificateRepository {
    async fn create(&self, certificate: Certificate) -> AppResult<Certificate> {
        let err = match self.collection.insert_one(&certificate).await {
            Ok(_) => return Ok(certificate),
            Err(err) => err,
        };

        match duplicate_key_message(&err) {
            Some(message) if violates_active_certificate_index(message) => {
                Err(AppError::AlreadyCertified)
            }
            Some(message) => {
                log::warn!(
                    "Certificate {} collided with an existing record: {}",
                    certificate.certificate_number,
                    message
                );
                Err(err.into())
            }
            None => Err(err.into()),
        }
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Certificate>> {
        let certificate = self.collection.find_one(doc! { "id": id }).await?;
        Ok(certificate)
    }

    async fn find_active_by_user_and_course(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> AppResult<Option<Certificate>> {
        let certificate = self
            .collection
            .find_one(doc! { "userId": user_id, "courseId": course_id, "isActive": true })
            .await?;
        Ok(certificate)
    }

    async fn find_active_by_number(
        &self,
        certificate_number: &str,
    ) -> AppResult<Option<Certificate>> {
        let certificate = self
            .collection
            .find_one(doc! { "certificateNumber": certificate_number, "isActive": true })
            .await?;
        Ok(certificate)
    }

    async fn find_active_by_user(&self, user_id: &str) -> AppResult<Vec<Certificate>> {
        let mut certificates: Vec<Certificate> = self
            .collection
            .find(doc! { "userId": user_id, "isActive": true })
            .await?
            .try_collect()
            .await?;

        sort_newest_first(&mut certificates);
        Ok(certificates)
    }

    async fn find_all(&self) -> AppResult<Vec<Certificate>> {
        let mut certificates: Vec<Certificate> =
            self.collection.find(doc! {}).await?.try_collect().await?;

        sort_newest_first(&mut certificates);
        Ok(certificates)
    }

    async fn update(&self, certificate: &Certificate) -> AppResult<()> {
        let result = self
            .collection
            .replace_one(doc! { "id": &certificate.id }, certificate)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::not_found("Certificate"));
        }

        Ok(())
    }
}
