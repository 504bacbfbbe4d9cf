pub mod quiz_dto;
pub mod request;
pub mod response;

pub use quiz_dto::QuizForTaking;
pub use request::{
    CreateQuizRequest, ManualGradeRequest, QuestionInput, SubmitAttemptRequest, SubmittedAnswer,
    UpdateQuizRequest,
};
pub use response::{
    ApiResponse, AttemptWithUser, CertificateVerification, ListResponse, MessageResponse,
    QuizDetailResponse, QuizView, StartAttemptResponse, SubmissionSummary, UserSummary,
};
