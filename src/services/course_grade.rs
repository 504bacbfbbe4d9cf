use std::collections::HashMap;

use crate::models::domain::certificate::{CertificateGrade, CertificateMetadata};
use crate::models::domain::{Quiz, QuizAttempt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseScore {
    pub total_quizzes: u32,
    pub average_quiz_score: u32,
    pub total_tests: u32,
    pub average_test_score: u32,
    pub overall_score: u32,
    pub grade: CertificateGrade,
}

impl CourseScore {
    pub fn metadata(&self) -> CertificateMetadata {
        CertificateMetadata {
            total_quizzes: self.total_quizzes,
            average_quiz_score: self.average_quiz_score,
            total_tests: self.total_tests,
            average_test_score: self.average_test_score,
            completion_percentage: 100,
        }
    }
}

fn rounded_mean(percentages: &[u32]) -> u32 {
    if percentages.is_empty() {
        return 0;
    }
    let sum: u64 = percentages.iter().map(|p| *p as u64).sum();
    (sum as f64 / percentages.len() as f64).round() as u32
}

/// Combines the two averages. A zero average is treated as "no attempts",
/// so a genuine zero score on one side yields the other side unaveraged.
fn overall_score(average_quiz_score: u32, average_test_score: u32) -> u32 {
    match (average_quiz_score, average_test_score) {
        (0, test) => test,
        (quiz, 0) => quiz,
        (quiz, test) => ((quiz + test) as f64 / 2.0).round() as u32,
    }
}

/// Aggregates a learner's completed attempts for one course.
///
/// `quizzes` are the course's active quizzes; attempts on quizzes not in
/// that set are left out of both groups.
pub fn aggregate(quizzes: &[Quiz], attempts: &[QuizAttempt]) -> CourseScore {
    let quiz_types: HashMap<&str, _> = quizzes
        .iter()
        .map(|q| (q.id.as_str(), q.quiz_type))
        .collect();

    let mut quiz_scores = Vec::new();
    let mut test_scores = Vec::new();

    for attempt in attempts.iter().filter(|a| a.is_completed()) {
        match quiz_types.get(attempt.quiz_id.as_str()) {
            Some(kind) if kind.is_test() => test_scores.push(attempt.percentage()),
            Some(_) => quiz_scores.push(attempt.percentage()),
            None => {}
        }
    }

    let average_quiz_score = rounded_mean(&quiz_scores);
    let average_test_score = rounded_mean(&test_scores);
    let overall_score = overall_score(average_quiz_score, average_test_score);

    CourseScore {
        total_quizzes: quiz_scores.len() as u32,
        average_quiz_score,
        total_tests: test_scores.len() as u32,
        average_test_score,
        overall_score,
        grade: CertificateGrade::from_score(overall_score),
    }
}
