use std::collections::{HashMap, HashSet};

use crate::models::domain::quiz_attempt::{percentage_of, AttemptAnswer};
use crate::models::domain::{QuestionKind, Quiz, QuizQuestion};
use crate::models::dto::request::SubmittedAnswer;

/// Submitted short answers longer than this may match by containment.
const LENIENT_MATCH_MIN_CHARS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradeOutcome {
    pub is_correct: bool,
    pub points_earned: u32,
}

impl GradeOutcome {
    fn all_or_nothing(is_correct: bool, points: u32) -> Self {
        GradeOutcome {
            is_correct,
            points_earned: if is_correct { points } else { 0 },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradedSubmission {
    pub answers: Vec<AttemptAnswer>,
    pub points_earned: u32,
    pub total_points: u32,
    pub percentage: u32,
    pub passed: bool,
    /// Question ids that matched nothing in the quiz.
    pub skipped: Vec<String>,
}

pub struct GradingEngine;

impl GradingEngine {
    /// Grades a whole submission against the quiz it was started from.
    ///
    /// Answers for unknown questions are skipped, and only the first answer
    /// for a given question counts.
    pub fn grade_submission(quiz: &Quiz, submitted: &[SubmittedAnswer]) -> GradedSubmission {
        let questions: HashMap<&str, &QuizQuestion> = quiz
            .questions()
            .iter()
            .map(|q| (q.id.as_str(), q))
            .collect();

        let mut seen = HashSet::new();
        let mut answers = Vec::with_capacity(submitted.len());
        let mut skipped = Vec::new();

        for submission in submitted {
            let Some(question) = questions.get(submission.question_id.as_str()) else {
                log::warn!(
                    "Skipping answer for unknown question {} in quiz {}",
                    submission.question_id,
                    quiz.id
                );
                skipped.push(submission.question_id.clone());
                continue;
            };

            if !seen.insert(question.id.as_str()) {
                log::warn!(
                    "Ignoring duplicate answer for question {} in quiz {}",
                    question.id,
                    quiz.id
                );
                continue;
            }

            let outcome = Self::grade_answer(
                question,
                submission.selected_option,
                submission.answer.as_deref(),
            );

            answers.push(AttemptAnswer {
                question_id: question.id.clone(),
                selected_option: submission.selected_option,
                answer: submission.answer.clone(),
                is_correct: outcome.is_correct,
                points_earned: outcome.points_earned,
                time_spent: submission.time_spent.unwrap_or(0),
            });
        }

        let points_earned = answers.iter().map(|a| a.points_earned).sum();
        let total_points = quiz.total_points();
        let percentage = percentage_of(points_earned, total_points);

        GradedSubmission {
            answers,
            points_earned,
            total_points,
            percentage,
            passed: percentage >= quiz.passing_score as u32,
            skipped,
        }
    }

    /// Grades one answer. No partial credit: full points or nothing.
    pub fn grade_answer(
        question: &QuizQuestion,
        selected_option: Option<i32>,
        answer: Option<&str>,
    ) -> GradeOutcome {
        let is_correct = match &question.kind {
            QuestionKind::MultipleChoice { options } => selected_option
                .and_then(|index| usize::try_from(index).ok())
                .and_then(|index| options.get(index))
                .is_some_and(|option| option.is_correct),
            QuestionKind::TrueFalse { correct_answer } => {
                answer.is_some_and(|given| Self::true_false_matches(correct_answer, given))
            }
            QuestionKind::ShortAnswer { correct_answer } => {
                answer.is_some_and(|given| Self::short_answer_matches(correct_answer, given))
            }
            // Scored later through manual grading.
            QuestionKind::Essay => false,
        };

        GradeOutcome::all_or_nothing(is_correct, question.points)
    }

    fn true_false_matches(correct: &str, given: &str) -> bool {
        given.trim().to_lowercase() == correct.trim().to_lowercase()
    }

    /// `correct` may list several accepted answers separated by `|`.
    fn short_answer_matches(correct: &str, given: &str) -> bool {
        let given = given.trim().to_lowercase();
        let accepted: Vec<String> = correct
            .split('|')
            .map(|a| a.trim().to_lowercase())
            .filter(|a| !a.is_empty())
            .collect();

        if accepted.iter().any(|a| *a == given) {
            return true;
        }

        given.chars().count() > LENIENT_MATCH_MIN_CHARS
            && accepted
                .iter()
                .any(|a| given.contains(a.as_str()) || a.contains(given.as_str()))
    }
}
