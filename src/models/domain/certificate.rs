use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::quiz_question::new_id;

/// Letter grade printed on a certificate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum CertificateGrade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "Pass")]
    Pass,
}

impl CertificateGrade {
    pub fn from_score(score: u32) -> Self {
        match score {
            95.. => CertificateGrade::APlus,
            90..=94 => CertificateGrade::A,
            85..=89 => CertificateGrade::BPlus,
            80..=84 => CertificateGrade::B,
            75..=79 => CertificateGrade::CPlus,
            70..=74 => CertificateGrade::C,
            _ => CertificateGrade::Pass,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CertificateGrade::APlus => "A+",
            CertificateGrade::A => "A",
            CertificateGrade::BPlus => "B+",
            CertificateGrade::B => "B",
            CertificateGrade::CPlus => "C+",
            CertificateGrade::C => "C",
            CertificateGrade::Pass => "Pass",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateMetadata {
    pub total_quizzes: u32,
    pub average_quiz_score: u32,
    pub total_tests: u32,
    pub average_test_score: u32,
    pub completion_percentage: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub id: String,
    pub certificate_number: String,
    pub user_id: String,
    pub course_id: String,
    pub student_name: String,
    pub course_name: String,
    pub completion_date: DateTime<Utc>,
    pub issue_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DateTime<Utc>>,
    pub grade: CertificateGrade,
    pub score: u32,
    pub instructor_name: String,
    pub verification_url: String,
    pub is_active: bool,
    pub metadata: CertificateMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

pub struct CertificateIssue<'a> {
    pub user_id: &'a str,
    pub course_id: &'a str,
    pub student_name: &'a str,
    pub course_name: &'a str,
    pub instructor_name: &'a str,
    pub number_prefix: &'a str,
    pub frontend_url: &'a str,
    pub score: u32,
    pub metadata: CertificateMetadata,
}

/// Prefixes start with a letter or digit and may also contain `-`, `_`
/// and `.`, so numbers stay URL-safe.
pub fn is_valid_number_prefix(prefix: &str) -> bool {
    let mut chars = prefix.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphanumeric())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// `<prefix>-<unix millis>-<0..9999>`
pub fn generate_certificate_number(prefix: &str, now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().as_u128() % 10_000;
    format!("{}-{}-{}", prefix, now.timestamp_millis(), suffix)
}

pub fn sort_newest_first(certificates: &mut [Certificate]) {
    certificates.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

impl Certificate {
    pub fn issue(details: CertificateIssue<'_>) -> Self {
        let now = Utc::now();
        let certificate_number = generate_certificate_number(details.number_prefix, now);
        let verification_url = format!(
            "{}/verify-certificate/{}",
            details.frontend_url.trim_end_matches('/'),
            certificate_number
        );

        Certificate {
            id: new_id(),
            certificate_number,
            user_id: details.user_id.to_string(),
            course_id: details.course_id.to_string(),
            student_name: details.student_name.to_string(),
            course_name: details.course_name.to_string(),
            completion_date: now,
            issue_date: now,
            expiry_date: None,
            grade: CertificateGrade::from_score(details.score),
            score: details.score,
            instructor_name: details.instructor_name.to_string(),
            verification_url,
            is_active: true,
            metadata: details.metadata,
            created_at: Some(now),
            modified_at: Some(now),
        }
    }

    pub fn revoke(&mut self) {
        self.is_active = false;
        self.modified_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> CertificateMetadata {
        CertificateMetadata {
            total_quizzes: 2,
            average_quiz_score: 90,
            total_tests: 1,
            average_test_score: 94,
            completion_percentage: 100,
        }
    }

    #[test]
    fn grade_thresholds() {
        assert_eq!(CertificateGrade::from_score(100), CertificateGrade::APlus);
        assert_eq!(CertificateGrade::from_score(95), CertificateGrade::APlus);
        assert_eq!(CertificateGrade::from_score(94), CertificateGrade::A);
        assert_eq!(CertificateGrade::from_score(92), CertificateGrade::A);
        assert_eq!(CertificateGrade::from_score(90), CertificateGrade::A);
        assert_eq!(CertificateGrade::from_score(85), CertificateGrade::BPlus);
        assert_eq!(CertificateGrade::from_score(80), CertificateGrade::B);
        assert_eq!(CertificateGrade::from_score(75), CertificateGrade::CPlus);
        assert_eq!(CertificateGrade::from_score(70), CertificateGrade::C);
        assert_eq!(CertificateGrade::from_score(69), CertificateGrade::Pass);
        assert_eq!(CertificateGrade::from_score(0), CertificateGrade::Pass);
    }

    #[test]
    fn grade_serializes_as_letter() {
        assert_eq!(serde_json::to_string(&CertificateGrade::APlus).unwrap(), "\"A+\"");
        assert_eq!(CertificateGrade::from_score(69).as_str(), "Pass");
    }

    #[test]
    fn issue_builds_number_and_verification_link() {
        let certificate = Certificate::issue(CertificateIssue {
            user_id: "user-1",
            course_id: "course-1",
            student_name: "Ada Lovelace",
            course_name: "Analytical Engines",
            instructor_name: "Isaac Institute of Technology",
            number_prefix: "IIT",
            frontend_url: "https://academy.example.com/",
            score: 92,
            metadata: metadata(),
        });

        assert!(certificate.certificate_number.starts_with("IIT-"));
        assert_eq!(
            certificate.verification_url,
            format!(
                "https://academy.example.com/verify-certificate/{}",
                certificate.certificate_number
            )
        );
        assert_eq!(certificate.grade, CertificateGrade::A);
        assert!(certificate.is_active);
    }

    #[test]
    fn revoke_deactivates() {
        let mut certificate = Certificate::issue(CertificateIssue {
            user_id: "user-1",
            course_id: "course-1",
            student_name: "Ada",
            course_name: "Course",
            instructor_name: "Issuer",
            number_prefix: "IIT",
            frontend_url: "https://academy.example.com",
            score: 50,
            metadata: metadata(),
        });

        certificate.revoke();
        assert!(!certificate.is_active);
    }
}
