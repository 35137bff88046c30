use axum::{extract::Path, http::StatusCode};
use serde::Serialize;
use serde_json::json;

use crate::utils::response_handler::HandlerResponse;

/// One of the fixed informational pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LegalPage {
    Privacy,
    Terms,
    About,
    Contact,
    Overview,
}

impl LegalPage {
    pub const ALL: [LegalPage; 5] = [
        LegalPage::Privacy,
        LegalPage::Terms,
        LegalPage::About,
        LegalPage::Contact,
        LegalPage::Overview,
    ];

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|page| page.slug() == slug)
    }

    pub fn slug(self) -> &'static str {
        match self {
            LegalPage::Privacy => "privacy",
            LegalPage::Terms => "terms",
            LegalPage::About => "about",
            LegalPage::Contact => "contact",
            LegalPage::Overview => "overview",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            LegalPage::Privacy => "Privacy Policy",
            LegalPage::Terms => "Terms and Conditions",
            LegalPage::About => "About Us",
            LegalPage::Contact => "Contact Us",
            LegalPage::Overview => "LearnFlow AI Overview",
        }
    }

    /// (heading, body) pairs
    pub fn sections(self) -> &'static [(&'static str, &'static str)] {
        match self {
            LegalPage::Privacy => &[
                ("Information we collect", "Your username, email address and role, plus the quizzes, videos and books you create and the answers you submit."),
                ("How we use it", "To run your account, grade quiz attempts and show your uploads to other learners. We do not sell personal data."),
                ("Sessions", "A login creates a session token that expires after 24 hours or when you log out."),
            ],
            LegalPage::Terms => &[
                ("Accounts", "You are responsible for the activity on your account and for keeping your password secret."),
                ("Content", "Teachers keep ownership of the resources they share and must have the right to share them."),
                ("Acceptable use", "Do not upload unlawful material or attempt to disrupt the service."),
            ],
            LegalPage::About => &[
                ("Who we are", "LearnFlow AI is a platform designed to empower educators and learners across Africa."),
                ("What we do", "Teachers publish quizzes, videos and books; students learn from them and track their scores."),
            ],
            LegalPage::Contact => &[
                ("Email", "support@learnflow.africa"),
                ("Feedback", "Use the assistant's feedback form; every message is read by the team."),
            ],
            LegalPage::Overview => &[
                ("Quizzes", "Multiple choice quizzes with instant scoring."),
                ("Videos", "Teacher videos linked to the quizzes that test them."),
                ("Books", "A catalogue of books uploaded by teachers."),
                ("Assistant", "Ask how to upload resources or verify a teacher account."),
            ],
        }
    }
}

pub async fn legal_page(Path(slug): Path<String>) -> HandlerResponse {
    let Some(page) = LegalPage::from_slug(&slug) else {
        return HandlerResponse::not_found("Page not found");
    };

    let sections: Vec<_> = page
        .sections()
        .iter()
        .map(|(heading, body)| json!({ "heading": heading, "body": body }))
        .collect();

    HandlerResponse::new(StatusCode::OK).data(json!({
        "page": page,
        "title": page.title(),
        "sections": sections,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_page_has_a_slug_and_content() {
        for page in LegalPage::ALL {
            assert_eq!(LegalPage::from_slug(page.slug()), Some(page));
            assert!(!page.sections().is_empty());
        }
        assert_eq!(LegalPage::from_slug("cookies"), None);
    }
}
