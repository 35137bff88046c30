// Keyword routing for assistant questions

/// Background the overview answer is drawn from
pub const PLATFORM_CONTEXT: &str = "LearnFlow AI is a platform designed to empower educators and learners across Africa. \
It supports joyful onboarding, secure resource sharing, and culturally resonant feedback.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Upload,
    Verify,
    Overview,
}

impl Intent {
    /// Upload wins over verify when a question mentions both
    pub fn classify(query: &str) -> Self {
        let query: String = query.trim().to_lowercase();
        if query.contains("upload") {
            Intent::Upload
        } else if query.contains("verify") {
            Intent::Verify
        } else {
            Intent::Overview
        }
    }

    pub fn answer(self) -> &'static str {
        match self {
            Intent::Upload => "To upload content, visit your dashboard and click 'Add Resource'.",
            Intent::Verify => "Teacher verification is handled securely. Check your profile settings.",
            Intent::Overview => "LearnFlow AI is a platform designed to empower educators and learners across Africa.",
        }
    }
}
