// Quiz authoring and grading rules, free of any I/O

use std::collections::HashMap;

/// Letters of the four options every authored question carries, in order
pub const OPTION_LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

/// Index into `OPTION_LETTERS` for a submitted `correct_option`, case-insensitive.
/// Anything else means no option is marked correct.
pub fn correct_option_index(letter: Option<&str>) -> Option<usize> {
    let mut chars = letter?.trim().chars();
    let first: char = chars.next()?.to_ascii_uppercase();
    if chars.next().is_some() {
        return None;
    }
    OPTION_LETTERS.iter().position(|&l| l == first)
}

/// What grading needs to know about a stored choice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoiceKey {
    pub question_id: i64,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradedAnswer {
    pub question_id: i64,
    pub choice_id: i64,
    pub is_correct: bool,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Grading {
    pub answers: Vec<GradedAnswer>,
    pub score: u32,
    pub total_questions: u32,
    /// Questions whose submitted choice does not exist or belongs elsewhere
    pub rejected: Vec<i64>,
}

/// Grades `submitted` (question id to choice id) against the quiz.
/// Unanswered questions still count towards the total.
pub fn grade(
    question_ids: &[i64],
    choices: &HashMap<i64, ChoiceKey>,
    submitted: &HashMap<i64, i64>,
) -> Grading {
    let mut grading = Grading {
        total_questions: question_ids.len() as u32,
        ..Grading::default()
    };

    for &question_id in question_ids {
        let Some(&choice_id) = submitted.get(&question_id) else {
            continue;
        };

        match choices.get(&choice_id) {
            Some(choice) if choice.question_id == question_id => {
                if choice.is_correct {
                    grading.score += 1;
                }
                grading.answers.push(GradedAnswer {
                    question_id,
                    choice_id,
                    is_correct: choice.is_correct,
                });
            }
            _ => grading.rejected.push(question_id),
        }
    }

    grading
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choices() -> HashMap<i64, ChoiceKey> {
        HashMap::from([
            (10, ChoiceKey { question_id: 1, is_correct: true }),
            (11, ChoiceKey { question_id: 1, is_correct: false }),
            (20, ChoiceKey { question_id: 2, is_correct: false }),
            (21, ChoiceKey { question_id: 2, is_correct: true }),
        ])
    }

    #[test]
    fn option_letters_are_case_insensitive() {
        assert_eq!(correct_option_index(Some("a")), Some(0));
        assert_eq!(correct_option_index(Some(" D ")), Some(3));
        assert_eq!(correct_option_index(Some("E")), None);
        assert_eq!(correct_option_index(Some("AB")), None);
        assert_eq!(correct_option_index(Some("")), None);
        assert_eq!(correct_option_index(None), None);
    }

    #[test]
    fn scores_correct_answers_and_counts_unanswered() {
        let submitted = HashMap::from([(1, 10), (2, 20)]);
        let grading = grade(&[1, 2, 3], &choices(), &submitted);

        assert_eq!(grading.score, 1);
        assert_eq!(grading.total_questions, 3);
        assert_eq!(grading.answers.len(), 2);
        assert!(grading.rejected.is_empty());
    }

    #[test]
    fn unknown_or_foreign_choices_are_rejected() {
        // 21 belongs to question 2, 99 does not exist
        let submitted = HashMap::from([(1, 21), (2, 99)]);
        let grading = grade(&[1, 2], &choices(), &submitted);

        assert_eq!(grading.score, 0);
        assert!(grading.answers.is_empty());
        assert_eq!(grading.rejected, vec![1, 2]);
    }

    #[test]
    fn answers_to_other_quizzes_are_ignored() {
        let submitted = HashMap::from([(7, 10)]);
        let grading = grade(&[1], &choices(), &submitted);
        assert_eq!(grading, Grading { total_questions: 1, ..Grading::default() });
    }
}
