use std::collections::HashMap;

use crate::models::ids::{ChoiceId, QuestionId};
use crate::models::test::TestDefinition;

/// Submitted choice per question; `None` means the question was left blank.
pub type Responses = HashMap<QuestionId, Option<ChoiceId>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradedAnswer {
    pub question_id: QuestionId,
    /// Only ever a choice of this very question; anything else is stored as unanswered.
    pub selected_choice_id: Option<ChoiceId>,
    pub is_correct: bool,
}

#[derive(Debug, Clone)]
pub struct GradedAttempt {
    pub score: i64,
    pub total_questions: i64,
    pub answers: Vec<GradedAnswer>,
}

pub struct GradingService;

impl GradingService {
    /// Scores against every question of the definition, regardless of how many
    /// responses were sent. Responses for questions outside the test are ignored.
    pub fn grade(definition: &TestDefinition, responses: &Responses) -> GradedAttempt {
        let mut score: i64 = 0;
        let mut answers = Vec::with_capacity(definition.question_count());

        for entry in &definition.questions {
            let question_id = entry.question.id;
            let submitted = responses.get(&question_id).copied().flatten();
            let choice = submitted.and_then(|choice_id| {
                entry.choices.iter().find(|c| c.id == choice_id)
            });

            let is_correct = choice.is_some_and(|c| c.is_correct);
            if is_correct {
                score += 1;
            }
            answers.push(GradedAnswer {
                question_id,
                selected_choice_id: choice.map(|c| c.id),
                is_correct,
            });
        }

        GradedAttempt {
            score,
            total_questions: definition.question_count() as i64,
            answers,
        }
    }
}
