use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::ids::{ChoiceId, QuestionId, TestId};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: QuestionId,
    pub test_id: TestId,
    pub prompt: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct Choice {
    pub id: ChoiceId,
    pub question_id: QuestionId,
    pub label: String,
    pub is_correct: bool,
}

/// A choice as shown while the test is being taken: no correctness flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicChoice {
    pub id: ChoiceId,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicQuestion {
    pub id: QuestionId,
    pub prompt: String,
    pub choices: Vec<PublicChoice>,
}

impl From<&Choice> for PublicChoice {
    fn from(choice: &Choice) -> Self {
        Self {
            id: choice.id,
            label: choice.label.clone(),
        }
    }
}
