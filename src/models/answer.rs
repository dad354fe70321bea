use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::ids::{ChoiceId, QuestionId};

/// A stored answer joined with the choice it points at, if that choice still exists.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StoredAnswer {
    pub question_id: QuestionId,
    pub selected_choice_id: Option<ChoiceId>,
    pub selected_label: Option<String>,
    pub selected_is_correct: Option<bool>,
}
