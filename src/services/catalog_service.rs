use sqlx::SqlitePool;

use crate::error::{Error, Result};
use crate::models::ids::{QuestionId, TestId};
use crate::models::question::{Choice, Question};
use crate::models::test::{QuestionWithChoices, Test, TestDefinition};

#[derive(Debug, Clone)]
pub struct NewTest {
    pub title: String,
    pub description: Option<String>,
    pub questions: Vec<NewQuestion>,
}

#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub prompt: String,
    pub choices: Vec<NewChoice>,
}

#[derive(Debug, Clone)]
pub struct NewChoice {
    pub label: String,
    pub is_correct: bool,
}

impl NewQuestion {
    pub fn new(prompt: &str, choices: &[(&str, bool)]) -> Self {
        Self {
            prompt: prompt.to_string(),
            choices: choices
                .iter()
                .map(|(label, is_correct)| NewChoice {
                    label: label.to_string(),
                    is_correct: *is_correct,
                })
                .collect(),
        }
    }
}

#[derive(Clone)]
pub struct CatalogService {
    pool: SqlitePool,
}

impl CatalogService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list_tests(&self) -> Result<Vec<Test>> {
        let tests = sqlx::query_as::<_, Test>(
            r#"SELECT id, title, description FROM test ORDER BY id"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(tests)
    }

    pub async fn get_test(&self, test_id: TestId) -> Result<Test> {
        sqlx::query_as::<_, Test>(r#"SELECT id, title, description FROM test WHERE id = ?"#)
            .bind(test_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Test {}", test_id)))
    }

    /// Loads a test with its questions and choices, both in id order.
    pub async fn load_definition(&self, test_id: TestId) -> Result<TestDefinition> {
        let test = self.get_test(test_id).await?;

        let questions = sqlx::query_as::<_, Question>(
            r#"SELECT id, test_id, prompt FROM question WHERE test_id = ? ORDER BY id"#,
        )
        .bind(test_id)
        .fetch_all(&self.pool)
        .await?;

        let choices = sqlx::query_as::<_, Choice>(
            r#"
            SELECT c.id, c.question_id, c.label, c.is_correct
            FROM choice c
            JOIN question q ON q.id = c.question_id
            WHERE q.test_id = ?
            ORDER BY c.question_id, c.id
            "#,
        )
        .bind(test_id)
        .fetch_all(&self.pool)
        .await?;

        let mut questions: Vec<QuestionWithChoices> = questions
            .into_iter()
            .map(|question| QuestionWithChoices {
                question,
                choices: Vec::new(),
            })
            .collect();
        for choice in choices {
            if let Some(slot) = questions
                .iter_mut()
                .find(|q| q.question.id == choice.question_id)
            {
                slot.choices.push(choice);
            }
        }

        Ok(TestDefinition { test, questions })
    }

    /// Inserts a whole test tree atomically. This is where the one-correct-choice rule lives.
    pub async fn create_test(&self, new_test: &NewTest) -> Result<TestId> {
        check_new_test(new_test)?;

        let mut tx = self.pool.begin().await?;
        let test_id = sqlx::query_scalar::<_, TestId>(
            r#"INSERT INTO test (title, description) VALUES (?, ?) RETURNING id"#,
        )
        .bind(new_test.title.trim())
        .bind(new_test.description.as_deref())
        .fetch_one(&mut *tx)
        .await?;

        for question in &new_test.questions {
            let question_id = sqlx::query_scalar::<_, QuestionId>(
                r#"INSERT INTO question (test_id, prompt) VALUES (?, ?) RETURNING id"#,
            )
            .bind(test_id)
            .bind(question.prompt.trim())
            .fetch_one(&mut *tx)
            .await?;

            for choice in &question.choices {
                sqlx::query(
                    r#"INSERT INTO choice (question_id, label, is_correct) VALUES (?, ?, ?)"#,
                )
                .bind(question_id)
                .bind(choice.label.trim())
                .bind(choice.is_correct)
                .execute(&mut *tx)
                .await?;
            }
        }
        tx.commit().await?;

        tracing::info!(test_id = %test_id, questions = new_test.questions.len(), "test created");
        Ok(test_id)
    }

    /// Seeds the default catalog into an empty store. Returns whether anything was written.
    pub async fn seed_default_catalog(&self) -> Result<bool> {
        let existing: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM test"#)
            .fetch_one(&self.pool)
            .await?;
        if existing > 0 {
            return Ok(false);
        }

        for new_test in default_catalog() {
            self.create_test(&new_test).await?;
        }
        Ok(true)
    }
}

fn check_new_test(new_test: &NewTest) -> Result<()> {
    if new_test.title.trim().is_empty() {
        return Err(Error::BadRequest("Test title is required".to_string()));
    }
    for (idx, question) in new_test.questions.iter().enumerate() {
        let n = idx + 1;
        if question.prompt.trim().is_empty() {
            return Err(Error::BadRequest(format!("Question {} has no prompt", n)));
        }
        if question.choices.len() < 2 {
            return Err(Error::BadRequest(format!(
                "Question {} needs at least two choices",
                n
            )));
        }
        if question.choices.iter().any(|c| c.label.trim().is_empty()) {
            return Err(Error::BadRequest(format!("Question {} has an empty choice", n)));
        }
        let correct = question.choices.iter().filter(|c| c.is_correct).count();
        if correct != 1 {
            return Err(Error::BadRequest(format!(
                "Question {} must have exactly one correct choice, found {}",
                n, correct
            )));
        }
    }
    Ok(())
}

pub fn default_catalog() -> Vec<NewTest> {
    vec![
        NewTest {
            title: "Fundamentos de habilidades profesionales".to_string(),
            description: Some(
                "Evalúa tus conocimientos en comunicación, gestión del tiempo y trabajo en equipo."
                    .to_string(),
            ),
            questions: vec![
                NewQuestion::new(
                    "¿Cuál es el primer paso para resolver un conflicto en el equipo?",
                    &[
                        ("Ignorar el problema y esperar a que se resuelva solo", false),
                        ("Analizar la situación y escuchar a las partes involucradas", true),
                        ("Asignar responsabilidades sin consultar", false),
                        ("Escalar inmediatamente a la dirección", false),
                    ],
                ),
                NewQuestion::new(
                    "¿Qué herramienta ayuda a priorizar tareas urgentes e importantes?",
                    &[
                        ("Diagrama de Gantt", false),
                        ("Matriz de Eisenhower", true),
                        ("Gráfico de Pareto", false),
                        ("Método de Montecarlo", false),
                    ],
                ),
            ],
        },
        NewTest {
            title: "Gestión de proyectos ágiles".to_string(),
            description: Some(
                "Comprueba tu entendimiento de Scrum, Kanban y métricas ágiles.".to_string(),
            ),
            questions: vec![
                NewQuestion::new(
                    "¿Cuál es la duración recomendada de una Daily Scrum?",
                    &[
                        ("5 minutos", false),
                        ("15 minutos", true),
                        ("45 minutos", false),
                        ("Depende del número de historias", false),
                    ],
                ),
                NewQuestion::new(
                    "¿Qué tablero visual se asocia comúnmente con Kanban?",
                    &[
                        ("Eisenhower", false),
                        ("Burndown", false),
                        ("Tres columnas: Pendiente, En progreso, Hecho", true),
                        ("Mapa de calor", false),
                    ],
                ),
            ],
        },
    ]
}
