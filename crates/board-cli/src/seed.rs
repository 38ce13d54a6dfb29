//! Demo data for a fresh board.

use board::{
    AnswerService, PgAnswerRepository, PgLikeRepository, PgQuestionRepository, QuestionService,
    TracedPool, UserRepository,
};
use tracing::info;

/// Locked password hash: seeded users cannot sign in.
const LOCKED_PASSWORD: &str = "!";

const USERS: &[(&str, &str)] = &[("alice", "alice@example.com"), ("bob", "bob@example.com")];

/// `(author index, title, content)`
const QUESTIONS: &[(usize, &str, &str)] = &[
    (
        0,
        "What was your best purchase this year?",
        "Planning to spend my bonus on something. What have you bought recently that was worth it?",
    ),
    (
        1,
        "Where is the best ramen in town?",
        "Famous or hidden, tell me the single bowl you would queue for.",
    ),
    (
        0,
        "How do I get better at building in Fortnite?",
        "I keep losing build fights. Which drills actually helped you improve?",
    ),
];

/// `(author index, question index, content)`
const ANSWERS: &[(usize, usize, &str)] = &[(
    1,
    0,
    "Picked up a tablet during a sale and use it every single day.",
)];

/// What a seed run did.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub questions: usize,
    pub answers: usize,
}

/// Insert the demo users, questions and answers.
///
/// Does nothing when the first demo user already exists.
pub async fn seed(pool: &TracedPool) -> board::Result<SeedSummary> {
    let users = UserRepository::new(pool.clone());
    if users.find_user_by_email(USERS[0].1).await?.is_some() {
        info!("demo data already present, skipping");
        return Ok(SeedSummary::default());
    }

    let mut user_ids = Vec::with_capacity(USERS.len());
    for (name, email) in USERS {
        user_ids.push(users.create_user(name, email, LOCKED_PASSWORD).await?.id);
    }

    let questions = QuestionService::new(PgQuestionRepository::new(pool.clone()), None);
    let mut question_ids = Vec::with_capacity(QUESTIONS.len());
    for &(author, title, content) in QUESTIONS {
        let question = questions
            .store_question(title, content, user_ids[author])
            .await?;
        question_ids.push(question.id);
    }

    let answers = AnswerService::new(
        PgAnswerRepository::new(pool.clone()),
        PgLikeRepository::new(pool.clone()),
    );
    for &(author, question, content) in ANSWERS {
        answers
            .store_answer(content, user_ids[author], question_ids[question])
            .await?;
    }

    let summary = SeedSummary {
        users: user_ids.len(),
        questions: question_ids.len(),
        answers: ANSWERS.len(),
    };
    info!(?summary, "seeded demo data");
    Ok(summary)
}
