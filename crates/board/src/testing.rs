//! In-memory repository doubles for unit tests.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{Duration, TimeZone, Utc};

use crate::Result;
use crate::model::{Answer, AnswerLike, Question};
use crate::repository::{AnswerRepository, LikeRepository, QuestionRepository};

#[derive(Default)]
struct State {
    next_id: i64,
    questions: Vec<Question>,
    answers: Vec<Answer>,
    likes: Vec<AnswerLike>,
    list_limits: Vec<usize>,
}

impl State {
    /// Monotonic ids and timestamps, one second apart.
    fn stamp(&mut self) -> (i64, chrono::DateTime<Utc>) {
        self.next_id += 1;
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_default();
        (self.next_id, base + Duration::seconds(self.next_id))
    }
}

/// One shared store implementing every repository trait.
#[derive(Clone, Default)]
pub(crate) struct MemoryBoard {
    state: Arc<Mutex<State>>,
}

impl MemoryBoard {
    fn with<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
        f(&mut self.state.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Limits passed to `list_questions`, in call order.
    pub(crate) fn list_limits(&self) -> Vec<usize> {
        self.with(|s| s.list_limits.clone())
    }

    pub(crate) fn like_rows(&self) -> usize {
        self.with(|s| s.likes.len())
    }
}

impl QuestionRepository for MemoryBoard {
    async fn list_questions(&self, limit: usize) -> Result<Vec<Question>> {
        Ok(self.with(|s| {
            s.list_limits.push(limit);
            let mut questions = s.questions.clone();
            questions.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
            questions.truncate(limit);
            questions
        }))
    }

    async fn find_question(&self, id: i64) -> Result<Option<Question>> {
        Ok(self.with(|s| s.questions.iter().find(|q| q.id == id).cloned()))
    }

    async fn create_question(&self, title: &str, content: &str, author_id: i64) -> Result<Question> {
        Ok(self.with(|s| {
            let (id, now) = s.stamp();
            let question = Question {
                id,
                title: title.to_owned(),
                content: content.to_owned(),
                user_id: author_id,
                created_at: now,
                updated_at: now,
            };
            s.questions.push(question.clone());
            question
        }))
    }
}

impl AnswerRepository for MemoryBoard {
    async fn list_answers_for_question(&self, question_id: i64) -> Result<Vec<Answer>> {
        Ok(self.with(|s| {
            s.answers
                .iter()
                .filter(|a| a.question_id == question_id)
                .map(|a| Answer {
                    likes_count: s.likes.iter().filter(|l| l.answer_id == a.id).count() as i64,
                    ..a.clone()
                })
                .collect()
        }))
    }

    async fn create_answer(&self, content: &str, author_id: i64, question_id: i64) -> Result<Answer> {
        Ok(self.with(|s| {
            let (id, now) = s.stamp();
            let answer = Answer {
                id,
                content: content.to_owned(),
                user_id: author_id,
                question_id,
                likes_count: 0,
                created_at: now,
                updated_at: now,
            };
            s.answers.push(answer.clone());
            answer
        }))
    }
}

impl LikeRepository for MemoryBoard {
    async fn insert_like(&self, user_id: i64, answer_id: i64) -> Result<AnswerLike> {
        Ok(self.with(|s| {
            let (id, now) = s.stamp();
            let like = AnswerLike {
                id,
                user_id,
                answer_id,
                created_at: now,
                updated_at: now,
            };
            s.likes.push(like.clone());
            like
        }))
    }

    async fn delete_like(&self, user_id: i64, answer_id: i64) -> Result<bool> {
        Ok(self.with(|s| {
            let before = s.likes.len();
            s.likes
                .retain(|l| !(l.user_id == user_id && l.answer_id == answer_id));
            s.likes.len() != before
        }))
    }

    async fn count_likes(&self, answer_id: i64) -> Result<i64> {
        Ok(self.with(|s| s.likes.iter().filter(|l| l.answer_id == answer_id).count() as i64))
    }

    async fn is_liked_by(&self, answer_id: i64, user_id: i64) -> Result<bool> {
        Ok(self.with(|s| {
            s.likes
                .iter()
                .any(|l| l.answer_id == answer_id && l.user_id == user_id)
        }))
    }
}
