use crate::Result;
use crate::model::Answer;
use crate::repository::{AnswerRepository, LikeRepository};
use crate::view::LikeStatus;

/// Answer and like use cases.
pub struct AnswerService<A, L> {
    answers: A,
    likes: L,
}

impl<A: AnswerRepository, L: LikeRepository> AnswerService<A, L> {
    pub fn new(answers: A, likes: L) -> Self {
        Self { answers, likes }
    }

    /// Answers shown under a question.
    pub async fn answer_list_for_question_page(&self, question_id: i64) -> Result<Vec<Answer>> {
        self.answers.list_answers_for_question(question_id).await
    }

    pub async fn store_answer(&self, content: &str, user_id: i64, question_id: i64) -> Result<Answer> {
        self.answers
            .create_answer(content, user_id, question_id)
            .await
    }

    /// Like `answer_id` as `user_id`. Liking twice leaves a single like.
    pub async fn like_answer(&self, user_id: i64, answer_id: i64) -> Result<LikeStatus> {
        if !self.likes.is_liked_by(answer_id, user_id).await? {
            match self.likes.insert_like(user_id, answer_id).await {
                Ok(_) => {}
                // lost a race with a concurrent like from the same user
                Err(err) if err.is_unique_violation() => {
                    tracing::debug!(user_id, answer_id, "answer already liked");
                }
                Err(err) => return Err(err),
            }
        }

        Ok(LikeStatus {
            liked: true,
            likes_count: self.likes.count_likes(answer_id).await?,
        })
    }

    /// Withdraw `user_id`'s like. Unliking an answer that was never liked is a no-op.
    pub async fn unlike_answer(&self, user_id: i64, answer_id: i64) -> Result<LikeStatus> {
        self.likes.delete_like(user_id, answer_id).await?;
        Ok(LikeStatus {
            liked: false,
            likes_count: self.likes.count_likes(answer_id).await?,
        })
    }
}
