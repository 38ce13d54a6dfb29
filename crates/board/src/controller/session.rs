/// Per-visitor state carried between requests.
///
/// Holds the target of the two-step answer flow: opening the answer form
/// remembers who is answering which question, and storing the answer reads
/// it back and forgets the question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user_id: Option<i64>,
    question_id: Option<i64>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember that `user_id` is answering `question_id`.
    pub fn begin_answer(&mut self, user_id: i64, question_id: i64) {
        self.user_id = Some(user_id);
        self.question_id = Some(question_id);
    }

    pub fn user_id(&self) -> Option<i64> {
        self.user_id
    }

    pub fn question_id(&self) -> Option<i64> {
        self.question_id
    }

    /// Take the pending question, leaving the user in place.
    pub fn forget_question(&mut self) -> Option<i64> {
        self.question_id.take()
    }
}
