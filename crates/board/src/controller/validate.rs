//! The validation step between controllers and services.

use std::fmt;

use indexmap::IndexMap;

/// Longest accepted question title, matching the `VARCHAR(255)` column.
pub const TITLE_MAX_CHARS: usize = 255;

/// Shortest accepted answer.
pub const ANSWER_MIN_CHARS: usize = 10;

/// Longest accepted answer.
pub const ANSWER_MAX_CHARS: usize = 300;

/// Submitted question form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionForm {
    pub title: String,
    pub content: String,
}

/// Submitted answer form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerForm {
    pub content: String,
}

/// Messages per field, in the order fields were checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: IndexMap<&'static str, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Messages for `field`, empty when it passed.
    pub fn field(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &[String])> {
        self.fields.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.fields {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

fn required(errors: &mut ValidationErrors, field: &'static str, value: &str) -> bool {
    if value.trim().is_empty() {
        errors.add(field, format!("The {field} field is required."));
        return false;
    }
    true
}

/// Title required and at most 255 characters; content required.
pub fn validate_question(form: &QuestionForm) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if required(&mut errors, "title", &form.title) && form.title.chars().count() > TITLE_MAX_CHARS {
        errors.add(
            "title",
            format!("The title may not be greater than {TITLE_MAX_CHARS} characters."),
        );
    }
    required(&mut errors, "content", &form.content);

    errors.into_result()
}

/// Content required, between 10 and 300 characters.
pub fn validate_answer(form: &AnswerForm) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if required(&mut errors, "content", &form.content) {
        let len = form.content.chars().count();
        if len < ANSWER_MIN_CHARS {
            errors.add(
                "content",
                format!("The content must be at least {ANSWER_MIN_CHARS} characters."),
            );
        } else if len > ANSWER_MAX_CHARS {
            errors.add(
                "content",
                format!("The content may not be greater than {ANSWER_MAX_CHARS} characters."),
            );
        }
    }

    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn question(title: &str, content: &str) -> QuestionForm {
        QuestionForm {
            title: title.to_owned(),
            content: content.to_owned(),
        }
    }

    #[test]
    fn question_requires_both_fields() {
        let errors = validate_question(&question("  ", "")).unwrap_err();
        assert_eq!(errors.field("title"), ["The title field is required."]);
        assert_eq!(errors.field("content"), ["The content field is required."]);
        assert_eq!(
            errors.to_string(),
            "title: The title field is required.; content: The content field is required."
        );
    }

    #[test]
    fn title_length_is_counted_in_characters() {
        assert!(validate_question(&question(&"é".repeat(255), "body")).is_ok());

        let errors = validate_question(&question(&"a".repeat(256), "body")).unwrap_err();
        assert!(errors.field("content").is_empty());
        assert_eq!(errors.field("title").len(), 1);
    }

    #[test]
    fn answer_length_bounds() {
        let answer = |s: &str| AnswerForm {
            content: s.to_owned(),
        };
        assert!(validate_answer(&answer("")).is_err());
        assert!(validate_answer(&answer("too short")).is_err());
        assert!(validate_answer(&answer("just enough")).is_ok());
        assert!(validate_answer(&answer(&"x".repeat(300))).is_ok());
        assert!(validate_answer(&answer(&"x".repeat(301))).is_err());
    }

    proptest! {
        #[test]
        fn any_non_blank_short_title_with_content_passes(
            title in "[a-zA-Z0-9 ]{0,254}[a-zA-Z0-9]",
            content in "\\PC*[a-z]\\PC*",
        ) {
            prop_assert!(validate_question(&question(&title, &content)).is_ok());
        }

        #[test]
        fn answers_pass_exactly_within_bounds(len in 0usize..400) {
            let form = AnswerForm { content: "a".repeat(len) };
            let expected = (ANSWER_MIN_CHARS..=ANSWER_MAX_CHARS).contains(&len);
            prop_assert_eq!(validate_answer(&form).is_ok(), expected);
        }
    }
}
