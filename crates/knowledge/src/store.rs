//! Position-keyed answer store, kept row-aligned with the vector index.

/// Ordered answers; the answer at position `i` belongs to index row `i`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerStore {
    answers: Vec<String>,
}

impl AnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer stored at `position`, or `None` if there is none.
    pub fn get(&self, position: usize) -> Option<&str> {
        self.answers.get(position).map(String::as_str)
    }

    /// Replace all content; answers take positions `0..n` in order.
    pub fn replace_all<I, S>(&mut self, answers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.answers = answers.into_iter().map(Into::into).collect();
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// `(position, answer)` in position order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.answers.iter().map(String::as_str).enumerate()
    }
}
