/// Direction of a phrase navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhraseStep {
    Previous,
    Next,
}

/// Position within the backend's phrase deck.
///
/// Navigation wraps at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhraseDeck {
    count: usize,
    index: usize,
}

impl PhraseDeck {
    /// `None` when the deck is empty.
    pub fn new(count: usize) -> Option<Self> {
        (count > 0).then_some(Self { count, index: 0 })
    }

    /// Start at `index`, wrapped into range.
    pub fn starting_at(count: usize, index: usize) -> Option<Self> {
        Self::new(count).map(|deck| Self {
            index: index % count,
            ..deck
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn step(&mut self, step: PhraseStep) -> usize {
        match step {
            PhraseStep::Previous => self.prev(),
            PhraseStep::Next => self.next(),
        }
    }

    pub fn next(&mut self) -> usize {
        self.index = (self.index + 1) % self.count;
        self.index
    }

    pub fn prev(&mut self) -> usize {
        self.index = if self.index == 0 {
            self.count - 1
        } else {
            self.index - 1
        };
        self.index
    }
}
