//! Selection state over the most recent query reply.
//!
//! The controller owns the candidate list (or scalar result) and the selected
//! row. When a candidate list is held and the query is non-empty, one extra
//! row sits after the candidates: the web-search slot. It is never stored,
//! only derived from the query, so the query text is passed into every
//! operation that depends on it.
//!
//! Every mutation reports a [`Transition`] telling the highlight engine where
//! the active row is now and whether the move came from navigation (animate)
//! or from a content change (jump).

use aether_types::{LaunchRequest, QueryOutcome};

/// Default label of the web-search slot; `{query}` is replaced by the input.
pub const DEFAULT_WEB_LABEL: &str = "Look for {query} in web";

pub fn web_slot_label(template: &str, query: &str) -> String {
    template.replace("{query}", query)
}

/// What the last accepted reply held.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum Content {
    /// Nothing received yet
    #[default]
    Empty,
    Candidates(Vec<String>),
    /// Non-navigable scalar result
    Literal(String),
}

/// Where the active row moved and why.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub index: usize,
    /// True for keyboard navigation, false for content replacement
    pub animate: bool,
}

impl Transition {
    fn navigation(index: usize) -> Self {
        Self {
            index,
            animate: true,
        }
    }

    fn content(index: usize) -> Self {
        Self {
            index,
            animate: false,
        }
    }
}

/// Candidate list plus the selected index.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    content: Content,
    selected: usize,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn candidates(&self) -> Option<&[String]> {
        match &self.content {
            Content::Candidates(items) => Some(items),
            _ => None,
        }
    }

    pub fn literal(&self) -> Option<&str> {
        match &self.content {
            Content::Literal(value) => Some(value),
            _ => None,
        }
    }

    /// The web-search slot exists while a candidate list is held and the
    /// query is non-empty.
    pub fn has_web_slot(&self, query: &str) -> bool {
        matches!(self.content, Content::Candidates(_)) && !query.is_empty()
    }

    /// Number of navigable rows, web slot included.
    pub fn row_count(&self, query: &str) -> usize {
        match &self.content {
            Content::Candidates(items) => items.len() + usize::from(!query.is_empty()),
            Content::Empty | Content::Literal(_) => 0,
        }
    }

    /// Whether `index` addresses the web-search slot.
    pub fn is_web_slot(&self, index: usize, query: &str) -> bool {
        self.has_web_slot(query) && Some(index) == self.candidates().map(<[String]>::len)
    }

    /// Highest valid index: the web slot when it exists, else the last
    /// candidate. Always within `[0, len]`.
    fn upper_bound(&self, query: &str) -> usize {
        self.row_count(query).saturating_sub(1)
    }

    fn is_navigable(&self) -> bool {
        matches!(self.content, Content::Candidates(_))
    }

    /// Store a new reply. Selection always restarts at the first row.
    pub fn replace(&mut self, outcome: QueryOutcome) -> Transition {
        self.content = match outcome {
            QueryOutcome::Candidates(items) => Content::Candidates(items),
            QueryOutcome::Literal(value) => Content::Literal(value),
        };
        self.selected = 0;
        Transition::content(0)
    }

    /// ArrowUp. `None` when there is no navigable list.
    pub fn move_up(&mut self) -> Option<Transition> {
        if !self.is_navigable() {
            return None;
        }
        self.selected = self.selected.saturating_sub(1);
        Some(Transition::navigation(self.selected))
    }

    /// ArrowDown. Stops at the web slot (or the last candidate without one).
    pub fn move_down(&mut self, query: &str) -> Option<Transition> {
        if !self.is_navigable() {
            return None;
        }
        self.selected = (self.selected + 1).min(self.upper_bound(query));
        Some(Transition::navigation(self.selected))
    }

    /// Re-apply the bounds after the query changed. Returns a content
    /// transition only if the index had to move.
    pub fn reclamp(&mut self, query: &str) -> Option<Transition> {
        let clamped = self.selected.min(self.upper_bound(query));
        if clamped == self.selected {
            return None;
        }
        self.selected = clamped;
        Some(Transition::content(clamped))
    }

    /// Resolve the current selection into a launch target.
    ///
    /// The web slot resolves to the literal query with the web flag set; a
    /// candidate row resolves to that candidate. Anything else (no list yet,
    /// a scalar result, an empty list with an empty query) resolves to
    /// nothing.
    pub fn commit(&self, query: &str) -> Option<LaunchRequest> {
        let items = self.candidates()?;
        if self.is_web_slot(self.selected, query) {
            return Some(LaunchRequest::web_search(query));
        }
        items
            .get(self.selected)
            .map(|name| LaunchRequest::candidate(name.clone()))
    }
}
