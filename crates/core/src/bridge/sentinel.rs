//! Change detection through a toggled document title
//!
//! Older editor builds signal edits by flipping `document.title` between two
//! sentinel strings instead of navigating to the data scheme. Every flip is
//! an edit, in both directions.

#[derive(Debug, Clone)]
pub struct TitleSentinelWatcher {
    sentinels: [String; 2],
    last: Option<usize>,
}

impl TitleSentinelWatcher {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            sentinels: [first.into(), second.into()],
            last: None,
        }
    }

    /// Feed the current title; true when it signals an edit
    ///
    /// The first sentinel seen counts too, since the page starts from a
    /// non-sentinel title.
    pub fn observe(&mut self, title: &str) -> bool {
        let Some(index) = self.sentinels.iter().position(|s| s == title) else {
            return false;
        };

        if self.last == Some(index) {
            return false;
        }
        self.last = Some(index);
        true
    }
}
