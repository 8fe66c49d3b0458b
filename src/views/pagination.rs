//! Previous/Next controls and the page indicator.
//!
//! A disabled control never fires its callback. Whatever page a control does
//! request is still bounds-checked by the container.

use crate::locale::Labels;
use std::fmt;

#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    current: u32,
    total: u32,
    labels: &'static Labels,
}

impl Pagination {
    pub fn new(current: u32, total: u32, labels: &'static Labels) -> Self {
        Self {
            current,
            total,
            labels,
        }
    }

    pub fn previous_disabled(&self) -> bool {
        self.current <= 1
    }

    /// Also disabled when a shrinking page count left `current` past the end.
    pub fn next_disabled(&self) -> bool {
        self.current >= self.total
    }

    pub fn indicator(&self) -> String {
        self.labels.page_indicator(self.current, self.total)
    }

    /// Returns whether the callback fired.
    pub fn previous(&self, on_change: impl FnOnce(u32)) -> bool {
        if self.previous_disabled() {
            return false;
        }
        on_change(self.current - 1);
        true
    }

    /// Returns whether the callback fired.
    pub fn next(&self, on_change: impl FnOnce(u32)) -> bool {
        if self.next_disabled() {
            return false;
        }
        on_change(self.current + 1);
        true
    }
}

impl fmt::Display for Pagination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prev_key = if self.previous_disabled() { "-" } else { "p" };
        let next_key = if self.next_disabled() { "-" } else { "n" };
        write!(
            f,
            "[{prev_key}] {}    {}    {} [{next_key}]",
            self.labels.previous,
            self.indicator(),
            self.labels.next
        )
    }
}
