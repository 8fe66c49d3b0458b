//! Presentational components.
//!
//! Views are built fresh from the container's state for every render and
//! hold nothing but borrowed, read-only inputs. Interaction flows back out
//! through callbacks:
//!
//! - [`news_card`]: one article card; activating it opens the article
//! - [`header`]: date, title, and the language toggle
//! - [`pagination`]: Previous/Next and the page indicator
//!
//! [`Screen`] stacks them into the full terminal page.

pub mod header;
pub mod news_card;
pub mod pagination;

use header::Header;
use news_card::NewsCard;
use pagination::Pagination;
use std::fmt;

const RULE_WIDTH: usize = 72;

/// Everything visible at once: header, card list, pagination.
#[derive(Debug)]
pub struct Screen<'a> {
    pub header: Header,
    pub cards: Vec<NewsCard<'a>>,
    pub pagination: Pagination,
    pub empty_label: &'static str,
}

impl fmt::Display for Screen<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(RULE_WIDTH);
        writeln!(f, "{}", self.header)?;
        writeln!(f, "{rule}")?;
        if self.cards.is_empty() {
            writeln!(f, "{}", self.empty_label)?;
        }
        for card in &self.cards {
            writeln!(f, "{card}")?;
            writeln!(f)?;
        }
        writeln!(f, "{rule}")?;
        writeln!(f, "{}", self.pagination)
    }
}
