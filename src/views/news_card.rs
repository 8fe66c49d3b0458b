//! One article rendered as a card.

use crate::locale::Labels;
use crate::models::Article;
use crate::navigator::{Navigator, PLACEHOLDER_TARGET};
use crate::utils::display_date;
use std::fmt;
use tracing::{info, warn};

/// Image shown when an article has no media URL.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://static01.nyt.com/images/2025/05/02/multimedia/00mercedes-battery-01-zmwt/00mercedes-battery-01-zmwt-mediumSquareAt3X.jpg";

/// The activatable regions of a card. All of them open the article.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardPart {
    Title,
    Description,
    Image,
}

#[derive(Debug, Clone, Copy)]
pub struct NewsCard<'a> {
    /// 1-based position on the current screen.
    number: usize,
    article: &'a Article,
    labels: &'static Labels,
}

impl<'a> NewsCard<'a> {
    pub fn new(number: usize, article: &'a Article, labels: &'static Labels) -> Self {
        Self {
            number,
            article,
            labels,
        }
    }

    pub fn date_text(&self) -> String {
        self.article
            .published_date
            .map(|dt| display_date(dt.date()))
            .unwrap_or_else(|| self.labels.unknown_date.to_string())
    }

    pub fn title_text(&self) -> &'a str {
        self.article.title.as_deref().unwrap_or(self.labels.untitled)
    }

    pub fn description_text(&self) -> &'a str {
        self.article
            .description
            .as_deref()
            .unwrap_or(self.labels.no_description)
    }

    pub fn image_url(&self) -> &'a str {
        self.article.media_url.as_deref().unwrap_or(PLACEHOLDER_IMAGE_URL)
    }

    /// Where activating the card leads.
    pub fn link_target(&self) -> &'a str {
        self.article.link.as_deref().unwrap_or(PLACEHOLDER_TARGET)
    }

    /// Open the card's target. Navigator failures are logged, never returned.
    pub fn activate(&self, part: CardPart, navigator: &dyn Navigator) -> &'a str {
        let target = self.link_target();
        match navigator.open(target) {
            Ok(()) => info!(card = self.number, ?part, %target, "Opened article"),
            Err(e) => warn!(card = self.number, ?part, %target, error = %e, "Could not open article"),
        }
        target
    }
}

impl fmt::Display for NewsCard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indent = " ".repeat(format!("[{}] ", self.number).len());
        writeln!(f, "[{}] {}", self.number, self.date_text())?;
        writeln!(f, "{indent}{}", self.title_text())?;
        writeln!(f, "{indent}{}", self.description_text())?;
        writeln!(f, "{indent}{}: {}", self.labels.image, self.image_url())?;
        write!(f, "{indent}{}: {}", self.labels.link, self.link_target())
    }
}
