//! Top bar: today's date, the site title, and the language toggle.

use crate::locale::{Labels, Language};
use crate::utils::display_date;
use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy)]
pub struct Header {
    today: NaiveDate,
    language: Language,
    labels: &'static Labels,
}

impl Header {
    pub fn new(today: NaiveDate, language: Language, labels: &'static Labels) -> Self {
        Self {
            today,
            language,
            labels,
        }
    }

    /// Activate the label for `language`.
    pub fn select(&self, language: Language, on_toggle: impl FnOnce(Language)) {
        on_toggle(language);
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let toggle = Language::ALL
            .iter()
            .map(|&lang| {
                if lang == self.language {
                    format!("[{lang}]")
                } else {
                    lang.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" | ");
        write!(
            f,
            "{}    {}    {}",
            display_date(self.today),
            self.labels.site_title,
            toggle
        )
    }
}
