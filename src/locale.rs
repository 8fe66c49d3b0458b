//! Display language and the label tables used by every view.
//!
//! Selecting a language only flips a state flag. Views never hard-code
//! strings; they read them from a [`Labels`] table chosen through
//! [`Labels::for_language`], so localized rendering means adding a table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The languages offered by the header toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum Language {
    #[default]
    #[serde(rename = "ENG", alias = "eng")]
    #[value(name = "ENG")]
    Eng,
    #[serde(rename = "ESP", alias = "esp")]
    #[value(name = "ESP")]
    Esp,
}

impl Language {
    /// All languages in the order the header shows them.
    pub const ALL: [Language; 2] = [Language::Eng, Language::Esp];

    /// The short code shown on the header label.
    pub fn code(self) -> &'static str {
        match self {
            Language::Eng => "ENG",
            Language::Esp => "ESP",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ENG" => Ok(Language::Eng),
            "ESP" => Ok(Language::Esp),
            other => Err(format!("unknown language code: {other}")),
        }
    }
}

/// Every user-visible string the views render.
#[derive(Debug, PartialEq, Eq)]
pub struct Labels {
    pub site_title: &'static str,
    pub unknown_date: &'static str,
    pub untitled: &'static str,
    pub no_description: &'static str,
    pub previous: &'static str,
    pub next: &'static str,
    /// Page indicator template; `{current}` and `{total}` are substituted.
    pub page_indicator: &'static str,
    pub empty_list: &'static str,
    pub image: &'static str,
    pub link: &'static str,
}

pub const ENGLISH: Labels = Labels {
    site_title: "The New York Times",
    unknown_date: "Unknown Date",
    untitled: "Untitled",
    no_description: "No description available",
    previous: "Previous",
    next: "Next",
    page_indicator: "Page {current} of {total}",
    empty_list: "No articles to show.",
    image: "image",
    link: "link",
};

impl Labels {
    /// The label table for `language`.
    pub fn for_language(language: Language) -> &'static Labels {
        match language {
            Language::Eng => &ENGLISH,
            // TODO: return a Spanish table once translated strings are available.
            Language::Esp => &ENGLISH,
        }
    }

    pub fn page_indicator(&self, current: u32, total: u32) -> String {
        self.page_indicator
            .replace("{current}", &current.to_string())
            .replace("{total}", &total.to_string())
    }
}
