//! The stateful container.
//!
//! [`App`] owns the view state and is the only thing that mutates it. It
//! never performs I/O on its own schedule: every accepted page change hands
//! back a [`FetchTicket`] which the caller turns into a request, and the
//! outcome comes back through [`App::apply`].
//!
//! Each ticket carries a generation number. Only the outcome of the most
//! recently issued ticket is applied, so a slow response for an old page
//! cannot overwrite the page the user has moved on to.

use crate::api::NewsSource;
use crate::error::Result;
use crate::locale::{Labels, Language};
use crate::models::{Article, ArticleKey, PageResponse};
use crate::views::Screen;
use crate::views::header::Header;
use crate::views::news_card::NewsCard;
use crate::views::pagination::Pagination;
use chrono::NaiveDate;
use tracing::{debug, info, instrument, warn};

/// Everything the screen is rendered from.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub language: Language,
    pub articles: Vec<Article>,
    /// 1-based.
    pub current_page: u32,
    /// At least 1.
    pub total_pages: u32,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            language: Language::default(),
            articles: Vec::new(),
            current_page: 1,
            total_pages: 1,
        }
    }
}

/// One issued page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    /// 1-based page this request is for.
    pub page: u32,
    pub size: u32,
}

impl FetchTicket {
    /// The 0-based index the backend expects.
    pub fn page_index(&self) -> u32 {
        self.page.saturating_sub(1)
    }
}

/// What [`App::apply`] did with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Articles and page count replaced.
    Updated,
    /// The fetch failed; articles cleared, page count kept.
    Cleared,
    /// A newer request was issued since; outcome ignored.
    Stale,
}

#[derive(Debug)]
pub struct App {
    state: ViewState,
    page_size: u32,
    /// Generation of the latest issued ticket.
    generation: u64,
}

impl App {
    pub fn new(page_size: u32, language: Language) -> Self {
        Self {
            state: ViewState {
                language,
                ..ViewState::default()
            },
            page_size: page_size.max(1),
            generation: 0,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Issue a request for the current page, superseding any earlier one.
    pub fn request_current_page(&mut self) -> FetchTicket {
        self.generation += 1;
        let ticket = FetchTicket {
            generation: self.generation,
            page: self.state.current_page,
            size: self.page_size,
        };
        debug!(?ticket, "Issued fetch ticket");
        ticket
    }

    /// Move to `page` if it is within `1..=total_pages`.
    ///
    /// Out-of-range requests are dropped without complaint, and re-selecting
    /// the current page changes nothing. Returns the fetch to run when the
    /// page actually changed.
    #[instrument(level = "debug", skip(self), fields(current = self.state.current_page, total = self.state.total_pages))]
    pub fn handle_page_change(&mut self, page: u32) -> Option<FetchTicket> {
        if page < 1 || page > self.state.total_pages {
            debug!("Ignoring out-of-range page change");
            return None;
        }
        if page == self.state.current_page {
            return None;
        }
        self.state.current_page = page;
        Some(self.request_current_page())
    }

    /// Record the chosen language. Nothing else changes.
    pub fn toggle_language(&mut self, language: Language) {
        debug!(from = %self.state.language, to = %language, "Language toggled");
        self.state.language = language;
    }

    /// Apply the outcome of `ticket`'s fetch.
    #[instrument(level = "debug", skip(self, outcome), fields(generation = ticket.generation, page = ticket.page))]
    pub fn apply(&mut self, ticket: FetchTicket, outcome: Result<PageResponse>) -> Applied {
        if ticket.generation != self.generation {
            debug!(latest = self.generation, "Dropping stale page response");
            return Applied::Stale;
        }

        match outcome {
            Ok(page) => {
                info!(
                    articles = page.content.len(),
                    total_pages = page.total_pages,
                    "Page loaded"
                );
                self.state.articles = page.content;
                self.state.total_pages = page.total_pages.max(1);
                Applied::Updated
            }
            Err(e) => {
                warn!(error = %e, "Page fetch failed; clearing articles");
                self.state.articles.clear();
                Applied::Cleared
            }
        }
    }

    /// Fetch the current page from `source` and apply it in one step.
    pub async fn load<S: NewsSource>(&mut self, source: &S) -> Applied {
        let ticket = self.request_current_page();
        let outcome = source.fetch_page(ticket.page_index(), ticket.size).await;
        self.apply(ticket, outcome)
    }

    pub fn labels(&self) -> &'static Labels {
        Labels::for_language(self.state.language)
    }

    pub fn header(&self, today: NaiveDate) -> Header {
        Header::new(today, self.state.language, self.labels())
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.state.current_page, self.state.total_pages, self.labels())
    }

    /// Keys of the articles on screen, in display order.
    pub fn card_keys(&self) -> Vec<ArticleKey> {
        self.state.articles.iter().map(Article::key).collect()
    }

    /// The card currently showing the article with `key`, if any.
    pub fn card_for_key(&self, key: &ArticleKey) -> Option<NewsCard<'_>> {
        self.state
            .articles
            .iter()
            .position(|a| &a.key() == key)
            .map(|i| NewsCard::new(i + 1, &self.state.articles[i], self.labels()))
    }

    pub fn screen(&self, today: NaiveDate) -> Screen<'_> {
        let labels = self.labels();
        Screen {
            header: self.header(today),
            cards: self
                .state
                .articles
                .iter()
                .enumerate()
                .map(|(i, article)| NewsCard::new(i + 1, article, labels))
                .collect(),
            pagination: self.pagination(),
            empty_label: labels.empty_list,
        }
    }
}
