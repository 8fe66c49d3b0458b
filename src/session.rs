//! Interactive terminal session.
//!
//! The session owns the [`App`], runs fetches as tokio tasks, and routes
//! typed commands to the same component callbacks a click would reach:
//!
//! ```text
//! stdin ──> Command ──> Header / Pagination / NewsCard ──> App
//!                                                          │ FetchTicket
//!   screen <── App::apply <── mpsc <── spawned fetch <─────┘
//! ```
//!
//! Dispatching a new fetch aborts the previous task. An outcome that was
//! already queued before the abort is still rejected by the generation
//! check in [`App::apply`].

use crate::api::NewsSource;
use crate::app::{App, Applied, FetchTicket};
use crate::error::Result;
use crate::locale::Language;
use crate::models::{ArticleKey, PageResponse};
use crate::navigator::Navigator;
use crate::views::news_card::CardPart;
use chrono::{Local, NaiveDate};
use std::str::FromStr;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

pub const HELP: &str = "\
Commands:
  n, next          next page
  p, prev          previous page
  g <page>         go to page
  eng, esp         choose language
  o <card> [part]  open card in the browser (title, description, image)
  r, refresh       reload the current page
  h, help          show this help
  q, quit          exit";

const PROMPT: &str = "> ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Next,
    Previous,
    Goto(u32),
    Language(Language),
    /// 1-based card number as shown on screen, and the part activated.
    Open(usize, CardPart),
    Refresh,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let verb = words.next().unwrap_or_default().to_ascii_lowercase();
        let arg = words.next();

        let number = |what: &str| -> std::result::Result<u64, String> {
            arg.ok_or_else(|| format!("`{verb}` needs a {what} number"))?
                .parse::<u64>()
                .map_err(|_| format!("not a {what} number: {}", arg.unwrap_or_default()))
        };

        match verb.as_str() {
            "n" | "next" => Ok(Command::Next),
            "p" | "prev" | "previous" => Ok(Command::Previous),
            "g" | "go" | "goto" => {
                let page = number("page")?;
                Ok(Command::Goto(u32::try_from(page).unwrap_or(u32::MAX)))
            }
            "eng" | "esp" => verb.parse().map(Command::Language),
            "o" | "open" => {
                let card = number("card")?;
                let part = match words.next().map(str::to_ascii_lowercase).as_deref() {
                    None | Some("title") => CardPart::Title,
                    Some("description") | Some("desc") => CardPart::Description,
                    Some("image") | Some("img") => CardPart::Image,
                    Some(other) => return Err(format!("unknown card part: {other}")),
                };
                Ok(Command::Open(usize::try_from(card).unwrap_or(usize::MAX), part))
            }
            "r" | "refresh" => Ok(Command::Refresh),
            "h" | "help" | "?" => Ok(Command::Help),
            "q" | "quit" | "exit" => Ok(Command::Quit),
            other => Err(format!("unknown command: {other}")),
        }
    }
}

/// What the loop should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Redraw,
    Say(String),
    Idle,
    Quit,
}

type Outcome = (FetchTicket, Result<PageResponse>);

pub struct Session<S, N> {
    app: App,
    source: Arc<S>,
    navigator: N,
    outcomes_tx: mpsc::UnboundedSender<Outcome>,
    outcomes_rx: mpsc::UnboundedReceiver<Outcome>,
    in_flight: Option<JoinHandle<()>>,
    /// Keys of the cards on the last drawn screen, in order.
    displayed: Vec<ArticleKey>,
}

impl<S, N> Session<S, N>
where
    S: NewsSource + Send + Sync + 'static,
    N: Navigator,
{
    pub fn new(app: App, source: Arc<S>, navigator: N) -> Self {
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();
        Self {
            app,
            source,
            navigator,
            outcomes_tx,
            outcomes_rx,
            in_flight: None,
            displayed: Vec::new(),
        }
    }

    /// Start fetching for `ticket`, cancelling whatever was in flight.
    #[instrument(level = "debug", skip(self))]
    pub fn dispatch(&mut self, ticket: FetchTicket) {
        if let Some(previous) = self.in_flight.take() {
            if !previous.is_finished() {
                debug!("Cancelling superseded fetch");
            }
            previous.abort();
        }

        let source = Arc::clone(&self.source);
        let tx = self.outcomes_tx.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let outcome = source.fetch_page(ticket.page_index(), ticket.size).await;
            // The receiver lives as long as the session.
            let _ = tx.send((ticket, outcome));
        }));
    }

    /// Fold a finished fetch into the app. Anything but `Stale` needs a redraw.
    fn apply_outcome(&mut self, (ticket, outcome): Outcome) -> Applied {
        let applied = self.app.apply(ticket, outcome);
        debug!(?applied, page = ticket.page, "Fetch outcome received");
        applied
    }

    /// Wait for the next fetch outcome and apply it.
    #[cfg(test)]
    async fn settle(&mut self) -> Option<Applied> {
        let outcome = self.outcomes_rx.recv().await?;
        Some(self.apply_outcome(outcome))
    }

    pub fn handle(&mut self, command: Command) -> Flow {
        debug!(?command, "Handling command");
        match command {
            Command::Next | Command::Previous => {
                let pager = self.app.pagination();
                let mut ticket = None;
                let on_change = |page| ticket = self.app.handle_page_change(page);
                let fired = if command == Command::Next {
                    pager.next(on_change)
                } else {
                    pager.previous(on_change)
                };
                match ticket {
                    Some(ticket) => {
                        self.dispatch(ticket);
                        Flow::Redraw
                    }
                    None => {
                        debug!(fired, "Page control had no effect");
                        Flow::Idle
                    }
                }
            }
            Command::Goto(page) => match self.app.handle_page_change(page) {
                Some(ticket) => {
                    self.dispatch(ticket);
                    Flow::Redraw
                }
                None => Flow::Idle,
            },
            Command::Language(language) => {
                let header = self.app.header(today());
                header.select(language, |lang| self.app.toggle_language(lang));
                Flow::Redraw
            }
            Command::Open(number, part) => self.open_card(number, part),
            Command::Refresh => {
                let ticket = self.app.request_current_page();
                self.dispatch(ticket);
                Flow::Idle
            }
            Command::Help => Flow::Say(HELP.to_string()),
            Command::Quit => Flow::Quit,
        }
    }

    fn open_card(&self, number: usize, part: CardPart) -> Flow {
        let Some(key) = number.checked_sub(1).and_then(|i| self.displayed.get(i)) else {
            return Flow::Say(format!("No card {number} on this page"));
        };
        debug!(card = number, %key, "Resolved card");
        match self.app.card_for_key(key) {
            Some(card) => {
                let target = card.activate(part, &self.navigator);
                Flow::Say(format!("Opening {target}"))
            }
            None => Flow::Say(format!("No card {number} on this page")),
        }
    }

    /// Render the screen and remember which articles it shows.
    pub fn render(&mut self, today: NaiveDate) -> String {
        self.displayed = self.app.card_keys();
        self.app.screen(today).to_string()
    }

    async fn draw<W: AsyncWrite + Unpin>(&mut self, output: &mut W) -> Result<()> {
        let text = self.render(today());
        output.write_all(b"\n").await?;
        output.write_all(text.as_bytes()).await?;
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;
        Ok(())
    }

    async fn say<W: AsyncWrite + Unpin>(output: &mut W, message: &str) -> Result<()> {
        output.write_all(message.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;
        Ok(())
    }

    /// Drive the session until `quit`, end of input, or Ctrl-C.
    ///
    /// Input bytes that are not valid UTF-8 are decoded lossily, so a garbled
    /// line is reported as an unknown command instead of ending the session.
    pub async fn run<R, W>(mut self, mut input: R, mut output: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        // Survives a cancelled read so partial lines are not lost.
        let mut buf = Vec::new();
        let first = self.app.request_current_page();
        self.dispatch(first);
        self.draw(&mut output).await?;
        info!("Session started");

        loop {
            tokio::select! {
                read = input.read_until(b'\n', &mut buf) => {
                    if read? == 0 && buf.is_empty() {
                        debug!("Input closed");
                        break;
                    }
                    let line = String::from_utf8_lossy(&buf).trim().to_string();
                    buf.clear();
                    if line.is_empty() {
                        continue;
                    }
                    match line.parse::<Command>() {
                        Ok(command) => match self.handle(command) {
                            Flow::Redraw => self.draw(&mut output).await?,
                            Flow::Say(message) => Self::say(&mut output, &message).await?,
                            Flow::Idle => {}
                            Flow::Quit => break,
                        },
                        Err(e) => Self::say(&mut output, &format!("{e} (h for help)")).await?,
                    }
                }
                Some(outcome) = self.outcomes_rx.recv() => {
                    if self.apply_outcome(outcome) != Applied::Stale {
                        self.draw(&mut output).await?;
                    }
                }
                res = tokio::signal::ctrl_c() => {
                    if let Err(e) = res {
                        warn!(error = %e, "Could not listen for Ctrl-C");
                    }
                    break;
                }
            }
        }

        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
        info!("Session ended");
        Ok(())
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::{FakeSource, Reply, page};
    use crate::navigator::PLACEHOLDER_TARGET;
    use crate::navigator::testing::RecordingNavigator;
    use std::time::Duration;
    use tokio::io::BufReader;

    fn session(source: FakeSource) -> Session<FakeSource, RecordingNavigator> {
        Session::new(
            App::new(5, Language::Eng),
            Arc::new(source),
            RecordingNavigator::default(),
        )
    }

    async fn start(session: &mut Session<FakeSource, RecordingNavigator>) {
        let first = session.app.request_current_page();
        session.dispatch(first);
        assert_eq!(session.settle().await, Some(Applied::Updated));
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!("n".parse(), Ok(Command::Next));
        assert_eq!(" PREV ".parse(), Ok(Command::Previous));
        assert_eq!("g 3".parse(), Ok(Command::Goto(3)));
        assert_eq!("ESP".parse(), Ok(Command::Language(Language::Esp)));
        assert_eq!("o 2".parse(), Ok(Command::Open(2, CardPart::Title)));
        assert_eq!("open 1 image".parse(), Ok(Command::Open(1, CardPart::Image)));
        assert_eq!("refresh".parse(), Ok(Command::Refresh));
        assert_eq!("q".parse(), Ok(Command::Quit));
    }

    #[test]
    fn test_parse_command_errors() {
        assert!("g".parse::<Command>().is_err());
        assert!("g -1".parse::<Command>().is_err());
        assert!("o two".parse::<Command>().is_err());
        assert!("o 1 footer".parse::<Command>().is_err());
        assert!("dance".parse::<Command>().is_err());
    }

    #[tokio::test]
    async fn test_next_requests_following_page() {
        let source = FakeSource::new()
            .reply(0, Reply::Page(page(&["A"], 3)))
            .reply(1, Reply::Page(page(&["B"], 3)));
        let mut session = session(source);
        start(&mut session).await;

        assert_eq!(session.handle(Command::Next), Flow::Redraw);
        assert_eq!(session.settle().await, Some(Applied::Updated));

        assert_eq!(session.source.requests(), vec![(0, 5), (1, 5)]);
        let text = session.render(today());
        assert!(text.contains("Page 2 of 3"));
        assert!(text.contains("B"));
    }

    #[tokio::test]
    async fn test_previous_on_first_page_does_nothing() {
        let source = FakeSource::new().reply(0, Reply::Page(page(&["A"], 3)));
        let mut session = session(source);
        start(&mut session).await;

        assert_eq!(session.handle(Command::Previous), Flow::Idle);
        assert_eq!(session.handle(Command::Goto(0)), Flow::Idle);
        assert_eq!(session.handle(Command::Goto(4)), Flow::Idle);
        assert_eq!(session.app.state().current_page, 1);
        assert_eq!(session.source.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_superseded_fetch_is_cancelled() {
        let source = FakeSource::new()
            .reply(0, Reply::Page(page(&["A"], 3)))
            .reply(1, Reply::Hang)
            .reply(2, Reply::Page(page(&["C"], 3)));
        let mut session = session(source);
        start(&mut session).await;

        assert_eq!(session.handle(Command::Next), Flow::Redraw);
        assert_eq!(session.handle(Command::Goto(3)), Flow::Redraw);
        assert_eq!(session.settle().await, Some(Applied::Updated));

        let state = session.app.state();
        assert_eq!(state.current_page, 3);
        assert_eq!(state.articles[0].title.as_deref(), Some("C"));
        assert!(session.outcomes_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failed_page_clears_cards() {
        let source = FakeSource::new().reply(0, Reply::Page(page(&["A"], 2)));
        let mut session = session(source);
        start(&mut session).await;

        session.handle(Command::Next);
        assert_eq!(session.settle().await, Some(Applied::Cleared));

        let state = session.app.state();
        assert!(state.articles.is_empty());
        assert_eq!(state.total_pages, 2);
        assert_eq!(state.current_page, 2);
    }

    #[tokio::test]
    async fn test_language_command_flips_flag() {
        let mut session = session(FakeSource::new());

        assert_eq!(session.handle(Command::Language(Language::Esp)), Flow::Redraw);
        assert_eq!(session.app.state().language, Language::Esp);
        assert!(session.render(today()).contains("ENG | [ESP]"));
    }

    #[tokio::test]
    async fn test_open_card_uses_displayed_keys() {
        let source = FakeSource::new().reply(
            0,
            Reply::Page(PageResponse {
                content: vec![
                    crate::models::Article {
                        link: Some("https://example.com/one".to_string()),
                        ..Default::default()
                    },
                    crate::models::Article::default(),
                ],
                total_pages: 1,
            }),
        );
        let mut session = session(source);
        start(&mut session).await;
        session.render(today());

        assert_eq!(
            session.handle(Command::Open(1, CardPart::Title)),
            Flow::Say("Opening https://example.com/one".to_string())
        );
        assert_eq!(
            session.handle(Command::Open(2, CardPart::Image)),
            Flow::Say(format!("Opening {PLACEHOLDER_TARGET}"))
        );
        assert_eq!(
            session.handle(Command::Open(3, CardPart::Description)),
            Flow::Say("No card 3 on this page".to_string())
        );
        assert_eq!(
            session.handle(Command::Open(0, CardPart::Title)),
            Flow::Say("No card 0 on this page".to_string())
        );
        assert_eq!(
            session.navigator.opened(),
            vec!["https://example.com/one", PLACEHOLDER_TARGET]
        );
    }

    #[tokio::test]
    async fn test_run_shows_fetched_pages_in_order() {
        let source = FakeSource::new()
            .reply(0, Reply::Page(page(&["Alpha"], 3)))
            .reply(1, Reply::Page(page(&["Bravo"], 3)));
        let session = session(source);
        let mut output = Vec::new();
        let (mut keys, input) = tokio::io::duplex(64);

        let typing = async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            keys.write_all(b"n\n").await.unwrap();
            tokio::time::sleep(Duration::from_millis(50)).await;
            keys.write_all(b"q\n").await.unwrap();
        };
        let (result, ()) = tokio::join!(session.run(BufReader::new(input), &mut output), typing);
        result.unwrap();

        let text = String::from_utf8(output).unwrap();
        let alpha = text.find("Alpha").expect("first page card drawn");
        let first = text.find("Page 1 of 3").expect("first page indicator drawn");
        let second = text.find("Page 2 of 3").expect("second page indicator drawn");
        let bravo = text.rfind("Bravo").expect("second page card drawn");
        assert!(alpha < second);
        assert!(first < second);
        assert!(second < bravo);
    }

    #[tokio::test]
    async fn test_run_survives_invalid_utf8_input() {
        let session = session(FakeSource::new().reply(0, Reply::Page(page(&["A"], 1))));
        let mut output = Vec::new();

        session
            .run(&b"\xff\xfe\nh\nq\n"[..], &mut output)
            .await
            .unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("unknown command"));
        assert!(text.contains("Commands:"));
    }
}
