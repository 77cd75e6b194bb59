//! Movie browser TUI main loop.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures::StreamExt;
use moviefind_api::appwrite::AnalyticsStore;
use moviefind_api::tmdb::CatalogApi;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::cursor::ResultCursor;
use crate::debounce::DEFAULT_DEBOUNCE;
use crate::session::{DEFAULT_TRENDING_LIMIT, QueryEdit, Session, SessionConfig, Update};
use crate::ui;

/// Options for [`run_browser`].
#[derive(Debug, Clone, Copy)]
pub struct BrowserOptions {
    /// Quiet period before a typed query is searched.
    pub debounce: Duration,
    /// Number of trending searches shown.
    pub trending_limit: u32,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            trending_limit: DEFAULT_TRENDING_LIMIT,
        }
    }
}

impl From<BrowserOptions> for SessionConfig {
    fn from(options: BrowserOptions) -> Self {
        Self {
            debounce: options.debounce,
            trending_limit: options.trending_limit,
        }
    }
}

/// Runs the movie browser TUI until the user quits.
///
/// # Errors
///
/// Returns an error if terminal setup or event handling fails.
pub async fn run_browser<C, S>(catalog: Arc<C>, store: Arc<S>, options: BrowserOptions) -> Result<()>
where
    C: CatalogApi + Send + Sync + 'static,
    S: AnalyticsStore + Send + Sync + 'static,
{
    let mut session = Session::start(catalog, store, options.into());

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen)
        .context("failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    let result = run_event_loop(&mut terminal, &mut session).await;

    // Cleanup (always attempt even if event loop failed)
    disable_raw_mode().context("failed to disable raw mode")?;
    crossterm::execute!(io::stdout(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;

    session.shutdown().await;
    result
}

/// Main event loop.
async fn run_event_loop<C>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    session: &mut Session<C>,
) -> Result<()>
where
    C: CatalogApi + Send + Sync + 'static,
{
    let mut events = EventStream::new();
    let mut cursor = ResultCursor::default();
    let mut main_area_height: u16 = 0;

    loop {
        cursor.sync(session.state().movies.len());
        terminal
            .draw(|frame| {
                main_area_height = ui::draw(frame, session.state(), &mut cursor.table_state);
            })
            .context("failed to draw TUI")?;

        let page_size = usize::from(main_area_height.saturating_sub(4));

        tokio::select! {
            event = events.next() => {
                match event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        if handle_key(session, &mut cursor, key, page_size) {
                            return Ok(());
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => return Err(err).context("failed to read event"),
                    None => return Ok(()),
                }
            }
            update = session.tick() => {
                if update == (Update::Fetched { applied: true }) {
                    cursor.reset(session.state().movies.len());
                }
            }
        }
    }
}

/// Handles a key press. Returns `true` to exit.
fn handle_key<C>(
    session: &mut Session<C>,
    cursor: &mut ResultCursor,
    key: KeyEvent,
    page_size: usize,
) -> bool
where
    C: CatalogApi + Send + Sync + 'static,
{
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let len = session.state().movies.len();
    match key.code {
        KeyCode::Esc => return true,
        KeyCode::Char('c') if ctrl => return true,
        KeyCode::Char('u') if ctrl => session.input(QueryEdit::Clear),
        KeyCode::Char(_) if ctrl || key.modifiers.contains(KeyModifiers::ALT) => {}
        KeyCode::Char(c) => session.input(QueryEdit::Push(c)),
        KeyCode::Backspace => session.input(QueryEdit::Pop),
        KeyCode::Up => cursor.move_up(),
        KeyCode::Down => cursor.move_down(len),
        KeyCode::PageUp => cursor.page_up(page_size),
        KeyCode::PageDown => cursor.page_down(page_size, len),
        KeyCode::Enter => open_movie_page(session, cursor),
        _ => {}
    }
    false
}

/// Opens the TMDB page of the selected movie in the default browser.
fn open_movie_page<C>(session: &Session<C>, cursor: &ResultCursor)
where
    C: CatalogApi + Send + Sync + 'static,
{
    let Some(movie) = session.state().movies.get(cursor.selected()) else {
        return;
    };
    let url = movie.page_url();
    if let Err(err) = open::that(&url) {
        tracing::warn!(url = %url, "Failed to open browser: {err}");
    }
}
