//! TUI rendering logic for the movie browser.

use moviefind_api::appwrite::TrendingEntry;
use moviefind_api::tmdb::Movie;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table, TableState, Wrap};

use crate::controller::{MainSection, ViewState};

/// Key hints shown in the footer.
const HELP_TEXT: &str = "Type to search  Backspace: delete  Ctrl+U: clear  \u{2191}\u{2193}: move  PgUp/PgDn: page  Enter: open  Esc: quit";

/// Draws the browser UI. Returns the main content area height for page size calculation.
#[allow(clippy::indexing_slicing)]
pub fn draw(frame: &mut Frame, state: &ViewState, table_state: &mut TableState) -> u16 {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // search box
            Constraint::Min(5),    // main content
            Constraint::Length(3), // footer
        ])
        .split(frame.area());

    draw_search_box(frame, chunks[0], state);

    let main_area = chunks[1];
    if state.trending.is_empty() {
        draw_main(frame, main_area, state, table_state);
    } else {
        let pane_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(main_area);
        draw_main(frame, pane_chunks[0], state, table_state);
        draw_trending(frame, pane_chunks[1], &state.trending);
    }

    let footer = Paragraph::new(Line::from(HELP_TEXT)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, chunks[2]);

    main_area.height
}

/// Draws the query input.
fn draw_search_box(frame: &mut Frame, area: Rect, state: &ViewState) {
    let input = Paragraph::new(state.raw_query.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Search through thousands of movies "),
        );
    frame.render_widget(input, area);
}

/// Draws exactly one of the loading indicator, the error, or the results.
fn draw_main(frame: &mut Frame, area: Rect, state: &ViewState, table_state: &mut TableState) {
    let title = if state.debounced_query.is_empty() {
        String::from(" All Movies ")
    } else {
        format!(" Results for \"{}\" ", state.debounced_query)
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    match state.main_section() {
        MainSection::Loading => {
            let loading = Paragraph::new("Loading...")
                .style(Style::default().fg(Color::Cyan))
                .block(block);
            frame.render_widget(loading, area);
        }
        MainSection::Error(message) => {
            let error = Paragraph::new(message)
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true })
                .block(block);
            frame.render_widget(error, area);
        }
        MainSection::Results([]) => {
            frame.render_widget(Paragraph::new("No movies found.").block(block), area);
        }
        MainSection::Results(movies) => {
            draw_results(frame, area, movies, block, table_state);
        }
    }
}

/// Draws the results table.
fn draw_results(
    frame: &mut Frame,
    area: Rect,
    movies: &[Movie],
    block: Block<'_>,
    table_state: &mut TableState,
) {
    let header = Row::new(vec!["Title", "Year", "Lang", "Rating", "Poster"])
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .bottom_margin(1);

    let rows: Vec<Row> = movies
        .iter()
        .map(|m| {
            Row::new(vec![
                m.title.clone(),
                m.release_year()
                    .map_or_else(|| String::from("--"), String::from),
                m.original_language
                    .clone()
                    .unwrap_or_else(|| String::from("--")),
                m.vote_average
                    .map_or_else(|| String::from("--"), |v| format!("{v:.1}")),
                m.poster_url(),
            ])
        })
        .collect();

    let widths = [
        Constraint::Min(20),    // Title
        Constraint::Length(6),  // Year
        Constraint::Length(6),  // Lang
        Constraint::Length(7),  // Rating
        Constraint::Length(50), // Poster
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_stateful_widget(table, area, table_state);
}

/// Draws the trending searches panel (right).
fn draw_trending(frame: &mut Frame, area: Rect, trending: &[TrendingEntry]) {
    let lines: Vec<Line> = trending
        .iter()
        .zip(1_usize..)
        .map(|(entry, rank)| {
            Line::from(format!(
                "{rank}. {} ({})  {}",
                entry.query, entry.count, entry.title
            ))
        })
        .collect();

    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Trending Searches "),
    );
    frame.render_widget(panel, area);
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;

    fn movie(id: u64, title: &str) -> Movie {
        Movie {
            id,
            title: String::from(title),
            poster_path: Some(String::from("/x.jpg")),
            release_date: Some(String::from("1989-06-23")),
            original_language: Some(String::from("en")),
            vote_average: Some(7.2),
        }
    }

    /// Renders `state` and returns the screen as one string.
    fn render(state: &ViewState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 20)).unwrap();
        let mut table_state = TableState::default();
        terminal
            .draw(|frame| {
                draw(frame, state, &mut table_state);
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(ratatui::buffer::Cell::symbol)
            .collect()
    }

    #[test]
    fn test_loading_hides_results_and_error() {
        // Arrange
        let state = ViewState {
            is_loading: true,
            movies: vec![movie(1, "Batman")],
            ..ViewState::default()
        };

        // Act
        let screen = render(&state);

        // Assert
        assert!(screen.contains("Loading..."));
        assert!(!screen.contains("Batman"));
    }

    #[test]
    fn test_error_is_shown() {
        // Arrange
        let state = ViewState {
            error_message: Some(String::from("Error fetching movies: HTTP 500")),
            ..ViewState::default()
        };

        // Act
        let screen = render(&state);

        // Assert
        assert!(screen.contains("Error fetching movies: HTTP 500"));
        assert!(!screen.contains("Loading..."));
    }

    #[test]
    fn test_results_table() {
        // Arrange
        let state = ViewState {
            raw_query: String::from("bat"),
            debounced_query: String::from("bat"),
            movies: vec![movie(1, "Batman")],
            ..ViewState::default()
        };

        // Act
        let screen = render(&state);

        // Assert
        assert!(screen.contains("Results for \"bat\""));
        assert!(screen.contains("Batman"));
        assert!(screen.contains("1989"));
        assert!(screen.contains("7.2"));
        assert!(screen.contains("https://image.tmdb.org/t/p/w500/x.jpg"));
    }

    #[test]
    fn test_empty_results() {
        // Arrange
        let state = ViewState::default();

        // Act
        let screen = render(&state);

        // Assert
        assert!(screen.contains("All Movies"));
        assert!(screen.contains("No movies found."));
    }

    #[test]
    fn test_trending_only_when_non_empty() {
        // Arrange
        let mut state = ViewState::default();

        // Act
        let without = render(&state);
        state.trending = vec![TrendingEntry {
            query: String::from("dune"),
            count: 4,
            movie_id: 438_631,
            title: String::from("Dune"),
            poster_path: None,
        }];
        let with = render(&state);

        // Assert
        assert!(!without.contains("Trending Searches"));
        assert!(with.contains("Trending Searches"));
        assert!(with.contains("1. dune (4)"));
    }
}
