use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io::{self, Stdout};
use textwrap::fill;

use crate::models::{Grouping, Movie, SimilarMovie, SimilarMovies};

const ENTRY_HEIGHT: usize = 3;

/// What the popup is showing. Exactly one surface is visible per state:
/// Loading on open, Content once both fetches succeed, Error otherwise.
#[derive(Debug, Clone)]
pub enum PopupState {
    Loading {
        page_url: String,
        progress: u16,
        stage: String,
    },
    Content {
        movie: Movie,
        similar: SimilarMovies,
        grouping: Grouping,
        selected: usize,
    },
    Error,
}

#[derive(Debug)]
pub enum UserAction {
    Quit,
    SelectPrev,
    SelectNext,
    OpenSelected,
    ShowGrouping(Grouping),
}

/// Seam between the popup logic and the terminal. The popup drives this
/// with its current state; implementations decide how the surfaces look.
pub trait Surface {
    fn render(&mut self, state: &PopupState) -> Result<()>;
    fn next_action(&mut self, state: &PopupState) -> Result<UserAction>;
    fn cleanup(&mut self) -> Result<()>;
}

pub struct Ui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Ui {
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self { terminal })
    }

    fn render_loading(f: &mut Frame, page_url: &str, progress: u16, stage: &str) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(2)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(4),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(f.size());

        f.render_widget(
            Paragraph::new("🍿 Finding similar movies...")
                .style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )
                .block(Block::default().borders(Borders::ALL).title("Reelkin")),
            chunks[0],
        );

        f.render_widget(
            Paragraph::new(fill(page_url, chunks[1].width.saturating_sub(4) as usize))
                .style(Style::default().fg(Color::Blue))
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title("Page")),
            chunks[1],
        );

        f.render_widget(
            Gauge::default()
                .block(Block::default().borders(Borders::ALL).title("Progress"))
                .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black))
                .percent(progress)
                .label(format!("{}%", progress))
                .use_unicode(true),
            chunks[2],
        );

        f.render_widget(
            Paragraph::new(stage.to_string())
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default().borders(Borders::ALL).title("Status")),
            chunks[3],
        );
    }

    fn render_content(
        f: &mut Frame,
        movie: &Movie,
        similar: &SimilarMovies,
        grouping: Grouping,
        selected: usize,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Min(8),
                Constraint::Length(3),
            ])
            .split(f.size());

        Self::render_base_movie(f, chunks[0], movie);
        Self::render_similar_list(f, chunks[1], similar.grouping(grouping), grouping, selected);
        Self::render_help(f, chunks[2]);
    }

    fn render_base_movie(f: &mut Frame, area: Rect, movie: &Movie) {
        let mut title_line = vec![Span::styled(
            movie.title.clone(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )];
        if !movie.year.is_empty() {
            title_line.push(Span::styled(
                format!(" ({})", movie.year),
                Style::default().fg(Color::Gray),
            ));
        }

        let mut detail_line = Vec::new();
        if let Some(rating) = movie.rating {
            detail_line.push(Span::styled("⭐ ", Style::default().fg(Color::Yellow)));
            detail_line.push(Span::styled(
                format!("{}/10", rating),
                Style::default().fg(Color::Yellow),
            ));
        }
        if !movie.genres.is_empty() {
            if !detail_line.is_empty() {
                detail_line.push(Span::raw("  "));
            }
            detail_line.push(Span::styled(
                movie.genres.join(", "),
                Style::default().fg(Color::Green),
            ));
        }
        if !movie.runtime.is_empty() {
            detail_line.push(Span::styled(
                format!("  {} min", movie.runtime),
                Style::default().fg(Color::Gray),
            ));
        }

        let mut people_line = Vec::new();
        if !movie.director_names.is_empty() {
            people_line.push(Span::styled(
                format!("🎥 {}", movie.director_names.join(", ")),
                Style::default().fg(Color::Gray),
            ));
        }
        if !movie.writer_names.is_empty() {
            if !people_line.is_empty() {
                people_line.push(Span::raw("  "));
            }
            people_line.push(Span::styled(
                format!("✍ {}", movie.writer_names.join(", ")),
                Style::default().fg(Color::Gray),
            ));
        }

        let mut lines = vec![Line::from(title_line), Line::from(detail_line)];
        if !people_line.is_empty() {
            lines.push(Line::from(people_line));
        }

        f.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title("🎬 You're Watching")),
            area,
        );
    }

    fn render_similar_list(
        f: &mut Frame,
        area: Rect,
        movies: &[SimilarMovie],
        grouping: Grouping,
        selected: usize,
    ) {
        let title = format!("🍿 Similar Movies — {} ({})", grouping.label(), movies.len());

        if movies.is_empty() {
            f.render_widget(
                Paragraph::new("Nothing in this view — try another grouping")
                    .style(Style::default().fg(Color::Gray))
                    .block(Block::default().borders(Borders::ALL).title(title)),
                area,
            );
            return;
        }

        // Window the list so the selection stays visible.
        let visible = (area.height.saturating_sub(2) as usize / ENTRY_HEIGHT).max(1);
        let start = if selected >= visible {
            selected + 1 - visible
        } else {
            0
        };
        let end = (start + visible).min(movies.len());

        let items: Vec<ListItem> = movies[start..end]
            .iter()
            .enumerate()
            .map(|(i, movie)| {
                let absolute_index = start + i;
                let title_style = if absolute_index == selected {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD)
                };

                let lines = vec![
                    Line::from(Span::styled(
                        format!("{}. {}", absolute_index + 1, movie.title),
                        title_style,
                    )),
                    Line::from(vec![
                        Span::styled("   ⭐ ", Style::default().fg(Color::Yellow)),
                        Span::styled(
                            format!("{}/10", movie.rating),
                            Style::default().fg(Color::Yellow),
                        ),
                        Span::styled(
                            format!("  {}", movie.imdb_url()),
                            Style::default().fg(Color::Blue),
                        ),
                    ]),
                    Line::from(Span::styled(
                        format!("   🖼  {}", movie.poster),
                        Style::default().fg(Color::DarkGray),
                    )),
                ];

                ListItem::new(Text::from(lines))
            })
            .collect();

        f.render_widget(
            List::new(items).block(Block::default().borders(Borders::ALL).title(title)),
            area,
        );
    }

    fn render_help(f: &mut Frame, area: Rect) {
        let key = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let help = Line::from(vec![
            Span::styled("↑↓", key),
            Span::raw(" Select  "),
            Span::styled("Enter", key),
            Span::raw(" Open in Browser  "),
            Span::styled("a", key),
            Span::raw(" All  "),
            Span::styled("d", key),
            Span::raw(" Director/Writer  "),
            Span::styled("g", key),
            Span::raw(" Genre  "),
            Span::styled("q", key),
            Span::raw(" Quit"),
        ]);

        f.render_widget(
            Paragraph::new(help).block(Block::default().borders(Borders::ALL).title("⌨️ Controls")),
            area,
        );
    }

    fn render_error(f: &mut Frame) {
        let area = f.size();
        let popup_area = Rect {
            x: area.width / 8,
            y: (area.height / 2).saturating_sub(3),
            width: area.width * 3 / 4,
            height: 6,
        };

        f.render_widget(Clear, popup_area);
        f.render_widget(
            Paragraph::new(
                "😕 Couldn't find similar movies for this page.\n\nPress any key to close",
            )
            .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("❌ Error")),
            popup_area,
        );
    }
}

impl Surface for Ui {
    fn render(&mut self, state: &PopupState) -> Result<()> {
        match state {
            PopupState::Loading {
                page_url,
                progress,
                stage,
            } => {
                let (page_url, progress, stage) = (page_url.clone(), *progress, stage.clone());
                self.terminal
                    .draw(|f| Self::render_loading(f, &page_url, progress, &stage))?;
            }
            PopupState::Content {
                movie,
                similar,
                grouping,
                selected,
            } => {
                let (movie, similar, grouping, selected) =
                    (movie.clone(), similar.clone(), *grouping, *selected);
                self.terminal.draw(|f| {
                    Self::render_content(f, &movie, &similar, grouping, selected);
                })?;
            }
            PopupState::Error => {
                self.terminal.draw(|f| Self::render_error(f))?;
            }
        }
        Ok(())
    }

    fn next_action(&mut self, state: &PopupState) -> Result<UserAction> {
        loop {
            if let Event::Key(key) = event::read()? {
                match state {
                    PopupState::Error => return Ok(UserAction::Quit),
                    _ => match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => return Ok(UserAction::Quit),
                        KeyCode::Up | KeyCode::Char('k') => return Ok(UserAction::SelectPrev),
                        KeyCode::Down | KeyCode::Char('j') => return Ok(UserAction::SelectNext),
                        KeyCode::Enter | KeyCode::Char('o') => {
                            return Ok(UserAction::OpenSelected)
                        }
                        KeyCode::Char('a') => return Ok(UserAction::ShowGrouping(Grouping::All)),
                        KeyCode::Char('d') => {
                            return Ok(UserAction::ShowGrouping(Grouping::DirectorWriter))
                        }
                        KeyCode::Char('g') => {
                            return Ok(UserAction::ShowGrouping(Grouping::Genre))
                        }
                        _ => continue,
                    },
                }
            }
        }
    }

    fn cleanup(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}
