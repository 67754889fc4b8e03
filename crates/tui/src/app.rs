use std::{io, thread, time::Duration};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use gamedex_core::{CatalogSource, CatalogStore, Game, ListParams};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::{spawn, sync::mpsc};
use tracing::{error, info};

const TICK_RATE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
struct Theme {
    accent: Color,
    muted: Color,
    selection_bg: Color,
    selection_fg: Color,
    danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Cyan,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            selection_fg: Color::White,
            danger: Color::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Browse,
    Detail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Browse,
    Search,
}

enum AppEvent {
    Input(Event),
    Tick,
    CatalogLoaded,
    GameLoaded,
}

/// Terminal frontend binding user input to the catalog store.
///
/// Holds no derived state of its own: every draw re-reads the store's
/// views, and input handlers merely forward to store operations (plus
/// the scroll-to-top side effect on page changes).
pub struct GamedexApp<S> {
    store: CatalogStore<S>,
    screen: Screen,
    mode: Mode,
    search_input: String,
    cursor: usize,
    status: String,
    should_quit: bool,
    pending_fetch: bool,
    event_tx: Option<mpsc::Sender<AppEvent>>,
    theme: Theme,
}

impl<S: CatalogSource + 'static> GamedexApp<S> {
    pub fn new(store: CatalogStore<S>) -> Self {
        Self {
            store,
            screen: Screen::Browse,
            mode: Mode::Browse,
            search_input: String::new(),
            cursor: 0,
            status: String::new(),
            should_quit: false,
            pending_fetch: false,
            event_tx: None,
            theme: Theme::default(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        self.activate().await;

        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx.clone());
        self.event_tx = Some(event_tx);

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.should_quit {
                break;
            }

            let maybe_event = event_rx.recv().await;
            if !self.process_app_event(maybe_event) {
                break;
            }

            if self.should_quit {
                break;
            }
        }

        restore_terminal(&mut terminal)?;
        self.event_tx = None;
        Ok(())
    }

    /// Populate the catalog on first activation. Each fetch runs only
    /// when its slice of state is still empty, and the two awaits are
    /// strictly sequential: full catalog first, featured subset second.
    async fn activate(&mut self) {
        if self.store.all_games().is_empty() {
            self.store.load_games(ListParams::default()).await;
        }
        if self.store.featured_games().is_empty() {
            self.store.load_featured_games().await;
        }

        self.status = match self.store.error_message() {
            Some(message) => format!("Load failed: {message}"),
            None => format!("Loaded {} games", self.store.all_games().len()),
        };
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(event)) => {
                if let Err(err) = self.handle_input(event) {
                    self.status = format!("Error: {err}");
                }
                true
            }
            Some(AppEvent::Tick) => true,
            Some(AppEvent::CatalogLoaded) => {
                self.pending_fetch = false;
                self.status = match self.store.error_message() {
                    Some(message) => format!("Refresh failed: {message}"),
                    None => format!("Loaded {} games", self.store.all_games().len()),
                };
                self.clamp_cursor();
                true
            }
            Some(AppEvent::GameLoaded) => {
                self.pending_fetch = false;
                match self.store.current_game() {
                    Some(game) => {
                        self.screen = Screen::Detail;
                        self.status = game.name;
                    }
                    None => {
                        self.status = match self.store.error_message() {
                            Some(message) => format!("Detail load failed: {message}"),
                            None => "Game not found".to_string(),
                        };
                    }
                }
                true
            }
            None => false,
        }
    }

    fn handle_input(&mut self, event: Event) -> Result<()> {
        if let Event::Key(key) = event {
            match self.screen {
                Screen::Browse => match self.mode {
                    Mode::Search => self.handle_search_key(key),
                    Mode::Browse => self.handle_browse_key(key),
                },
                Screen::Detail => self.handle_detail_key(key),
            }
        }
        Ok(())
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Browse;
                self.status = "Search cancelled".to_string();
            }
            KeyCode::Enter => self.submit_search(),
            KeyCode::Backspace => {
                self.search_input.pop();
            }
            KeyCode::Char(c) => {
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                    self.search_input.push(c);
                }
            }
            _ => {}
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') if key.modifiers.is_empty() => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.move_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_cursor(-1),
            KeyCode::Char('h') | KeyCode::Left | KeyCode::PageUp => self.prev_page(),
            KeyCode::Char('l') | KeyCode::Right | KeyCode::PageDown => self.next_page(),
            KeyCode::Char('g') if key.modifiers.is_empty() => self.change_page(1),
            KeyCode::Char('G') => self.change_page(self.store.total_pages()),
            KeyCode::Char('/') => {
                self.mode = Mode::Search;
                self.search_input = self.store.search_query();
                self.status = "Enter search text".to_string();
            }
            KeyCode::Esc => {
                if !self.store.search_query().is_empty() {
                    self.search_input.clear();
                    self.store.set_search_query("");
                    self.scroll_to_top();
                    self.status = "Search cleared".to_string();
                }
            }
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.refresh_catalog();
            }
            KeyCode::Enter => self.open_detail(),
            _ => {}
        }
    }

    fn handle_detail_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('q') => self.close_detail(),
            _ => {}
        }
    }

    /// Forward the search box contents to the store. The store resets
    /// pagination to the first page; the list scroll follows.
    fn submit_search(&mut self) {
        self.mode = Mode::Browse;
        let query = self.search_input.trim().to_string();
        self.store.set_search_query(query.clone());
        self.scroll_to_top();
        self.status = if query.is_empty() {
            "Search cleared".to_string()
        } else {
            format!("Search: {query}")
        };
    }

    /// Forward a page change to the store and scroll back to the top of
    /// the list. The store accepts any page; navigability is decided
    /// here, so the target is clamped to the known page range.
    fn change_page(&mut self, target: usize) {
        let total = self.store.total_pages().max(1);
        let target = target.clamp(1, total);
        if target == self.store.current_page() {
            self.status = format!("Already on page {target}");
            return;
        }
        self.store.set_page(target);
        self.scroll_to_top();
        self.status = format!("Page {target} of {total}");
    }

    fn next_page(&mut self) {
        self.change_page(self.store.current_page().saturating_add(1));
    }

    fn prev_page(&mut self) {
        self.change_page(self.store.current_page().saturating_sub(1));
    }

    fn scroll_to_top(&mut self) {
        self.cursor = 0;
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.store.paged_games().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let last = len as isize - 1;
        self.cursor = (self.cursor as isize + delta).clamp(0, last) as usize;
    }

    fn clamp_cursor(&mut self) {
        let len = self.store.paged_games().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    fn selected_game(&self) -> Option<Game> {
        self.store.paged_games().get(self.cursor).cloned()
    }

    fn refresh_catalog(&mut self) {
        if self.pending_fetch {
            self.status = "A fetch is already in flight".to_string();
            return;
        }
        let Some(sender) = self.event_tx.clone() else {
            return;
        };
        self.pending_fetch = true;
        self.status = "Refreshing catalog…".to_string();
        info!("catalog refresh requested");
        let store = self.store.clone();
        spawn(async move {
            store.load_games(ListParams::default()).await;
            store.load_featured_games().await;
            let _ = sender.send(AppEvent::CatalogLoaded).await;
        });
    }

    fn open_detail(&mut self) {
        if self.pending_fetch {
            self.status = "A fetch is already in flight".to_string();
            return;
        }
        let Some(game) = self.selected_game() else {
            self.status = "No game selected".to_string();
            return;
        };
        let Some(sender) = self.event_tx.clone() else {
            error!("event channel unavailable");
            return;
        };
        self.pending_fetch = true;
        info!(game_id = game.id, name = %game.name, "loading game detail");
        self.status = format!("Loading {}…", game.name);
        let store = self.store.clone();
        spawn(async move {
            store.load_game_by_id(game.id).await;
            let _ = sender.send(AppEvent::GameLoaded).await;
        });
    }

    /// Leave the detail view, emptying the detail slot on the way out.
    fn close_detail(&mut self) {
        self.store.clear_current_game();
        self.screen = Screen::Browse;
        self.status = "Returned to catalog".to_string();
    }

    fn draw(&mut self, frame: &mut Frame) {
        match self.screen {
            Screen::Browse => self.draw_browse(frame),
            Screen::Detail => self.draw_detail(frame),
        }
    }

    fn draw_browse(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(4),
                Constraint::Length(3),
            ])
            .split(frame.size());

        let title = Paragraph::new(Line::from(vec![
            Span::styled(
                "GAMEDEX",
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                format!("{} games in catalog", self.store.all_games().len()),
                Style::default().fg(self.theme.muted),
            ),
        ]))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(title, chunks[0]);

        let featured = self.store.featured_games();
        let mut spans = vec![Span::styled(
            "Featured: ",
            Style::default().fg(self.theme.muted),
        )];
        if featured.is_empty() {
            spans.push(Span::raw("none yet"));
        } else {
            for (idx, game) in featured.iter().enumerate() {
                if idx > 0 {
                    spans.push(Span::styled(" • ", Style::default().fg(self.theme.muted)));
                }
                spans.push(Span::raw(game.name.clone()));
            }
        }
        let featured_line = Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        frame.render_widget(featured_line, chunks[1]);

        let paged = self.store.paged_games();
        let items: Vec<ListItem> = paged
            .iter()
            .map(|game| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        game.name.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("  {}", game.slug),
                        Style::default().fg(self.theme.muted),
                    ),
                ]))
            })
            .collect();

        let query = self.store.search_query();
        let list_title = if query.is_empty() {
            format!(
                " Games · page {}/{} ",
                self.store.current_page(),
                self.store.total_pages().max(1)
            )
        } else {
            format!(
                " Games matching \"{}\" · page {}/{} ",
                query,
                self.store.current_page(),
                self.store.total_pages().max(1)
            )
        };

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(list_title))
            .highlight_style(
                Style::default()
                    .bg(self.theme.selection_bg)
                    .fg(self.theme.selection_fg)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("» ");

        let mut list_state = ListState::default();
        if !paged.is_empty() {
            list_state.select(Some(self.cursor.min(paged.len() - 1)));
        }
        frame.render_stateful_widget(list, chunks[2], &mut list_state);

        frame.render_widget(self.footer(), chunks[3]);
    }

    fn draw_detail(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(4), Constraint::Length(3)])
            .split(frame.size());

        let body = match self.store.current_game() {
            Some(game) => {
                let label = Style::default().fg(self.theme.muted);
                vec![
                    Line::from(Span::styled(
                        game.name.clone(),
                        Style::default()
                            .fg(self.theme.accent)
                            .add_modifier(Modifier::BOLD),
                    )),
                    Line::from(""),
                    Line::from(vec![
                        Span::styled("Category  ", label),
                        Span::raw(game.category.clone()),
                    ]),
                    Line::from(vec![
                        Span::styled("Updated   ", label),
                        Span::raw(game.created_at.format("%Y-%m-%d").to_string()),
                    ]),
                    Line::from(vec![
                        Span::styled("Website   ", label),
                        Span::raw(game.website_url.clone()),
                    ]),
                    Line::from(vec![
                        Span::styled("Status    ", label),
                        Span::raw(format!("{} / api {}", game.status, game.api_status)),
                    ]),
                    Line::from(""),
                    Line::from(game.summary.clone()),
                ]
            }
            None => vec![Line::from("No game loaded.")],
        };

        let detail = Paragraph::new(body)
            .block(Block::default().borders(Borders::ALL).title(" Game "))
            .wrap(Wrap { trim: false });
        frame.render_widget(detail, chunks[0]);

        frame.render_widget(self.footer(), chunks[1]);
    }

    fn footer(&self) -> Paragraph<'static> {
        let mut spans = Vec::new();
        if self.mode == Mode::Search {
            spans.push(Span::styled(
                format!("Search: {}▏", self.search_input),
                Style::default().fg(self.theme.accent),
            ));
        } else if let Some(message) = self.store.error_message() {
            spans.push(Span::styled(
                message,
                Style::default().fg(self.theme.danger),
            ));
        } else {
            spans.push(Span::raw(self.status.clone()));
        }

        if self.store.is_loading() {
            spans.push(Span::styled(
                "  [loading]",
                Style::default().fg(self.theme.accent),
            ));
        }

        let hints = match self.screen {
            Screen::Browse => "  j/k move · h/l page · / search · enter detail · ^r refresh · q quit",
            Screen::Detail => "  esc back · q back",
        };
        spans.push(Span::styled(hints, Style::default().fg(self.theme.muted)));

        Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL))
    }
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        let ready = event::poll(TICK_RATE).unwrap_or(false);
        let message = if ready {
            match event::read() {
                Ok(event) => AppEvent::Input(event),
                Err(_) => break,
            }
        } else {
            AppEvent::Tick
        };
        if sender.blocking_send(message).is_err() {
            break;
        }
    });
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to restore cursor")?;
    Ok(())
}
