use std::{cmp, io, time::Duration};

use anyhow::{bail, Context, Result};
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use rental_core::{
    form::parse_bounded,
    models::DELIMITER,
    AppConfig, Accounts, Car, CarStatus, ContractDir, ContractManager, ContractName, Customer,
    DueDateBounds, FormStep, Inventory, Properties, Record, RecordStore, RentalError, RentalQuote,
    User,
};
use tracing::{debug, info, warn};

use crate::prompt::{Flow, Prompt};

const TICK_RATE: Duration = Duration::from_millis(250);

struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    selection_bg: Color,
    warning: Color,
    danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            warning: Color::Yellow,
            danger: Color::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Login,
    Menu,
    Records,
    Document,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    ListCars,
    AddCar,
    MoveCar,
    Customers,
    AddCustomer,
    NewContract,
    ActiveContracts,
    ArchiveContract,
    ArchivedContracts,
    AddUser,
    Logout,
    Quit,
}

impl MenuItem {
    const ALL: [MenuItem; 12] = [
        MenuItem::ListCars,
        MenuItem::AddCar,
        MenuItem::MoveCar,
        MenuItem::Customers,
        MenuItem::AddCustomer,
        MenuItem::NewContract,
        MenuItem::ActiveContracts,
        MenuItem::ArchiveContract,
        MenuItem::ArchivedContracts,
        MenuItem::AddUser,
        MenuItem::Logout,
        MenuItem::Quit,
    ];

    fn label(self) -> &'static str {
        match self {
            MenuItem::ListCars => "List cars",
            MenuItem::AddCar => "Add car",
            MenuItem::MoveCar => "Move car between categories",
            MenuItem::Customers => "List customers",
            MenuItem::AddCustomer => "Add customer",
            MenuItem::NewContract => "New contract",
            MenuItem::ActiveContracts => "Active contracts",
            MenuItem::ArchiveContract => "Archive contract",
            MenuItem::ArchivedContracts => "Archived contracts",
            MenuItem::AddUser => "Add user",
            MenuItem::Logout => "Log out",
            MenuItem::Quit => "Quit",
        }
    }

    fn admin_only(self) -> bool {
        matches!(
            self,
            MenuItem::AddCar | MenuItem::MoveCar | MenuItem::ArchivedContracts | MenuItem::AddUser
        )
    }

    fn visible_to(user: &User) -> Vec<MenuItem> {
        Self::ALL
            .into_iter()
            .filter(|item| user.admin || !item.admin_only())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordSource {
    Cars(CarStatus),
    Customers,
    Contracts(ContractDir),
}

struct RecordView {
    source: RecordSource,
    title: String,
    rows: Vec<String>,
    // Contract stems, parallel to `rows`; empty for other sources.
    keys: Vec<String>,
    cursor: usize,
}

impl RecordView {
    fn move_cursor(&mut self, delta: isize) {
        let last = self.rows.len().saturating_sub(1) as isize;
        self.cursor = (self.cursor as isize + delta).clamp(0, last) as usize;
    }
}

struct DocumentView {
    title: String,
    body: String,
    scroll: u16,
}

pub struct RentalApp {
    config: AppConfig,
    inventory: Inventory,
    accounts: Accounts,
    contracts: ContractManager,
    state: UiState,
    screen: Screen,
    user: Option<User>,
    prompt: Option<Prompt>,
    records: Option<RecordView>,
    document: Option<DocumentView>,
    theme: Theme,
}

impl RentalApp {
    pub fn new(config: AppConfig, store: RecordStore) -> Self {
        Self {
            config,
            inventory: Inventory::new(store.clone()),
            accounts: Accounts::new(store.clone()),
            contracts: ContractManager::new(store),
            state: UiState::default(),
            screen: Screen::Login,
            user: None,
            prompt: None,
            records: None,
            document: None,
            theme: Theme::default(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let result = self.event_loop(&mut terminal);
        restore_terminal(&mut terminal)?;
        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        self.begin_flow(Flow::Login);
        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.state.should_quit {
                break;
            }
            if event::poll(TICK_RATE).context("failed to poll terminal events")? {
                let event = event::read().context("failed to read terminal event")?;
                self.process_event(event);
            }
        }
        Ok(())
    }

    fn process_event(&mut self, event: Event) {
        let Event::Key(key) = event else {
            return;
        };
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            self.state.should_quit = true;
            return;
        }
        let result = if self.prompt.is_some() {
            self.handle_prompt_key(key)
        } else {
            self.handle_key(key)
        };
        if let Err(err) = result {
            warn!("{err:#}");
            self.state.set_status(format!("Error: {err}"));
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.screen {
            Screen::Login => {
                if key.code == KeyCode::Esc {
                    self.state.should_quit = true;
                } else {
                    self.begin_flow(Flow::Login);
                }
                Ok(())
            }
            Screen::Menu => self.handle_menu_key(key),
            Screen::Records => self.handle_records_key(key),
            Screen::Document => {
                self.handle_document_key(key);
                Ok(())
            }
        }
    }

    fn menu_items(&self) -> Vec<MenuItem> {
        self.user
            .as_ref()
            .map(MenuItem::visible_to)
            .unwrap_or_default()
    }

    fn handle_menu_key(&mut self, key: KeyEvent) -> Result<()> {
        let items = self.menu_items();
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.state.should_quit = true;
            }
            KeyCode::Char('j') | KeyCode::Down => self.state.move_menu_cursor(1, items.len()),
            KeyCode::Char('k') | KeyCode::Up => self.state.move_menu_cursor(-1, items.len()),
            KeyCode::Enter => {
                if let Some(item) = items.get(self.state.menu_cursor).copied() {
                    self.activate(item)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn activate(&mut self, item: MenuItem) -> Result<()> {
        debug!(?item, "menu selection");
        match item {
            MenuItem::ListCars => self.begin_flow(Flow::ListCars),
            MenuItem::AddCar => self.begin_flow(Flow::AddCar),
            MenuItem::MoveCar => self.begin_flow(Flow::MoveCar),
            MenuItem::AddCustomer => self.begin_flow(Flow::AddCustomer),
            MenuItem::NewContract => self.begin_flow(Flow::NewContract),
            MenuItem::ArchiveContract => self.begin_flow(Flow::ArchiveContract),
            MenuItem::AddUser => self.begin_flow(Flow::AddUser),
            MenuItem::Customers => self.show_records(RecordSource::Customers),
            MenuItem::ActiveContracts => {
                self.show_records(RecordSource::Contracts(ContractDir::Active))
            }
            MenuItem::ArchivedContracts => {
                self.show_records(RecordSource::Contracts(ContractDir::Archived))
            }
            MenuItem::Logout => {
                if let Some(user) = self.user.take() {
                    info!(username = %user.username, "user logged out");
                }
                self.screen = Screen::Login;
                self.state.set_status("Logged out".to_string());
                self.begin_flow(Flow::Login);
            }
            MenuItem::Quit => self.state.should_quit = true,
        }
        Ok(())
    }

    fn handle_records_key(&mut self, key: KeyEvent) -> Result<()> {
        let Some(view) = self.records.as_mut() else {
            self.screen = Screen::Menu;
            return Ok(());
        };
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.records = None;
                self.screen = Screen::Menu;
            }
            KeyCode::Char('j') | KeyCode::Down => view.move_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => view.move_cursor(-1),
            KeyCode::PageDown => view.move_cursor(10),
            KeyCode::PageUp => view.move_cursor(-10),
            KeyCode::Tab | KeyCode::Right => {
                if let RecordSource::Cars(status) = view.source {
                    self.show_records(RecordSource::Cars(cycle_status(status, 1)));
                }
            }
            KeyCode::BackTab | KeyCode::Left => {
                if let RecordSource::Cars(status) = view.source {
                    self.show_records(RecordSource::Cars(cycle_status(status, -1)));
                }
            }
            KeyCode::Enter => {
                if let RecordSource::Contracts(dir) = view.source {
                    if let Some(stem) = view.keys.get(view.cursor).cloned() {
                        let body = self.contracts.read_contract(dir, &stem)?;
                        self.document = Some(DocumentView {
                            title: stem,
                            body,
                            scroll: 0,
                        });
                        self.screen = Screen::Document;
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_document_key(&mut self, key: KeyEvent) {
        let Some(document) = self.document.as_mut() else {
            self.screen = Screen::Records;
            return;
        };
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.document = None;
                self.screen = Screen::Records;
            }
            KeyCode::Char('j') | KeyCode::Down => {
                document.scroll = document.scroll.saturating_add(1);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                document.scroll = document.scroll.saturating_sub(1);
            }
            _ => {}
        }
    }

    fn show_records(&mut self, source: RecordSource) {
        let (title, rows, keys): (String, Vec<String>, Vec<String>) = match source {
            RecordSource::Cars(status) => {
                let rows = self.inventory.cars(status).iter().map(car_row).collect();
                (status.label().to_string(), rows, Vec::new())
            }
            RecordSource::Customers => {
                let rows = self
                    .accounts
                    .customers()
                    .iter()
                    .map(customer_row)
                    .collect();
                ("Customers".to_string(), rows, Vec::new())
            }
            RecordSource::Contracts(dir) => {
                let stems = match dir {
                    ContractDir::Active => self.contracts.active_contracts(),
                    ContractDir::Archived => self.contracts.archived_contracts(),
                };
                let now = Local::now().naive_local();
                let rows = stems
                    .iter()
                    .map(|stem| match (dir, stem.parse::<ContractName>()) {
                        (ContractDir::Active, Ok(name)) if name.is_overdue_at(now) => {
                            format!("{stem}  [overdue]")
                        }
                        _ => stem.clone(),
                    })
                    .collect();
                let title = match dir {
                    ContractDir::Active => "Active contracts",
                    ContractDir::Archived => "Archived contracts",
                };
                (title.to_string(), rows, stems)
            }
        };
        let count = rows.len();
        self.records = Some(RecordView {
            source,
            title,
            rows,
            keys,
            cursor: 0,
        });
        self.screen = Screen::Records;
        self.state.set_status(format!("{count} records"));
    }

    fn begin_flow(&mut self, flow: Flow) {
        self.prompt = Some(Prompt::new(flow, &self.config.cancel_token));
    }

    fn cancel_flow(&mut self, flow: Flow) {
        self.prompt = None;
        if flow == Flow::Login {
            self.state.should_quit = true;
            return;
        }
        debug!(flow = flow.title(), "flow cancelled");
        self.state.set_status(format!("{} cancelled", flow.title()));
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) -> Result<()> {
        let Some(prompt) = self.prompt.as_mut() else {
            return Ok(());
        };
        match key.code {
            KeyCode::Esc => {
                let flow = prompt.flow;
                self.cancel_flow(flow);
            }
            KeyCode::Enter => {
                let value = prompt.input.take();
                return self.submit_field(value);
            }
            KeyCode::Left => prompt.input.move_cursor(-1),
            KeyCode::Right => prompt.input.move_cursor(1),
            KeyCode::Home => prompt.input.move_home(),
            KeyCode::End => prompt.input.move_end(),
            KeyCode::Backspace => prompt.input.backspace(),
            KeyCode::Delete => prompt.input.delete(),
            KeyCode::Char(ch) => {
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                    prompt.input.insert(ch);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn submit_field(&mut self, value: String) -> Result<()> {
        let Some(mut prompt) = self.prompt.take() else {
            return Ok(());
        };
        let flow = prompt.flow;
        if !prompt.form.is_cancel(&value) {
            let index = prompt.form.position();
            if let Err(err) = self.check_field(flow, index, value.trim(), prompt.form.values()) {
                prompt.error = Some(err.to_string());
                self.prompt = Some(prompt);
                return Ok(());
            }
        }
        prompt.error = None;
        match prompt.form.submit(&value) {
            FormStep::Next => {
                self.prompt = Some(prompt);
                Ok(())
            }
            FormStep::Complete(props) => self.complete_flow(flow, props),
            FormStep::Cancelled => {
                self.cancel_flow(flow);
                Ok(())
            }
        }
    }

    /// Validate one field before it is accepted; an error re-prompts the same field.
    fn check_field(&self, flow: Flow, index: usize, value: &str, previous: &[String]) -> Result<()> {
        let label = flow.labels().get(index).copied().unwrap_or("Field");
        if value.contains(DELIMITER) {
            bail!("{label} must not contain '{DELIMITER}'");
        }
        if value.is_empty() {
            bail!("{label} must not be empty");
        }
        match (flow, index) {
            (Flow::ListCars, 0) | (Flow::AddCar, 0) | (Flow::MoveCar, 0) => {
                category(value)?;
            }
            (Flow::AddCar, _) => {
                let canonical = value
                    .parse::<u32>()
                    .map(|number| number.to_string() == value)
                    .unwrap_or(false);
                if matches!(label, "Year" | "Seats" | "Cost per hour") && !canonical {
                    bail!("{label} must be a whole number without leading zeros");
                }
            }
            (Flow::MoveCar, 1) => {
                let from = category(&previous[0])?;
                self.inventory.find_car(from, value)?;
            }
            (Flow::MoveCar, 2) => {
                let to = category(value)?;
                if category(&previous[0])? == to {
                    bail!("car is already in {to}");
                }
            }
            (Flow::AddUser, 2) => {
                if value != "1" && value != "0" {
                    bail!("enter 1 for an administrator, 0 otherwise");
                }
            }
            (Flow::NewContract, 0) => {
                if value.contains('_') {
                    bail!("license plates containing '_' cannot be rented");
                }
                self.inventory.find_car(CarStatus::Available, value)?;
            }
            (Flow::NewContract, 1) => {
                let customer = self.accounts.find_customer(value)?;
                if customer.surname.contains('_') {
                    bail!("customer surname '{}' cannot be used in a contract", customer.surname);
                }
            }
            (Flow::NewContract, index) => {
                DueDateBounds::from_now(Local::now().naive_local()).check_field(
                    index - Flow::DUE_DATE_OFFSET,
                    value,
                    &previous[Flow::DUE_DATE_OFFSET..],
                )?;
            }
            (Flow::ArchiveContract, 0) => {
                self.contracts.find_active(value)?;
            }
            _ => {}
        }
        Ok(())
    }

    fn complete_flow(&mut self, flow: Flow, props: Properties) -> Result<()> {
        match flow {
            Flow::Login => return self.complete_login(&props),
            Flow::ListCars => {
                self.show_records(RecordSource::Cars(category(&props[0])?));
                return Ok(());
            }
            Flow::AddCar => {
                let status = category(&props[0])?;
                let car = Car::from_properties(&tail(&props, 1))?;
                self.inventory.add_car(&car, status)?;
                self.state
                    .set_status(format!("Added {} to {}", car.license_plate, status));
            }
            Flow::MoveCar => {
                let from = category(&props[0])?;
                let to = category(&props[2])?;
                let plate = &props[1];
                if self.inventory.move_car(from, to, plate)? {
                    self.state.set_status(format!("Moved {plate} to {to}"));
                } else {
                    self.state
                        .set_status(format!("{plate} is no longer in {from}, nothing moved"));
                }
            }
            Flow::AddCustomer => {
                let customer = Customer::from_properties(&props)?;
                self.accounts.add_customer(&customer)?;
                self.state
                    .set_status(format!("Added customer {}", customer.full_name()));
            }
            Flow::AddUser => {
                let user = User::from_properties(&props)?;
                self.accounts.add_user(&user)?;
                self.state.set_status(format!("Added user {}", user.username));
            }
            Flow::NewContract => self.complete_contract(&props)?,
            Flow::ArchiveContract => {
                let receipt = self.contracts.archive_contract(&props[0])?;
                let plate = receipt.name.license_plate();
                let message = if receipt.car_returned {
                    format!("Archived {}, {plate} is available again", receipt.name)
                } else {
                    format!("Archived {}, but {plate} was not among rented cars", receipt.name)
                };
                self.state.set_status(message);
            }
        }
        self.refresh_overdue();
        Ok(())
    }

    fn complete_login(&mut self, props: &Properties) -> Result<()> {
        match self.accounts.authenticate(&props[0], &props[1]) {
            Ok(user) => {
                self.screen = Screen::Menu;
                self.state.menu_cursor = 0;
                self.refresh_overdue();
                let mut status = format!("Logged in as {}", user.username);
                if self.state.overdue > 0 {
                    status.push_str(&format!(
                        " • {} contract(s) overdue",
                        self.state.overdue
                    ));
                }
                self.state.set_status(status);
                self.user = Some(user);
                Ok(())
            }
            Err(RentalError::NotFound { .. } | RentalError::InvalidCredentials(_)) => {
                self.begin_flow(Flow::Login);
                if let Some(prompt) = self.prompt.as_mut() {
                    prompt.error = Some("Invalid username or password".to_string());
                }
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn complete_contract(&mut self, props: &Properties) -> Result<()> {
        let plate = &props[0];
        let customer = self.accounts.find_customer(&props[1])?;
        let now = Local::now().naive_local();
        let due = DueDateBounds::from_now(now).assemble(&tail(props, Flow::DUE_DATE_OFFSET))?;
        let car = self.inventory.find_car(CarStatus::Available, plate)?;
        let quote = RentalQuote::compute(&car, due, now);

        let name = self.contracts.open_rental_at(&customer, plate, due, now)?;
        let mut status = format!(
            "Contract {name} signed: {} h, {} Kc",
            quote.hours, quote.total_price
        );
        if due <= now {
            status.push_str(" (already overdue)");
        }
        self.state.set_status(status);
        Ok(())
    }

    fn refresh_overdue(&mut self) {
        self.state.overdue = self.contracts.check_overdue();
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.size();
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(4),
            ])
            .split(area);

        self.render_header(frame, layout[0]);
        match self.screen {
            Screen::Login => self.render_login(frame, layout[1]),
            Screen::Menu => self.render_menu(frame, layout[1]),
            Screen::Records => self.render_records(frame, layout[1]),
            Screen::Document => self.render_document(frame, layout[1]),
        }
        self.render_status(frame, layout[2]);

        if let Some(prompt) = &self.prompt {
            self.render_prompt(frame, prompt);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let who = match &self.user {
            Some(user) if user.admin => format!("{} (admin)", user.username),
            Some(user) => user.username.clone(),
            None => "not logged in".to_string(),
        };
        let line = Line::from(vec![
            Span::styled(
                "Car Rental",
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  ·  {who}"), Style::default().fg(self.theme.muted)),
        ]);
        let header = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, area);
    }

    fn render_login(&self, frame: &mut Frame, area: Rect) {
        let text = vec![
            Line::from("Please log in to continue."),
            Line::from(Span::styled(
                "Enter to log in, Esc to quit",
                Style::default().fg(self.theme.muted),
            )),
        ];
        let paragraph = Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Welcome"));
        frame.render_widget(paragraph, area);
    }

    fn render_menu(&self, frame: &mut Frame, area: Rect) {
        let items = self.menu_items();
        let menu_height = (items.len() as u16).saturating_add(2).min(area.height);
        let menu_width = 40.min(area.width.max(1));
        let menu_area = centered_rect(menu_width, menu_height, area);

        let menu_lines: Vec<Line> = items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                if idx == self.state.menu_cursor {
                    Line::from(Span::styled(
                        format!("▶ {}", item.label()),
                        Style::default()
                            .fg(self.theme.accent)
                            .add_modifier(Modifier::BOLD),
                    ))
                } else {
                    Line::from(Span::styled(
                        format!("  {}", item.label()),
                        Style::default().fg(self.theme.primary_fg),
                    ))
                }
            })
            .collect();

        let menu = Paragraph::new(menu_lines)
            .block(Block::default().borders(Borders::ALL).title("Menu"));
        frame.render_widget(menu, menu_area);
    }

    fn render_records(&self, frame: &mut Frame, area: Rect) {
        let Some(view) = &self.records else {
            return;
        };
        let mut list_state = ListState::default();
        let items: Vec<ListItem> = if view.rows.is_empty() {
            vec![ListItem::new(Span::styled(
                "No records",
                Style::default().fg(self.theme.muted),
            ))]
        } else {
            list_state.select(Some(view.cursor));
            view.rows
                .iter()
                .map(|row| {
                    let style = if row.ends_with("[overdue]") {
                        Style::default().fg(self.theme.warning)
                    } else {
                        Style::default().fg(self.theme.primary_fg)
                    };
                    ListItem::new(Span::styled(row.clone(), style))
                })
                .collect()
        };
        let hint = match view.source {
            RecordSource::Cars(_) => " (Tab: next category, Esc: back)",
            RecordSource::Contracts(_) => " (Enter: open, Esc: back)",
            RecordSource::Customers => " (Esc: back)",
        };
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("{}{hint}", view.title)),
            )
            .highlight_style(Style::default().bg(self.theme.selection_bg))
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_document(&self, frame: &mut Frame, area: Rect) {
        let Some(document) = &self.document else {
            return;
        };
        let paragraph = Paragraph::new(document.body.as_str())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("{} (Esc: back)", document.title)),
            )
            .wrap(Wrap { trim: false })
            .scroll((document.scroll, 0));
        frame.render_widget(paragraph, area);
    }

    fn render_prompt(&self, frame: &mut Frame, prompt: &Prompt) {
        let frame_area = frame.size();
        let width = cmp::max(cmp::min(64_u16, frame_area.width.saturating_sub(4)), 24_u16);
        let height = 8_u16.min(frame_area.height.saturating_sub(2)).max(5_u16);
        let area = centered_rect(width, height, frame_area);

        frame.render_widget(Clear, area);

        let label = prompt.form.current_label().unwrap_or_default();
        let instruction = format!(
            "{label} ({}/{})",
            prompt.form.position() + 1,
            prompt.form.len()
        );
        let input_line = Line::from(vec![
            Span::styled("> ", Style::default().fg(self.theme.accent)),
            Span::raw(prompt.display_value()),
        ]);
        let error_line = match &prompt.error {
            Some(error) => Line::from(Span::styled(
                error.clone(),
                Style::default().fg(self.theme.danger),
            )),
            None => Line::from(""),
        };
        let helper = Line::from(vec![
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" confirm  "),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!(" or {} cancel", self.config.cancel_token)),
        ]);

        let paragraph = Paragraph::new(vec![
            Line::from(instruction),
            input_line,
            error_line,
            Line::from(""),
            helper,
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(prompt.flow.title()),
        )
        .wrap(Wrap { trim: true });

        frame.render_widget(paragraph, area);

        let cursor_x =
            (area.x + 3 + prompt.input.cursor() as u16).min(area.x + area.width.saturating_sub(2));
        let cursor_y = area.y + 2;
        frame.set_cursor(cursor_x, cursor_y);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Status");
        let secondary = if self.user.is_none() {
            Line::from(Span::styled(
                format!("Storage: {}", self.config.storage_root.display()),
                Style::default().fg(self.theme.muted),
            ))
        } else if self.state.overdue > 0 {
            Line::from(Span::styled(
                format!("Overdue contracts: {}", self.state.overdue),
                Style::default().fg(self.theme.warning),
            ))
        } else {
            Line::from(Span::styled(
                "No overdue contracts",
                Style::default().fg(self.theme.muted),
            ))
        };
        let paragraph = Paragraph::new(vec![Line::from(self.state.status.clone()), secondary])
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

struct UiState {
    status: String,
    should_quit: bool,
    menu_cursor: usize,
    overdue: usize,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            status: "Ready".to_string(),
            should_quit: false,
            menu_cursor: 0,
            overdue: 0,
        }
    }
}

impl UiState {
    fn set_status(&mut self, message: String) {
        self.status = message;
    }

    fn move_menu_cursor(&mut self, delta: isize, options: usize) {
        let last = options.saturating_sub(1) as isize;
        self.menu_cursor = (self.menu_cursor as isize + delta).clamp(0, last) as usize;
    }
}

fn category(input: &str) -> Result<CarStatus> {
    let max = CarStatus::ALL.len() as i64;
    parse_bounded(input, 1, max)
        .and_then(|choice| CarStatus::from_choice(choice as usize))
        .with_context(|| format!("choose a category between 1 and {max}"))
}

fn cycle_status(status: CarStatus, delta: isize) -> CarStatus {
    let all = CarStatus::ALL;
    let len = all.len() as isize;
    let current = all.iter().position(|s| *s == status).unwrap_or(0) as isize;
    all[(current + delta).rem_euclid(len) as usize]
}

fn tail(props: &Properties, from: usize) -> Properties {
    props.iter().skip(from).cloned().collect()
}

fn car_row(car: &Car) -> String {
    format!(
        "{:<10} {} ({}), {}, {}, {}, {} seats, {} Kc/h",
        car.license_plate,
        car.display_name(),
        car.year,
        car.color,
        car.motorization,
        car.gearbox,
        car.seats,
        car.cost_per_hour
    )
}

fn customer_row(customer: &Customer) -> String {
    format!(
        "{:<14} {}  <{}>  {}",
        customer.phone,
        customer.full_name(),
        customer.email,
        customer.address
    )
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clerks_do_not_see_admin_items() {
        let clerk = User {
            username: "anna".to_string(),
            password: "pw".to_string(),
            admin: false,
        };
        let admin = User {
            admin: true,
            ..clerk.clone()
        };
        let clerk_items = MenuItem::visible_to(&clerk);
        assert!(!clerk_items.contains(&MenuItem::AddCar));
        assert!(!clerk_items.contains(&MenuItem::ArchivedContracts));
        assert!(clerk_items.contains(&MenuItem::NewContract));
        assert_eq!(MenuItem::visible_to(&admin).len(), MenuItem::ALL.len());
    }

    #[test]
    fn category_choice_is_bounded() {
        assert_eq!(category("1").ok(), Some(CarStatus::Available));
        assert_eq!(category("4").ok(), Some(CarStatus::PermanentlyUnavailable));
        assert!(category("0").is_err());
        assert!(category("5").is_err());
        assert!(category("two").is_err());
    }

    #[test]
    fn category_cycle_wraps() {
        assert_eq!(
            cycle_status(CarStatus::PermanentlyUnavailable, 1),
            CarStatus::Available
        );
        assert_eq!(
            cycle_status(CarStatus::Available, -1),
            CarStatus::PermanentlyUnavailable
        );
    }
}
