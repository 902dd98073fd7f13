use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use repeater_config::Config;
use repeater_engine::{
    ArrangementAdapter, BlockId, BlockListController, BlockTemplate, DragReorderAdapter,
    HttpBlockSource, LogChrome, RepeaterError,
};
use std::{
    env,
    io::{Stdout, stdout},
    path::PathBuf,
    process,
};
use tokio::runtime::Runtime;

type Controller = BlockListController<HttpBlockSource>;

struct App {
    runtime: Runtime,
    controller: Controller,
    adapter: ArrangementAdapter,
    handle_class: String,
    list_state: ListState,
    status: String,
}

impl App {
    fn new(config: Config, runtime: Runtime) -> Result<Self> {
        let template = config.load_template()?;
        let renderer = BlockTemplate::compile_with_trust(&template, config.content_trust)?;
        let source = HttpBlockSource::new(config.endpoint_url.clone())?;
        let controller =
            BlockListController::new(config.field_name.clone(), config.options, source, renderer)?
                .with_chrome(LogChrome);

        let mut app = Self {
            runtime,
            controller,
            adapter: ArrangementAdapter::new(config.handle_class.clone()),
            handle_class: config.handle_class,
            list_state: ListState::default(),
            status: String::new(),
        };

        let result = app.runtime.block_on(app.controller.populate(&config.value));
        match result {
            Ok(added) => app.status = format!("Loaded {} block(s)", added.len()),
            Err(e) => app.report(e),
        }
        app.after_change(Some(0));

        Ok(app)
    }

    /// The block ids in the order currently on screen.
    fn visual_order(&self) -> Vec<BlockId> {
        if self.adapter.carried().is_some() {
            self.adapter.read_order()
        } else {
            self.controller.container().ids()
        }
    }

    fn selected_id(&self) -> Option<BlockId> {
        let index = self.list_state.selected()?;
        self.visual_order().get(index).copied()
    }

    fn after_change(&mut self, select: Option<usize>) {
        self.adapter.sync(self.controller.container().ids());
        let len = self.controller.len();
        let selected = select.or(self.list_state.selected()).filter(|_| len > 0);
        self.list_state.select(selected.map(|i| i.min(len - 1)));
    }

    fn report(&mut self, error: RepeaterError) {
        if error.is_policy_violation() {
            self.status = error.to_string();
        } else {
            log::error!("{error}");
            self.status = format!("Error: {error}");
        }
    }

    fn next(&mut self) {
        if self.adapter.carried().is_some() {
            self.adapter.shift(1);
        }
        let len = self.controller.len();
        if len == 0 {
            return;
        }
        let i = self.list_state.selected().map_or(0, |i| (i + 1).min(len - 1));
        self.list_state.select(Some(i));
    }

    fn previous(&mut self) {
        if self.adapter.carried().is_some() {
            self.adapter.shift(-1);
        }
        let i = self.list_state.selected().map_or(0, |i| i.saturating_sub(1));
        if self.controller.len() > 0 {
            self.list_state.select(Some(i));
        }
    }

    fn add(&mut self, after_selected: bool) {
        let after = if after_selected {
            self.selected_id()
        } else {
            None
        };
        let result = self.runtime.block_on(self.controller.add(1, after));
        match result {
            Ok(ids) => {
                let first = ids
                    .first()
                    .and_then(|id| self.controller.container().index_of(*id));
                self.status = format!("Added {} block(s)", ids.len());
                self.after_change(first);
            }
            Err(e) => self.report(e),
        }
    }

    fn delete(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        match self.controller.delete(id) {
            Ok(()) => {
                self.status = "Block deleted".to_string();
                self.after_change(None);
            }
            Err(e) => self.report(e),
        }
    }

    fn toggle_drag(&mut self) {
        if let Some(dropped) = self.adapter.release() {
            let result = self.controller.handle_drop(dropped, &self.adapter);
            match result {
                Ok(()) => self.status = "Blocks reordered".to_string(),
                Err(e) => self.report(e),
            }
            self.after_change(None);
            return;
        }

        if let Some(id) = self.selected_id()
            && self.adapter.pick_up(id, &self.handle_class)
        {
            self.status = "Moving block: j/k to move, space to drop".to_string();
        }
    }

    fn detail_lines(&self) -> Vec<Line<'static>> {
        let Some(block) = self
            .selected_id()
            .and_then(|id| self.controller.container().get(id))
        else {
            return vec![Line::from("No block selected")];
        };

        let mut lines = vec![
            Line::from(Span::styled(
                format!("Block #{}", block.count_label()),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for field in block.fields() {
            let line = match (field.name(), field.diagnostic()) {
                (Some(name), _) => format!("{} -> {name}", field.pattern()),
                (None, Some(error)) => format!("{:?} !! {error}", field.pattern()),
                (None, None) => field.pattern().to_string(),
            };
            lines.push(Line::from(line));
        }
        lines.push(Line::from(""));
        lines.extend(block.markup().lines().map(|l| Line::from(l.to_string())));
        lines
    }
}

fn init_logging() -> Result<PathBuf> {
    let log_path = env::temp_dir().join("repeater-cli.log");
    let file = std::fs::File::create(&log_path)?;
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(log_path)
}

fn main() -> Result<()> {
    let log_path = init_logging()?;

    let args: Vec<String> = env::args().collect();
    let config_path = match args.len() {
        1 => Config::config_path(),
        2 => PathBuf::from(&args[1]),
        _ => {
            eprintln!("Usage: {} [config-file]", args[0]);
            process::exit(1);
        }
    };

    let config = match Config::load_from_path(&config_path) {
        Ok(Some(config)) => config,
        Ok(None) => {
            eprintln!("Error: No config file found at {}", config_path.display());
            eprintln!("Usage: {} [config-file]", args[0]);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    log::info!(
        "Editing repeater {} against {}",
        config.field_name,
        config.endpoint_url
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let mut app = match App::new(config, runtime) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    app.controller.disconnect();

    if let Err(err) = res {
        println!("{err:?}");
        println!("Log written to {}", log_path.display());
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::Char('a') => app.add(true),
                KeyCode::Char('A') => app.add(false),
                KeyCode::Char('d') => app.delete(),
                KeyCode::Char(' ') => app.toggle_drag(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1), Constraint::Length(1)].as_ref())
        .split(f.area());

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .margin(1)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)].as_ref())
        .split(rows[0]);

    let carried = app.adapter.carried();
    let items: Vec<ListItem> = app
        .visual_order()
        .into_iter()
        .filter_map(|id| app.controller.container().get(id))
        .map(|block| {
            let marker = if carried == Some(block.id()) { "↕ " } else { "  " };
            let first_name = block
                .fields()
                .iter()
                .find_map(|field| field.name())
                .unwrap_or("(no fields)");
            ListItem::new(Line::from(format!(
                "{marker}#{} {first_name}",
                block.count_label()
            )))
        })
        .collect();

    let options = app.controller.options();
    let title = match options.max {
        Some(max) => format!("{} ({}/{max})", app.controller.field_name(), app.controller.len()),
        None => format!("{} ({})", app.controller.field_name(), app.controller.len()),
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));
    f.render_stateful_widget(list, chunks[0], &mut app.list_state);

    let detail = Paragraph::new(app.detail_lines())
        .block(Block::default().borders(Borders::ALL).title("Block"))
        .wrap(Wrap { trim: false });
    f.render_widget(detail, chunks[1]);

    f.render_widget(Paragraph::new(app.status.clone()), rows[1]);

    let len = app.controller.len();
    let add_hint = if options.at_max(len) {
        "a/A: (max reached)"
    } else {
        "a: Add after | A: Add at end"
    };
    let delete_hint = if options.at_floor(len) {
        "d: (min reached)"
    } else {
        "d: Delete"
    };
    let help = Line::from(vec![
        Span::raw("q: Quit | ↑/k ↓/j: Move | "),
        Span::raw(format!("{add_hint} | {delete_hint} | ")),
        Span::raw("Space: Drag/Drop"),
    ]);
    f.render_widget(Paragraph::new(help), rows[2]);
}
