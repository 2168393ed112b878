use std::{path::PathBuf, sync::Arc, time::Duration};

use color_eyre::{
    Result,
    eyre::{Context, eyre},
};
use crossterm::event::{Event, EventStream, KeyCode, KeyModifiers};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Layout},
    style::Stylize,
    text::Line,
    widgets::TableState,
};
use tokio_stream::StreamExt;

use dynaform::{
    form::Form,
    posts::{Board, ClientConfig, DEFAULT_BASE_URL, HttpPostsClient, PostsApi},
};

mod env;
mod help;
mod logging;
mod subcommands;
mod util;
mod widgets;

use env::{Env, Message};
use widgets::{FormWidget, Popup, RecordsTable, Widget, theme::Theme};

#[derive(clap::Parser)]
#[command(
    name = "dynaform",
    version = "0.1.0",
    about = "Dynamic form and records table for a JSON posts resource",
    long_about = None
)]
struct Cli {
    /// Increase output verbosity (-v, -vv, etc.)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Base URL of the remote service
    #[arg(long, global = true, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Request timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Log file used while the interactive UI is running
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Print the records stored by the service
    List {
        /// Output in JSON format
        #[arg(short, long)]
        json: bool,
    },
    /// Create one record from KEY=VALUE pairs
    Create(subcommands::create::Args),
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = <Cli as clap::Parser>::parse();

    let config = ClientConfig {
        base_url: cli.base_url.clone(),
        timeout: cli.timeout_ms.map(Duration::from_millis),
    };
    let api: Arc<dyn PostsApi> =
        Arc::new(HttpPostsClient::new(&config).wrap_err("Failed to build HTTP client")?);

    match cli.command {
        Some(Commands::List { json }) => {
            logging::init(cli.verbose, logging::Target::Stderr)?;
            let options = subcommands::list::Options { json };
            subcommands::list::command(api.as_ref(), options).await
        }
        Some(Commands::Create(args)) => {
            logging::init(cli.verbose, logging::Target::Stderr)?;
            subcommands::create::command(api.as_ref(), args).await
        }
        None => {
            let log_path = cli.log_file.unwrap_or_else(logging::default_log_path);
            logging::init(cli.verbose, logging::Target::File(log_path.clone()))?;
            tracing::info!(base_url = %config.base_url, "Starting interactive session");
            App::new(api, Form::new(), Theme::detect(), log_path)
                .run_tui()
                .await
        }
    }
}

struct App {
    should_quit: bool,
    load_requested: bool,
    board: Board,
    form: FormWidget,
    table_state: TableState,
    popup: Option<Box<dyn Popup + Send>>,
    theme: Theme,
    log_path: PathBuf,
}

impl App {
    const FRAMES_PER_SECOND: f32 = 60.0;
    const SCROLL_STEP: u16 = 5;

    fn new(api: Arc<dyn PostsApi>, form: Form, theme: Theme, log_path: PathBuf) -> Self {
        Self {
            should_quit: false,
            load_requested: false,
            board: Board::new(api),
            form: FormWidget::new(form),
            table_state: TableState::default(),
            popup: None,
            theme,
            log_path,
        }
    }

    pub async fn run_tui(self) -> Result<()> {
        let terminal = ratatui::init();
        let app_result = self.run(terminal).await;
        ratatui::restore();
        app_result
    }

    pub async fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        let mut env = Env::new();
        self.start_load(&env);

        let period = Duration::from_secs_f32(1.0 / Self::FRAMES_PER_SECOND);
        let mut interval = tokio::time::interval(period);
        let mut events = EventStream::new();

        while !self.should_quit {
            tokio::select! {
                _ = interval.tick() => { terminal.draw(|frame| self.render(frame))?; },
                Some(event) = events.next() => {
                    let event = event.map_err(|err| eyre!("Failed to read terminal event: {err}"))?;
                    self.handle_event(&env, &event);
                },
                Some(msg) = env.rx().recv() => self.handle_message(&env, msg),
            }
        }
        Ok(())
    }

    /// Fetches the initial list in the background. Only the first call does.
    fn start_load(&mut self, env: &Env) {
        if self.load_requested {
            return;
        }
        self.load_requested = true;
        let api = self.board.api();
        let tx = env.sender();
        tokio::spawn(async move {
            let result = api.list().await;
            let _ = tx.send(Message::Loaded(result));
        });
    }

    fn handle_message(&mut self, env: &Env, msg: Message) {
        match msg {
            Message::Invalidate => {}
            Message::Submit(values) => {
                let api = self.board.api();
                let tx = env.sender();
                tokio::spawn(async move {
                    let result = api.create(&values).await;
                    let _ = tx.send(Message::Created { values, result });
                });
            }
            Message::Loaded(result) => self.board.apply_loaded(result),
            Message::Created { values, result } => {
                // A rejected create is logged by the board; the form clears anyway.
                self.board.apply_created(values, result);
                self.form.finish_submit();
            }
            Message::SetPopup(popup) => self.popup = Some(popup),
            Message::DismissPopup => self.popup = None,
        }
    }

    fn render(&mut self, frame: &mut Frame) {
        let help_entries = self.form.help().unwrap_or_default();
        let footer_height = help::height(help_entries, frame.area());
        let layout = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(footer_height),
        ]);
        let [title_area, body_area, footer_area] = frame.area().layout(&layout);
        let title = Line::from("Dynamic Form and Table").centered().bold();
        frame.render_widget(title, title_area);

        let columns = Layout::horizontal([Constraint::Percentage(40), Constraint::Fill(1)]);
        let [form_area, table_area] = body_area.layout(&columns);
        self.form.render(frame, form_area, &self.theme);
        frame.render_stateful_widget(
            RecordsTable::new(self.board.records().records(), &self.theme),
            table_area,
            &mut self.table_state,
        );
        help::render(help_entries, frame, footer_area, &self.theme);

        if let Some(popup) = &self.popup {
            let area = popup.rect(frame.area());
            popup.render(frame, area, &self.theme);
        }
    }

    fn handle_event(&mut self, env: &Env, event: &Event) {
        if let Some(popup) = self.popup.as_mut() {
            if popup.handle_event(env.tx(), event) {
                return;
            }
        } else if self.form.handle_event(env.tx(), event) {
            return;
        }
        let Some(key) = event.as_key_press_event() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true
            }
            KeyCode::PageDown => self.table_state.scroll_down_by(Self::SCROLL_STEP),
            KeyCode::PageUp => self.table_state.scroll_up_by(Self::SCROLL_STEP),
            KeyCode::F(1) => {
                let entries = self.form.help().unwrap_or_default();
                let footnote = format!("Logs: {}", util::abbreviate_home(&self.log_path));
                env.tx()
                    .set_popup(Box::new(help::Widget::new(entries, Some(footnote))));
            }
            _ => {}
        }
    }
}
