// Native binary for JustStock Admin - Terminal UI mode

use anyhow::{anyhow, Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    fs::OpenOptions,
    io,
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use juststock_admin::{
    api::{AdminApi, HttpAdminApi},
    app::{App, CopyField, Field, Screen, Tab},
    config::{load, Config, Headless},
    controllers::withdrawals::NoteField,
    normalize::WithdrawalStatus,
    runtime,
    session::AdminSession,
    storage::SqliteStore,
    types::{AppEvent, Command, Outcome, Request},
    ui,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (safe to ignore if not found)
    let _ = dotenvy::dotenv();

    let cfg = load().context("Failed to load configuration")?;
    init_logging(&cfg)?;
    log::info!("[main] starting against {}", cfg.api_base_url);

    let store = SqliteStore::open(&cfg.state_db)?;
    let api = Arc::new(HttpAdminApi::new(&cfg.api_base_url, cfg.request_timeout)?);

    if let Some(action) = cfg.headless.clone() {
        return run_headless(api.as_ref(), &store, &cfg, action).await;
    }

    // terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // app + channels
    let (tx, rx) = unbounded_channel::<AppEvent>();
    let mut app = App::new(&cfg, Box::new(store));

    // main loop
    let result = run_loop(&mut app, &mut terminal, rx, tx, api, cfg.out_dir.clone()).await;

    // cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

/// The terminal belongs to the UI, so logs go to a file.
fn init_logging(cfg: &Config) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cfg.log_file)
        .with_context(|| format!("opening log file {}", cfg.log_file))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

async fn run_headless(api: &dyn AdminApi, store: &SqliteStore, cfg: &Config, action: Headless) -> Result<()> {
    let session = AdminSession::load(store)?.ok_or_else(|| anyhow!("No stored session. Sign in with the console first."))?;
    let request = match action {
        Headless::Export(export) => Request::ExportCsv { export, params: Vec::new() },
        Headless::UploadImage(path) => Request::UploadImage { path },
    };
    let cmd = Command { seq: 0, token: Some(session.token), request };

    let AppEvent::Response { result, .. } = runtime::execute(api, cmd, &cfg.out_dir).await else {
        return Ok(());
    };
    match result? {
        Outcome::Saved { path, bytes } => println!("Saved {} ({bytes} bytes)", path.display()),
        Outcome::Json(value) => println!("{}", serde_json::to_string_pretty(&value)?),
    }
    Ok(())
}

async fn run_loop(
    app: &mut App,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut rx: UnboundedReceiver<AppEvent>,
    tx: UnboundedSender<AppEvent>,
    api: Arc<HttpAdminApi>,
    out_dir: PathBuf,
) -> Result<()> {
    let mut last_frame = Instant::now();

    loop {
        // frame budget (coalesced renders)
        let frame_ms = 1000u32.saturating_div(app.fps()) as u64;
        let budget = Duration::from_millis(frame_ms.max(1));
        let wait = budget.saturating_sub(last_frame.elapsed());

        if event::poll(wait)? {
            if let Event::Key(k) = event::read()? {
                if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat {
                    handle_key(app, k);
                }
            }
        }
        while let Ok(ev) = rx.try_recv() {
            app.on_event(ev);
        }
        app.tick(Instant::now());

        for cmd in app.take_commands() {
            let api = api.clone();
            let tx = tx.clone();
            let out_dir = out_dir.clone();
            tokio::spawn(async move {
                let ev = runtime::execute(api.as_ref(), cmd, &out_dir).await;
                let _ = tx.send(ev);
            });
        }

        if last_frame.elapsed() >= budget {
            terminal.draw(|f| ui::draw(f, app))?;
            last_frame = Instant::now();
        }
        if app.quit_flag() {
            break;
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, k: KeyEvent) {
    if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (k.code, k.modifiers) {
        app.quit();
        return;
    }

    if app.screen() != Screen::Dashboard {
        handle_auth_key(app, k);
        return;
    }

    // Text input mode
    if app.editing().is_some() {
        match k.code {
            KeyCode::Char(c) => app.input_char(c),
            KeyCode::Backspace => app.input_backspace(),
            KeyCode::Enter => app.commit_input(),
            KeyCode::Esc => app.cancel_input(),
            _ => {}
        }
        return;
    }

    match (k.code, k.modifiers) {
        (KeyCode::Char('q'), _) => app.quit(),
        (KeyCode::Char('d'), KeyModifiers::CONTROL) => app.toggle_debug_panel(),

        (KeyCode::Tab, _) => app.next_tab(),
        (KeyCode::BackTab, _) => app.prev_tab(),

        (KeyCode::Up, _) => app.up(),
        (KeyCode::Down, _) => app.down(),
        (KeyCode::Left, _) => app.left(),
        (KeyCode::Right, _) => app.right(),
        (KeyCode::Enter, _) => app.enter(),

        (KeyCode::Char('r'), _) => app.refresh(),
        (KeyCode::Char('L'), _) => app.logout(),
        (KeyCode::Char('E'), _) => app.export_current(),
        (KeyCode::Char('/'), _) => app.start_search(),
        (KeyCode::Char(c @ '1'..='5'), _) => {
            let idx = c as usize - '1' as usize;
            app.select_tab(Tab::ALL[idx]);
        }

        (code, _) => handle_tab_key(app, code),
    }
}

fn handle_tab_key(app: &mut App, code: KeyCode) {
    match (app.tab(), code) {
        (Tab::Users, KeyCode::Char('s')) => app.cycle_page_size(),

        (Tab::Referrals, KeyCode::Char('n')) => app.toggle_non_paid(),
        (Tab::Referrals, KeyCode::Char(' ')) => app.enter(),

        (Tab::Withdrawals, KeyCode::Char('f')) => app.cycle_withdrawal_filter(),
        (Tab::Withdrawals, KeyCode::Char('p')) => app.mark_selected(WithdrawalStatus::Paid),
        (Tab::Withdrawals, KeyCode::Char('x')) => app.mark_selected(WithdrawalStatus::Cancelled),
        (Tab::Withdrawals, KeyCode::Char('e')) => app.start_edit(Field::Note(NoteField::PaymentRef)),
        (Tab::Withdrawals, KeyCode::Char('o')) => app.start_edit(Field::Note(NoteField::AdminNote)),
        (Tab::Withdrawals, KeyCode::Char('a')) => app.copy_selected(CopyField::AccountNumber),
        (Tab::Withdrawals, KeyCode::Char('i')) => app.copy_selected(CopyField::Ifsc),
        (Tab::Withdrawals, KeyCode::Char('u')) => app.copy_selected(CopyField::Upi),

        (Tab::Messages, KeyCode::Char('c')) => app.cycle_message_category(),
        (Tab::Messages, KeyCode::Char('t')) => app.toggle_message_type(),
        (Tab::Messages, KeyCode::Char('s')) => app.send_message(),

        _ => {}
    }
}

fn handle_auth_key(app: &mut App, k: KeyEvent) {
    match (k.code, k.modifiers) {
        (KeyCode::Esc, _) => app.quit(),
        (KeyCode::Char('s'), KeyModifiers::CONTROL) => app.switch_auth_screen(),
        (KeyCode::Tab, _) | (KeyCode::Down, _) => app.auth_next_field(),
        (KeyCode::BackTab, _) | (KeyCode::Up, _) => app.auth_prev_field(),
        (KeyCode::Enter, _) => app.submit_auth(),
        (KeyCode::Backspace, _) => app.input_backspace(),
        (KeyCode::Char(c), _) => app.input_char(c),
        _ => {}
    }
}
