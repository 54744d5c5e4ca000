use std::io;
use std::path::PathBuf;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Gauge, Paragraph, Wrap};

use betmind_terminal::alert::{self, AlertSink, TerminalBell};
use betmind_terminal::auth::{RegisterForm, Session};
use betmind_terminal::config::{AnalystSource, Settings};
use betmind_terminal::demo_analyst::DemoAnalyst;
use betmind_terminal::export::export_path;
use betmind_terminal::gemini::GeminiAnalyst;
use betmind_terminal::logging::init_file_logging;
use betmind_terminal::orchestrator::MatchAnalyst;
use betmind_terminal::provider::spawn_analysis_provider;
use betmind_terminal::report::{AnalysisResult, ViewMode, view_mode_label};
use betmind_terminal::risk::RiskTier;
use betmind_terminal::state::{
    AdminForm, AppState, AuthField, AuthMode, CyclePhase, Delta, ProviderCommand, QueryField,
    Screen, apply_delta,
};
use betmind_terminal::store::SessionStore;
use betmind_terminal::view::{self, Tone};

struct App {
    state: AppState,
    session: Session,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    alert: Arc<dyn AlertSink>,
    export_dir: PathBuf,
    analyst_label: &'static str,
}

impl App {
    fn new(
        session: Session,
        settings: &Settings,
        cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    ) -> Self {
        let mut state = AppState::new();
        state.alerts_configured = settings.alerts_enabled;
        if let Some(user) = session.current_user() {
            state.screen = Screen::Dashboard;
            state.push_log(format!("[INFO] Sessão restaurada: {}", user.email));
        }
        Self {
            state,
            session,
            should_quit: false,
            cmd_tx,
            alert: Arc::new(TerminalBell),
            export_dir: settings.export_dir.clone(),
            analyst_label: match settings.analyst {
                AnalystSource::Gemini => "GEMINI",
                AnalystSource::Demo => "DEMO",
            },
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if self.state.help_overlay {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
                self.state.help_overlay = false;
            }
            return;
        }
        match self.state.screen {
            Screen::Login => self.on_login_key(key),
            Screen::Dashboard => self.on_dashboard_key(key),
            Screen::Admin => self.on_admin_key(key),
        }
    }

    fn on_login_key(&mut self, key: KeyEvent) {
        let form = &mut self.state.auth;
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::Down => form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
            KeyCode::F(2) => form.toggle_mode(),
            KeyCode::F(3) => form.show_password = !form.show_password,
            KeyCode::Backspace => {
                form.focused_mut().pop();
            }
            KeyCode::Enter => self.submit_auth(),
            KeyCode::Char(c) => form.focused_mut().push(c),
            _ => {}
        }
    }

    fn submit_auth(&mut self) {
        let form = &self.state.auth;
        let result = match form.mode {
            AuthMode::Login => self.session.login(&form.email, &form.password),
            AuthMode::Register => self.session.register(&RegisterForm {
                name: form.name.clone(),
                email: form.email.clone(),
                password: form.password.clone(),
                confirm_password: form.confirm_password.clone(),
            }),
        };
        match result {
            Ok(profile) => {
                self.state.auth.clear();
                self.state.screen = Screen::Dashboard;
                self.state.push_log(format!("[INFO] Bem-vindo, {}", profile.name));
            }
            Err(err) => {
                // Wrong credentials must not leave the password on screen.
                self.state.auth.password.clear();
                self.state.auth.confirm_password.clear();
                self.state.auth.error = Some(err.message().to_string());
            }
        }
    }

    fn on_dashboard_key(&mut self, key: KeyEvent) {
        if self.state.editing.is_some() {
            match key.code {
                KeyCode::Esc => self.state.editing = None,
                KeyCode::Tab => self.state.cycle_query_focus(),
                KeyCode::Enter => self.submit_query(),
                KeyCode::Backspace => {
                    if let Some(field) = self.state.focused_query_mut() {
                        field.pop();
                    }
                }
                KeyCode::Char(c) => {
                    if let Some(field) = self.state.focused_query_mut() {
                        field.push(c);
                    }
                }
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('/') | KeyCode::Char('i') => {
                self.state.editing = Some(QueryField::Primary)
            }
            KeyCode::Enter => self.submit_query(),
            KeyCode::Char('c') => {
                self.state.toggle_compare();
                let label = if self.state.compare_mode { "ligado" } else { "desligado" };
                self.state.push_log(format!("[INFO] Modo comparação {label}"));
            }
            KeyCode::Char('s') => {
                self.state.toggle_sound();
                let label = if self.state.sound_enabled { "ligado" } else { "mudo" };
                self.state.push_log(format!("[INFO] Som {label}"));
            }
            KeyCode::Char('[') => self.state.sidebar_open = !self.state.sidebar_open,
            KeyCode::Right | KeyCode::Char('l') => self.state.next_view(),
            KeyCode::Left | KeyCode::Char('h') => self.state.prev_view(),
            KeyCode::Char('j') | KeyCode::Down => {
                self.state.report_scroll = self.state.report_scroll.saturating_add(1)
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.state.report_scroll = self.state.report_scroll.saturating_sub(1)
            }
            KeyCode::Char('x') => self.request_export(),
            KeyCode::Char('a') => self.open_admin(),
            KeyCode::Char('o') => self.logout(),
            KeyCode::Char('?') => self.state.help_overlay = true,
            _ => {}
        }
    }

    fn on_admin_key(&mut self, key: KeyEvent) {
        let form = &mut self.state.admin;
        match key.code {
            KeyCode::Esc => self.state.screen = Screen::Dashboard,
            KeyCode::Tab | KeyCode::Down => form.focus = (form.focus + 1) % AdminForm::FIELDS,
            KeyCode::BackTab | KeyCode::Up => {
                form.focus = (form.focus + AdminForm::FIELDS - 1) % AdminForm::FIELDS
            }
            KeyCode::Backspace => {
                form.focused_mut().pop();
            }
            KeyCode::Enter => {
                let config = form.config.clone();
                match self.session.save_config(config) {
                    Ok(()) => {
                        self.state.admin.status = Some("Configurações salvas.".to_string());
                        self.state.push_log("[INFO] Configurações salvas");
                    }
                    Err(err) => self.state.admin.status = Some(err.message().to_string()),
                }
            }
            KeyCode::Char(c) => form.focused_mut().push(c),
            _ => {}
        }
    }

    fn submit_query(&mut self) {
        let Some(cmd) = self.state.begin_query() else {
            self.state.push_log("[INFO] Digite uma partida para analisar");
            return;
        };
        self.send(cmd, "[WARN] Analysis request failed");
    }

    fn request_export(&mut self) {
        let reports: Vec<AnalysisResult> = self.state.reports().into_iter().cloned().collect();
        if reports.is_empty() {
            self.state.push_log("[INFO] Nada para exportar");
            return;
        }
        let path = export_path(Some(&self.export_dir));
        self.state.export_status = Some(format!("Exportando para {}...", path.display()));
        self.send(ProviderCommand::Export { path, reports }, "[WARN] Export request failed");
    }

    fn send(&mut self, cmd: ProviderCommand, failure: &str) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Provider unavailable");
            return;
        };
        if tx.send(cmd).is_err() {
            self.state.push_log(failure.to_string());
        }
    }

    fn open_admin(&mut self) {
        if !self.session.is_admin() {
            self.state.push_log("[INFO] Acesso restrito ao administrador.");
            return;
        }
        self.state.admin = AdminForm {
            config: self.session.config().clone(),
            ..AdminForm::default()
        };
        self.state.screen = Screen::Admin;
    }

    fn logout(&mut self) {
        self.session.logout();
        self.state.reset_for_logout();
        self.state.push_log("[INFO] Sessão encerrada");
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let settings = Settings::from_env();
    let _log_guard = init_file_logging(settings.log_dir.as_deref(), &settings.log_filter);
    tracing::info!(analyst = ?settings.analyst, model = %settings.model, "starting");

    let session = Session::load(
        SessionStore::new(settings.store_dir.clone()),
        settings.admin.clone(),
    );
    let analyst: Arc<dyn MatchAnalyst> = match (&settings.analyst, &settings.api_key) {
        (AnalystSource::Gemini, Some(key)) => Arc::new(GeminiAnalyst::new(
            key.clone(),
            settings.model.clone(),
            settings.base_url.clone(),
            settings.request_timeout,
        )),
        _ => Arc::new(DemoAnalyst::new()),
    };

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_analysis_provider(analyst, tx, cmd_rx);

    let mut app = App::new(session, &settings, Some(cmd_tx));
    if settings.analyst == AnalystSource::Gemini && settings.api_key.is_none() {
        app.analyst_label = "DEMO";
        app.state
            .push_log("[WARN] GEMINI_API_KEY ausente, usando analista demo");
    }

    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "terminal loop failed");
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }
        if app.state.take_pending_alert() {
            alert::fire(Arc::clone(&app.alert));
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(app)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Login => render_login(frame, chunks[1], app),
        Screen::Dashboard => render_dashboard(frame, chunks[1], app),
        Screen::Admin => render_admin(frame, chunks[1], app),
    }

    let footer = Paragraph::new(footer_text(&app.state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[2]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(app: &App) -> String {
    let state = &app.state;
    let config = app.session.config();
    let title = match state.screen {
        Screen::Login => "BETMIND PRO | Entre para acessar análises de elite.".to_string(),
        Screen::Dashboard => {
            let user = app
                .session
                .current_user()
                .map(|u| u.name.as_str())
                .unwrap_or("-");
            format!(
                "BETMIND PRO | {} | {} | {} | Som: {}",
                user,
                view_mode_label(state.view_mode),
                app.analyst_label,
                if state.sound_enabled { "ON" } else { "OFF" }
            )
        }
        Screen::Admin => "BETMIND PRO | Painel Admin".to_string(),
    };
    let background = match state.screen {
        Screen::Login => &config.login_bg_url,
        _ => &config.app_bg_url,
    };
    let logo = if config.logo_url.is_empty() {
        "  [BM]".to_string()
    } else {
        format!("  logo: {}", config.logo_url)
    };
    let bg = if background.is_empty() {
        String::new()
    } else {
        format!("  bg: {background}")
    };
    format!("{logo}  {title}\n{bg}")
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Login => {
            "Tab Campo | F2 Login/Cadastro | F3 Mostrar senha | Enter Enviar | Esc Sair".to_string()
        }
        Screen::Dashboard if state.editing.is_some() => {
            "Enter Analisar | Tab Jogo A/B | Esc Navegar".to_string()
        }
        Screen::Dashboard => "/ Buscar | Enter Reanalisar | c Comparar | ←/→ Seção | [ Menu | s Som | x Exportar | a Admin | o Sair | ? Ajuda | q Fechar".to_string(),
        Screen::Admin => "Tab Campo | Enter Salvar | Esc Voltar".to_string(),
    }
}

fn render_login(frame: &mut Frame, area: Rect, app: &App) {
    let form = &app.state.auth;
    let popup = centered_rect(60, 80, area);
    frame.render_widget(Clear, popup);

    let title = match form.mode {
        AuthMode::Login => "Entrar",
        AuthMode::Register => "Criar Conta",
    };
    let mut lines = Vec::new();
    for field in form.fields() {
        let (label, value, secret) = match field {
            AuthField::Name => ("Nome Completo", &form.name, false),
            AuthField::Email => ("Email", &form.email, false),
            AuthField::Password => ("Senha", &form.password, true),
            AuthField::Confirm => ("Confirmar Senha", &form.confirm_password, true),
        };
        let shown = if secret && !form.show_password {
            "•".repeat(value.chars().count())
        } else {
            value.clone()
        };
        let focused = *field == form.focus;
        let style = if focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let cursor = if focused { "_" } else { "" };
        lines.push(Line::styled(format!("{label}:"), style));
        lines.push(Line::raw(format!("  {shown}{cursor}")));
        lines.push(Line::raw(""));
    }
    if let Some(err) = &form.error {
        lines.push(Line::styled(err.clone(), Style::default().fg(Color::Red)));
    }
    let switch = match form.mode {
        AuthMode::Login => "Não tem conta? F2 para cadastrar",
        AuthMode::Register => "Já tem conta? F2 para entrar",
    };
    lines.push(Line::styled(switch, Style::default().fg(Color::DarkGray)));

    let widget = Paragraph::new(lines)
        .block(Block::default().title(title).borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, popup);
}

fn render_admin(frame: &mut Frame, area: Rect, app: &App) {
    let form = &app.state.admin;
    let labels = ["URL do Logotipo", "Imagem Tela de Login", "Imagem Tela Principal"];
    let values = [
        &form.config.logo_url,
        &form.config.login_bg_url,
        &form.config.app_bg_url,
    ];
    let mut lines = Vec::new();
    for (idx, (label, value)) in labels.iter().zip(values).enumerate() {
        let focused = idx == form.focus;
        let style = if focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::styled(format!("{label}:"), style));
        lines.push(Line::raw(format!("  {value}{}", if focused { "_" } else { "" })));
        lines.push(Line::raw(""));
    }
    lines.push(Line::raw(format!(
        "Usuários cadastrados: {}",
        app.session.users().len()
    )));
    if let Some(status) = &form.status {
        lines.push(Line::styled(status.clone(), Style::default().fg(Color::Yellow)));
    }
    let widget = Paragraph::new(lines)
        .block(Block::default().title("Configurações").borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, area);
}

fn render_dashboard(frame: &mut Frame, area: Rect, app: &App) {
    let state = &app.state;
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(if state.sidebar_open {
            [Constraint::Length(22), Constraint::Min(1)]
        } else {
            [Constraint::Length(0), Constraint::Min(1)]
        })
        .split(area);
    if state.sidebar_open {
        render_sidebar(frame, columns[0], state);
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(columns[1]);

    render_query_inputs(frame, rows[0], state);
    render_status_line(frame, rows[1], state);

    let reports = state.reports();
    if reports.is_empty() {
        let hint = match state.phase {
            CyclePhase::Loading => "Consultando fontes e calculando probabilidades...",
            _ => "Digite uma partida (ex: Flamengo vs Palmeiras) e pressione Enter.",
        };
        let widget = Paragraph::new(hint)
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        frame.render_widget(widget, rows[2]);
    } else {
        let constraints = vec![Constraint::Ratio(1, reports.len() as u32); reports.len()];
        let report_cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(rows[2]);
        for (col, report) in report_cols.iter().zip(reports) {
            render_report(frame, *col, report, state);
        }
    }

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::TOP));
    frame.render_widget(console, rows[3]);
}

fn render_sidebar(frame: &mut Frame, area: Rect, state: &AppState) {
    let lines: Vec<Line> = ViewMode::ALL
        .iter()
        .map(|mode| {
            let label = view_mode_label(*mode);
            if *mode == state.view_mode {
                Line::styled(
                    format!("> {label}"),
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                )
            } else {
                Line::raw(format!("  {label}"))
            }
        })
        .collect();
    let widget = Paragraph::new(lines).block(Block::default().title("Menu").borders(Borders::RIGHT));
    frame.render_widget(widget, area);
}

fn render_query_inputs(frame: &mut Frame, area: Rect, state: &AppState) {
    let split = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(if state.compare_mode {
            [Constraint::Percentage(50), Constraint::Percentage(50)]
        } else {
            [Constraint::Percentage(100), Constraint::Percentage(0)]
        })
        .split(area);

    let primary_title = if state.compare_mode { "Jogo A" } else { "Partida" };
    render_input(frame, split[0], primary_title, &state.query, state.editing == Some(QueryField::Primary));
    if state.compare_mode {
        render_input(frame, split[1], "Jogo B", &state.query2, state.editing == Some(QueryField::Secondary));
    }
}

fn render_input(frame: &mut Frame, area: Rect, title: &str, value: &str, focused: bool) {
    let border = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let text = if focused { format!("{value}_") } else { value.to_string() };
    let widget = Paragraph::new(text).block(
        Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_style(border),
    );
    frame.render_widget(widget, area);
}

fn render_status_line(frame: &mut Frame, area: Rect, state: &AppState) {
    let (text, style) = if let Some(err) = &state.error {
        (err.clone(), Style::default().fg(Color::Red))
    } else if state.is_loading() {
        ("Analisando...".to_string(), Style::default().fg(Color::Yellow))
    } else if let Some(status) = &state.export_status {
        (status.clone(), Style::default().fg(Color::Green))
    } else {
        (String::new(), Style::default())
    };
    frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_report(frame: &mut Frame, area: Rect, report: &AnalysisResult, state: &AppState) {
    let mode = state.view_mode;
    let block = Block::default()
        .title(view::display(&report.match_title))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut constraints = Vec::new();
    if mode == ViewMode::Dashboard {
        constraints.push(Constraint::Length(3));
    }
    if mode.shows(ViewMode::Probs) {
        constraints.push(Constraint::Length(7));
    }
    if mode.shows(ViewMode::Risks) {
        constraints.push(Constraint::Length(3));
    }
    constraints.push(Constraint::Min(1));
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    let mut idx = 0;
    if mode == ViewMode::Dashboard {
        render_ticket(frame, parts[idx], report);
        idx += 1;
    }
    if mode.shows(ViewMode::Probs) {
        render_probabilities(frame, parts[idx], report);
        idx += 1;
    }
    if mode.shows(ViewMode::Risks) {
        render_risk_meter(frame, parts[idx], report, state.sound_enabled);
        idx += 1;
    }

    let widget = Paragraph::new(report_text(report, mode))
        .wrap(Wrap { trim: true })
        .scroll((state.report_scroll, 0));
    frame.render_widget(widget, parts[idx]);
}

fn render_ticket(frame: &mut Frame, area: Rect, report: &AnalysisResult) {
    let ticket = view::ticket(report);
    let lines = vec![
        Line::styled(
            format!("BILHETE: {}", ticket.best_entry),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Line::raw(format!("{} | Stake: {}", ticket.reliable_type, ticket.stake)),
    ];
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::BOTTOM)),
        area,
    );
}

fn render_probabilities(frame: &mut Frame, area: Rect, report: &AnalysisResult) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let bars: Vec<Bar> = view::outcome_bars(&report.probabilities)
        .iter()
        .map(|b| {
            Bar::default()
                .label(b.label.into())
                .value(u64::from(view::gauge_percent(b.value)))
                .style(Style::default().fg(tone_color(b.tone)))
        })
        .collect();
    let chart = BarChart::default()
        .block(Block::default().title("1x2"))
        .data(BarGroup::default().bars(&bars))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(1)
        .max(100);
    frame.render_widget(chart, halves[0]);

    let markets = view::market_bars(&report.probabilities);
    let gauge_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(1); markets.len()])
        .split(halves[1]);
    for (row, market) in gauge_rows.iter().zip(markets.iter()) {
        let percent = view::gauge_percent(market.value);
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(tone_color(market.tone)))
            .percent(percent)
            .label(format!("{} {percent}%", market.label));
        frame.render_widget(gauge, *row);
    }
}

fn render_risk_meter(frame: &mut Frame, area: Rect, report: &AnalysisResult, sound_enabled: bool) {
    let meter = view::risk_meter(report);
    let cells: String = (1..=3u8)
        .map(|lvl| if lvl <= meter.filled { "███ " } else { "░░░ " })
        .collect();
    let glyph = if view::shows_alert_glyph(report, sound_enabled) {
        " ♪!"
    } else {
        ""
    };
    let lines = vec![
        Line::styled(
            format!("Volatilidade {} {}{glyph}", cells, meter.tier.label()),
            Style::default().fg(tier_color(meter.tier)),
        ),
        Line::raw(format!("Zebra: {}", view::display(&report.risks.underdog_signals))),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn report_text(report: &AnalysisResult, mode: ViewMode) -> Text<'static> {
    let mut lines: Vec<Line<'static>> = Vec::new();
    if mode == ViewMode::Dashboard && !report.high_value_tips.is_empty() {
        lines.push(Line::styled(
            "Destaques Matemáticos",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));
        for tip in view::tip_lines(report) {
            lines.push(Line::raw(format!("  {tip}")));
        }
        lines.push(Line::raw(""));
    }
    for section in view::sections(report, mode) {
        if section.mode == ViewMode::Probs && mode != ViewMode::Probs {
            continue;
        }
        lines.push(Line::styled(
            section.title,
            Style::default().add_modifier(Modifier::BOLD),
        ));
        for (label, value) in section.rows {
            lines.push(Line::raw(format!("  {label}: {value}")));
        }
        lines.push(Line::raw(""));
    }
    let sources = view::sources(report);
    if !sources.is_empty() {
        lines.push(Line::styled(
            "Fontes",
            Style::default().add_modifier(Modifier::BOLD),
        ));
        for url in sources {
            lines.push(Line::styled(
                format!("  {url}"),
                Style::default().fg(Color::Blue),
            ));
        }
    }
    Text::from(lines)
}

fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Strong => Color::Green,
        Tone::Medium => Color::Blue,
        Tone::Weak => Color::Gray,
    }
}

fn tier_color(tier: RiskTier) -> Color {
    match tier {
        RiskTier::Low => Color::Green,
        RiskTier::Medium => Color::Yellow,
        RiskTier::High => Color::Red,
    }
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "Sem eventos".to_string();
    }
    let skip = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(skip)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "BetMind Pro - Ajuda",
        "",
        "Painel:",
        "  / or i       Editar consulta",
        "  Enter        Analisar",
        "  Tab          Alternar Jogo A/B (comparação)",
        "  c            Modo comparação",
        "  ←/→ or h/l   Trocar seção",
        "  j/k or ↑/↓   Rolar relatório",
        "  [            Mostrar/ocultar menu",
        "  s            Som dos alertas",
        "  x            Exportar .xlsx",
        "  a            Painel admin",
        "  o            Sair da conta",
        "  q            Fechar",
        "",
        "Login:",
        "  F2           Login/Cadastro",
        "  F3           Mostrar senha",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Ajuda").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
