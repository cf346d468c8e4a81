//! Signal-Deck terminal dashboard
//!
//! Renders per-asset TradingView trend/signal cards and macro indicator
//! readings. The dataset is kept fresh by the polling scheduler in
//! signal-deck-data; this binary only draws snapshots and wires terminal
//! focus changes into the scheduler's visibility signal.

use std::{
    error::Error,
    io,
    time::{Duration, Instant},
};

use crossterm::{
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event, KeyCode,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table},
};
use signal_deck_data::{
    AssetRecord, DashboardState, FeedClient, FeedConfig, MacroBias, MacroRecord,
    REFRESH_INTERVAL_SECS, RefreshConfig, RefreshScheduler, ScoreBias, SignalKind, Trend, Verdict,
    format_recency, is_recent, market_verdict, score_bias, trend_score,
};

// Colors matching the rest of the deck terminals
const C_BUY: Color = Color::Rgb(100, 220, 100);
const C_SELL: Color = Color::Rgb(220, 100, 100);
const C_NEUTRAL: Color = Color::Rgb(180, 180, 100);
const C_DIM: Color = Color::Rgb(120, 120, 120);
const C_BRIGHT: Color = Color::Rgb(220, 220, 220);
const C_ACCENT: Color = Color::Rgb(100, 180, 220);

/// Get the backend base URL from the FEED_URL env var (default: http://127.0.0.1:8000)
fn get_feed_url() -> String {
    std::env::var("FEED_URL").unwrap_or_else(|_| "http://127.0.0.1:8000".to_string())
}

/// Get the refresh interval from the REFRESH_INTERVAL_SECS env var (default: 3)
fn get_interval_secs() -> u32 {
    std::env::var("REFRESH_INTERVAL_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(REFRESH_INTERVAL_SECS)
}

/// Route tracing output to the file named by SIGNAL_DECK_LOG
///
/// Stdout belongs to the terminal UI, so logging stays off unless a file
/// target is configured.
fn init_logging() {
    let Ok(path) = std::env::var("SIGNAL_DECK_LOG") else {
        return;
    };
    let Ok(file) = std::fs::File::create(&path) else {
        return;
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
}

/// Currently displayed tab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Assets,
    Macro,
}

impl Tab {
    fn toggled(self) -> Self {
        match self {
            Tab::Assets => Tab::Macro,
            Tab::Macro => Tab::Assets,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_logging();

    // Setup panic hook to restore terminal on crash
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(
            io::stdout(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            DisableFocusChange
        );
        original_hook(panic_info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableFocusChange
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let client = FeedClient::with_config(FeedConfig::new(get_feed_url()));
    let config = RefreshConfig::default().with_interval_secs(get_interval_secs());
    let mut scheduler = RefreshScheduler::start(client, config);

    let mut tab = Tab::Assets;
    let frame_rate = Duration::from_millis(250);
    let mut last_frame = Instant::now();

    loop {
        if last_frame.elapsed() >= frame_rate {
            let snapshot = scheduler.snapshot().await;
            terminal.draw(|f| render_ui(f, &snapshot, tab))?;
            last_frame = Instant::now();
        }

        let timeout = frame_rate
            .checked_sub(last_frame.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char('a') => tab = Tab::Assets,
                    KeyCode::Char('m') => tab = Tab::Macro,
                    KeyCode::Tab => tab = tab.toggled(),
                    _ => {}
                },
                Event::FocusGained => scheduler.set_visible(true),
                Event::FocusLost => scheduler.set_visible(false),
                _ => {}
            }
        }
    }

    scheduler.stop().await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableFocusChange
    )?;
    terminal.show_cursor()?;
    Ok(())
}

fn render_ui(f: &mut Frame, snapshot: &DashboardState, tab: Tab) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_header(f, snapshot, tab, chunks[0]);

    if snapshot.loading {
        render_loading(f, chunks[1]);
    } else {
        match tab {
            Tab::Assets => render_assets(f, snapshot, chunks[1]),
            Tab::Macro => render_macros(f, snapshot, chunks[1]),
        }
    }

    render_footer(f, snapshot, chunks[2]);
}

fn render_header(f: &mut Frame, snapshot: &DashboardState, tab: Tab, area: Rect) {
    let block = Block::default()
        .title(" SIGNAL DECK ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(C_ACCENT));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);

    let tab_style = |active| {
        if active {
            Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(C_DIM)
        }
    };
    let tabs = Line::from(vec![
        Span::styled(" [a] ASSETS ", tab_style(tab == Tab::Assets)),
        Span::styled("│", Style::default().fg(C_DIM)),
        Span::styled(" [m] MACRO ", tab_style(tab == Tab::Macro)),
    ]);
    f.render_widget(Paragraph::new(tabs), halves[0]);

    let status = Line::from(vec![
        Span::styled(
            format!("{} COINS ", snapshot.assets.len()),
            Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD),
        ),
        Span::styled("● LIVE ", Style::default().fg(C_BUY)),
        Span::styled(
            format!("{}s ", snapshot.countdown),
            Style::default().fg(C_DIM),
        ),
    ]);
    f.render_widget(
        Paragraph::new(status).alignment(Alignment::Right),
        halves[1],
    );
}

fn render_loading(f: &mut Frame, area: Rect) {
    let waiting = Paragraph::new(Text::from(vec![
        Line::from(""),
        Line::from(Span::styled(
            "Loading dashboard...",
            Style::default().fg(C_DIM).add_modifier(Modifier::ITALIC),
        )),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(waiting, area);
}

fn render_assets(f: &mut Frame, snapshot: &DashboardState, area: Rect) {
    let header_cells = ["ASSET", "1W", "3D", "1D", "SCORE", "SIGNAL", "UPDATED"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD))
        });
    let header = Row::new(header_cells).height(1);

    let rows = snapshot.assets.iter().map(asset_row);

    let table = Table::new(
        rows,
        [
            Constraint::Length(16),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(7),
            Constraint::Length(18),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" ASSETS ")
            .border_style(Style::default().fg(C_DIM)),
    );

    f.render_widget(table, area);
}

fn asset_row(coin: &AssetRecord) -> Row<'_> {
    let name_cell = Cell::from(Line::from(vec![
        Span::styled(
            coin.display_name.clone(),
            Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {}", coin.symbol), Style::default().fg(C_DIM)),
    ]));

    let score = trend_score(&coin.trends);
    let (arrow, score_color) = match score_bias(score) {
        ScoreBias::Positive => ("↗", C_BUY),
        ScoreBias::Negative => ("↘", C_SELL),
        ScoreBias::Neutral => ("→", C_NEUTRAL),
    };
    let score_cell = Cell::from(format!("{arrow} {score:+}")).style(
        Style::default()
            .fg(score_color)
            .add_modifier(Modifier::BOLD),
    );

    let signal_cell = match coin.active_signal() {
        Some((kind, minutes_ago)) => {
            let (icon, color) = if kind == SignalKind::Buy {
                ("▲", C_BUY)
            } else {
                ("▼", C_SELL)
            };
            Cell::from(Line::from(vec![
                Span::styled(format!("{icon} {kind} "), Style::default().fg(color)),
                Span::styled(format_recency(minutes_ago), Style::default().fg(C_DIM)),
            ]))
        }
        None => Cell::from("awaiting signal").style(Style::default().fg(C_DIM)),
    };

    let recent = is_recent(coin.last_updated_minutes_ago);
    let updated_style = if recent {
        Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(C_DIM)
    };
    let updated_cell =
        Cell::from(format_recency(coin.last_updated_minutes_ago)).style(updated_style);

    Row::new(vec![
        name_cell,
        trend_cell(coin.trends.weekly),
        trend_cell(coin.trends.three_day),
        trend_cell(coin.trends.daily),
        score_cell,
        signal_cell,
        updated_cell,
    ])
    .height(1)
}

fn trend_cell(trend: Option<Trend>) -> Cell<'static> {
    match trend {
        Some(t) => {
            let (icon, color) = if t.is_up() { ("▲", C_BUY) } else { ("▼", C_SELL) };
            Cell::from(format!("{icon} {t}")).style(Style::default().fg(color))
        }
        None => Cell::from("—").style(Style::default().fg(C_DIM)),
    }
}

fn render_macros(f: &mut Frame, snapshot: &DashboardState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(3)])
        .split(area);

    render_verdict(f, snapshot, chunks[0]);

    let header_cells = ["INDICATOR", "MONTHLY TREND", "MONTHLY MACD", "UPDATED"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD))
        });
    let header = Row::new(header_cells).height(1);

    let rows = snapshot.macros.iter().map(macro_row);

    let table = Table::new(
        rows,
        [
            Constraint::Length(24),
            Constraint::Length(16),
            Constraint::Length(16),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" MACRO ")
            .border_style(Style::default().fg(C_DIM)),
    );

    f.render_widget(table, chunks[1]);
}

fn macro_row(record: &MacroRecord) -> Row<'_> {
    let name_cell = Cell::from(Line::from(vec![
        Span::styled(
            record.display_name.clone(),
            Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {}", record.symbol), Style::default().fg(C_DIM)),
    ]));

    Row::new(vec![
        name_cell,
        bias_cell(record.monthly_trend),
        bias_cell(record.monthly_macd),
        Cell::from(format_recency(record.last_updated_minutes_ago))
            .style(Style::default().fg(C_DIM)),
    ])
    .height(1)
}

fn bias_cell(bias: MacroBias) -> Cell<'static> {
    let (icon, color) = if bias.is_bullish() {
        ("▲", C_BUY)
    } else {
        ("▼", C_SELL)
    };
    Cell::from(format!("{icon} {bias}")).style(Style::default().fg(color))
}

fn render_verdict(f: &mut Frame, snapshot: &DashboardState, area: Rect) {
    let summary = market_verdict(&snapshot.macros);
    let color = match summary.verdict {
        Verdict::Bullish => C_BUY,
        Verdict::Bearish => C_SELL,
        Verdict::Loading => C_DIM,
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" MARKET VERDICT ")
        .border_style(Style::default().fg(color));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if inner.height == 0 {
        return;
    }

    let gauge_area = Rect {
        x: inner.x + 1,
        y: inner.y,
        width: inner.width.saturating_sub(2),
        height: 1,
    };
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(color).bg(Color::Rgb(30, 30, 40)))
        .ratio(f64::from(summary.confidence) / 100.0)
        .label(Span::styled(
            format!(
                " {} · {}↑ / {}↓ · {}% ",
                summary.verdict, summary.bullish, summary.bearish, summary.confidence
            ),
            Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD),
        ));
    f.render_widget(gauge, gauge_area);

    if inner.height > 1 {
        let hint_area = Rect {
            x: inner.x + 1,
            y: inner.y + 1,
            width: inner.width.saturating_sub(2),
            height: 1,
        };
        let hint = match summary.verdict {
            Verdict::Loading => "waiting for macro records...",
            _ => "two votes per indicator: monthly trend + monthly MACD",
        };
        f.render_widget(
            Paragraph::new(Span::styled(hint, Style::default().fg(C_DIM))),
            hint_area,
        );
    }
}

fn render_footer(f: &mut Frame, snapshot: &DashboardState, area: Rect) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    f.render_widget(
        Paragraph::new(Span::styled(
            " q quit · tab switch · powered by tradingview webhooks",
            Style::default().fg(C_DIM),
        )),
        halves[0],
    );

    let last_sync = snapshot
        .last_sync
        .map(|t| {
            t.with_timezone(&chrono::Local)
                .format("%H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| "—".to_string());
    f.render_widget(
        Paragraph::new(Span::styled(
            format!("last sync {last_sync} "),
            Style::default().fg(C_DIM),
        ))
        .alignment(Alignment::Right),
        halves[1],
    );
}
