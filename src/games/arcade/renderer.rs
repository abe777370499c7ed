use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::difficulty::profile;
use super::game::{ArcadeGame, Screen, COLUMNS, HOLES};
use crate::core::game::GameRenderer;
use crate::core::scoring::{format_time, ScoreRating};
use crate::core::settings::Difficulty;

pub struct ArcadeRenderer;

impl GameRenderer<ArcadeGame> for ArcadeRenderer {
    fn render(frame: &mut Frame, game: &ArcadeGame) {
        match game.screen {
            Screen::Start => render_start(frame, game),
            Screen::End => render_end(frame, game),
            Screen::Playing | Screen::Paused => render_board(frame, game),
        }
    }
}

fn render_start(frame: &mut Frame, game: &ArcadeGame) {
    let mut lines = vec![
        Line::styled("WHACK-A-LETTER", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Line::from(""),
        Line::from("Type the letter on a mole before it ducks."),
        Line::from(""),
    ];
    for (i, difficulty) in Difficulty::ALL.into_iter().enumerate() {
        let p = profile(difficulty);
        let selected = difficulty == game.difficulty;
        let style = if selected {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled(format!(" {} {:<7}", i + 1, p.label), style),
            Span::raw(format!("  {:<32}", p.blurb)),
            Span::styled(
                format!(" best {}", game.high_score(difficulty)),
                Style::default().fg(Color::Yellow),
            ),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::styled(
        "[←/→ or 1-3] Difficulty  [Enter] Start  [Esc] Lobby",
        Style::default().fg(Color::Gray),
    ));

    let area = centered(frame.area(), 70, lines.len() as u16 + 2);
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn render_board(frame: &mut Frame, game: &ArcadeGame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(9), Constraint::Length(1)])
        .split(frame.area());

    let hearts = "♥".repeat(game.lives.min(3) as usize);
    let hud = Line::from(vec![
        Span::styled(format!(" Score {} ", game.score), Style::default().fg(Color::Yellow)),
        Span::raw(format!(" Time {} ", format_time(game.time_left))),
        Span::styled(format!(" {hearts} "), Style::default().fg(Color::Red)),
        Span::raw(format!(" Speed x{:.2} ", game.speed)),
        Span::styled(format!(" {} ", game.profile().label), Style::default().fg(Color::Cyan)),
    ]);
    frame.render_widget(
        Paragraph::new(hud).block(Block::default().borders(Borders::ALL).title(" WHACK-A-LETTER ")),
        chunks[0],
    );

    let rows = HOLES / COLUMNS;
    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, rows as u32); rows])
        .split(chunks[1]);
    for (r, row) in row_areas.iter().enumerate() {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, COLUMNS as u32); COLUMNS])
            .split(*row);
        for (c, cell) in cells.iter().enumerate() {
            draw_hole(frame, game, r * COLUMNS + c, *cell);
        }
    }

    let help = if game.screen == Screen::Paused {
        "[Space] Resume  [End] Finish  [Esc] Lobby"
    } else {
        "[a-z] Whack  [Space] Pause  [End] Finish  [Esc] Lobby"
    };
    frame.render_widget(
        Paragraph::new(help).alignment(Alignment::Center).style(Style::default().fg(Color::Gray)),
        chunks[2],
    );

    if game.screen == Screen::Paused {
        let popup = centered(chunks[1], 20, 3);
        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new("PAUSED").alignment(Alignment::Center).block(Block::default().borders(Borders::ALL)),
            popup,
        );
    }
}

fn draw_hole(frame: &mut Frame, game: &ArcadeGame, idx: usize, area: Rect) {
    let (body, style) = match game.hole(idx) {
        Some(mole) if mole.hit => (format!("+{}", mole.points), Style::default().fg(Color::Green)),
        Some(mole) => (
            mole.letter.to_string(),
            Style::default().fg(Color::LightYellow).add_modifier(Modifier::BOLD),
        ),
        None => (String::new(), Style::default()),
    };
    let block = Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    let mid = Rect::new(inner.x, inner.y + inner.height / 2, inner.width, 1.min(inner.height));
    frame.render_widget(Paragraph::new(body).style(style).alignment(Alignment::Center), mid);
}

fn render_end(frame: &mut Frame, game: &ArcadeGame) {
    let Some(summary) = game.summary.as_ref() else {
        return;
    };
    let report = &summary.report;
    let rating = ScoreRating::for_score(report.score);
    let mut lines = vec![
        Line::styled("GAME OVER", Style::default().add_modifier(Modifier::BOLD)),
        Line::from(""),
        Line::styled(
            format!("{} {}", rating.emoji(), rating.label()),
            Style::default().fg(rating.color()),
        ),
        Line::from(format!("Score {}", report.score)),
        Line::from(format!(
            "Hits {}  Misses {}  Accuracy {}%",
            report.hits,
            report.misses,
            game.tally.accuracy()
        )),
        Line::from(format!("Time played {}", format_time(report.elapsed_secs))),
        Line::from(format!("Best on {} {}", game.profile().label, game.high_score(game.difficulty))),
    ];
    if summary.new_record {
        lines.push(Line::styled("New record!", Style::default().fg(Color::Yellow)));
    }
    lines.push(Line::from(""));
    lines.push(Line::styled("[Enter] Play again  [Esc] Lobby", Style::default().fg(Color::Gray)));

    let area = centered(frame.area(), 50, lines.len() as u16 + 2);
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(area.x + (area.width - width) / 2, area.y + (area.height - height) / 2, width, height)
}
