use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::game::{FireGame, Phase, FIELD_HEIGHT, FIELD_WIDTH, LETTER_SIZE, PLANE_WIDTH, PLANE_Y};
use crate::core::game::GameRenderer;
use crate::core::scoring::format_time;

pub struct FireRenderer;

/// Map a field coordinate onto a cell inside `area`.
fn project(x: f64, y: f64, area: Rect) -> Option<(u16, u16)> {
    if !(0.0..FIELD_WIDTH).contains(&x) || !(0.0..FIELD_HEIGHT).contains(&y) {
        return None;
    }
    let col = area.x + (x / FIELD_WIDTH * area.width as f64) as u16;
    let row = area.y + (y / FIELD_HEIGHT * area.height as f64) as u16;
    Some((col.min(area.right().saturating_sub(1)), row.min(area.bottom().saturating_sub(1))))
}

impl GameRenderer<FireGame> for FireRenderer {
    fn render(frame: &mut Frame, game: &FireGame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(1)])
            .split(frame.area());

        let hud = Line::from(vec![
            Span::styled(format!(" Score {} ", game.score), Style::default().fg(Color::Yellow)),
            Span::raw(format!(" Time {} ", format_time(game.remaining_secs))),
            Span::raw(format!(" Best {} ", game.best)),
            Span::styled(
                format!(" {} · speed {} ", game.difficulty, game.speed_level),
                Style::default().fg(Color::Cyan),
            ),
        ]);
        frame.render_widget(
            Paragraph::new(hud).block(Block::default().borders(Borders::ALL).title(" LETTER FIRE ")),
            chunks[0],
        );

        let field_block = Block::default().borders(Borders::ALL);
        let field = field_block.inner(chunks[1]);
        frame.render_widget(field_block, chunks[1]);

        let buf = frame.buffer_mut();
        let letter_style = Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD);
        for letter in &game.letters {
            if let Some((col, row)) = project(letter.x + LETTER_SIZE / 2.0, letter.y + LETTER_SIZE / 2.0, field) {
                buf.set_string(col, row, letter.ch.to_string(), letter_style);
            }
        }
        for bullet in &game.bullets {
            if let Some((col, row)) = project(bullet.x, bullet.y, field) {
                buf.set_string(col, row, "¦", Style::default().fg(Color::White));
            }
        }
        for burst in &game.bursts {
            if let Some((col, row)) = project(burst.x, burst.y, field) {
                buf.set_string(col.saturating_sub(1), row, format!("*{}*", burst.ch), Style::default().fg(Color::Yellow));
            }
        }
        let plane_center = (game.plane.x + PLANE_WIDTH / 2.0).clamp(0.0, FIELD_WIDTH - 1.0);
        if let Some((col, row)) = project(plane_center, PLANE_Y, field) {
            buf.set_string(col.saturating_sub(1), row, "/^\\", Style::default().fg(Color::LightMagenta));
        }

        let help = match game.phase {
            Phase::Ready => "[Enter] Start  [a-z] Shoot  [Esc] Lobby",
            Phase::Playing => "Type the falling letters  [Esc] Lobby",
            Phase::Over => "[Enter] Play again  [Esc] Lobby",
        };
        frame.render_widget(
            Paragraph::new(help).alignment(Alignment::Center).style(Style::default().fg(Color::Gray)),
            chunks[2],
        );

        if game.phase == Phase::Over {
            let mut lines = vec![
                Line::from("GAME OVER").alignment(Alignment::Center),
                Line::from(format!("Final score: {}", game.score)).alignment(Alignment::Center),
                Line::from(format!("Hits {}  Misses {}  Accuracy {}%", game.tally.hits, game.tally.misses, game.tally.accuracy()))
                    .alignment(Alignment::Center),
            ];
            if game.new_record {
                lines.push(Line::styled("New record!", Style::default().fg(Color::Yellow)).alignment(Alignment::Center));
            }
            let popup = centered(field, 40, 7);
            frame.render_widget(Clear, popup);
            frame.render_widget(Paragraph::new(lines).block(Block::default().borders(Borders::ALL)), popup);
        }
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
