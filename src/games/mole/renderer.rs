use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::game::{MoleGame, Phase, HOLES, MAX_LIVES};
use crate::core::game::GameRenderer;
use crate::core::scoring::format_time;

pub struct MoleRenderer;

const COLUMNS: usize = 3;

impl GameRenderer<MoleGame> for MoleRenderer {
    fn render(frame: &mut Frame, game: &MoleGame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(9), Constraint::Length(1)])
            .split(frame.area());

        let hearts = "♥".repeat(game.lives as usize) + &"·".repeat((MAX_LIVES - game.lives) as usize);
        let hud = Line::from(vec![
            Span::styled(format!(" Score {} ", game.score), Style::default().fg(Color::Yellow)),
            Span::raw(format!(" Level {} ", game.level)),
            Span::raw(format!(" Time {} ", format_time(game.time_left))),
            Span::styled(format!(" {hearts} "), Style::default().fg(Color::Red)),
            Span::raw(format!(" Best {} ", game.best)),
        ]);
        frame.render_widget(
            Paragraph::new(hud).block(Block::default().borders(Borders::ALL).title(" LETTER MOLE ")),
            chunks[0],
        );

        let field = chunks[1];
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Ratio(1, 3); 3])
            .split(field);
        for (r, row) in rows.iter().enumerate() {
            let cells = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Ratio(1, 3); COLUMNS])
                .split(*row);
            for (c, cell) in cells.iter().enumerate() {
                let idx = r * COLUMNS + c;
                if idx < HOLES {
                    draw_hole(frame, game, idx, *cell);
                }
            }
        }

        let help = match game.phase {
            Phase::Idle => "[Space] Start  [a-z] Whack by letter  [1-9] Whack by hole  [Esc] Lobby",
            Phase::Playing => "[Space] Pause  [Enter] Reset  [Esc] Lobby",
            Phase::Paused => "[Space] Resume  [Enter] Reset  [Esc] Lobby",
            Phase::Over => "[Enter] Play again  [Esc] Lobby",
        };
        frame.render_widget(
            Paragraph::new(help).alignment(Alignment::Center).style(Style::default().fg(Color::Gray)),
            chunks[2],
        );

        let banner = match game.phase {
            Phase::Paused => Some(vec![Line::from("PAUSED")]),
            Phase::Over => {
                let mut lines = vec![
                    Line::from("GAME OVER"),
                    Line::from(format!("Final score: {}  Level {}", game.score, game.level)),
                    Line::from(format!("Accuracy {}%", game.tally.accuracy())),
                ];
                if game.new_record {
                    lines.push(Line::styled("New record!", Style::default().fg(Color::Yellow)));
                }
                Some(lines)
            }
            _ => None,
        };
        if let Some(lines) = banner {
            let height = lines.len() as u16 + 2;
            let popup = centered(field, 36, height);
            frame.render_widget(Clear, popup);
            frame.render_widget(
                Paragraph::new(lines).alignment(Alignment::Center).block(Block::default().borders(Borders::ALL)),
                popup,
            );
        }
    }
}

fn draw_hole(frame: &mut Frame, game: &MoleGame, idx: usize, area: Rect) {
    let (body, style) = match game.hole(idx) {
        Some(mole) if mole.hit => ("✗".to_string(), Style::default().fg(Color::Green)),
        Some(mole) => (
            mole.letter.to_string(),
            Style::default().fg(Color::LightYellow).add_modifier(Modifier::BOLD),
        ),
        None => (" ".to_string(), Style::default()),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", idx + 1))
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    let mid = Rect::new(inner.x, inner.y + inner.height / 2, inner.width, 1.min(inner.height));
    frame.render_widget(Paragraph::new(body).style(style).alignment(Alignment::Center), mid);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(area.x + (area.width - width) / 2, area.y + (area.height - height) / 2, width, height)
}
