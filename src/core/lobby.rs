use ratatui::{
    widgets::{Block, Borders, List, ListItem, Paragraph},
    layout::{Alignment, Layout, Constraint, Direction},
    style::{Style, Color, Modifier},
    text::Line,
    Frame,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use std::time::Duration;
use anyhow::Result;

use crate::core::scoring::format_time;
use crate::core::settings::Settings;
use crate::core::storage::SaveFile;
use crate::games::GameInfo;

#[derive(Debug, Clone, PartialEq)]
pub enum LobbyResult {
    Play(String, Settings),
    Quit,
}

pub struct LobbyManager {
    pub selected_game_index: usize,
    /// 0 is the game row, then one row per option of the selected game.
    pub selected_row: usize,
    pub settings: Settings,
    pub show_stats: bool,
    save: SaveFile,
}

impl LobbyManager {
    pub fn new(settings: Settings, save: SaveFile, games: &[GameInfo]) -> Self {
        let selected_game_index = settings
            .last_game
            .as_deref()
            .and_then(|id| games.iter().position(|g| g.id == id))
            .unwrap_or(0);
        Self {
            selected_game_index,
            selected_row: 0,
            settings,
            show_stats: false,
            save,
        }
    }

    pub fn run(&mut self, terminal: &mut ratatui::DefaultTerminal, games: &[GameInfo]) -> Result<LobbyResult> {
        loop {
            terminal.draw(|f| self.render(f, games))?;

            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if let Some(result) = self.handle_key(key, games) {
                        return Ok(result);
                    }
                }
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, games: &[GameInfo]) -> Option<LobbyResult> {
        if games.is_empty() {
            return Some(LobbyResult::Quit);
        }
        if self.show_stats {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('s') | KeyCode::Char('q') | KeyCode::Enter) {
                self.show_stats = false;
            }
            return None;
        }

        let options = games[self.selected_game_index].options;
        match key.code {
            KeyCode::Up => self.selected_row = self.selected_row.saturating_sub(1),
            KeyCode::Down => self.selected_row = (self.selected_row + 1).min(options.len()),
            KeyCode::Left | KeyCode::Right => {
                let forward = key.code == KeyCode::Right;
                if self.selected_row == 0 {
                    let n = games.len();
                    self.selected_game_index = if forward {
                        (self.selected_game_index + 1) % n
                    } else {
                        (self.selected_game_index + n - 1) % n
                    };
                } else {
                    self.settings.cycle(options[self.selected_row - 1], forward);
                }
            }
            KeyCode::Enter => {
                let id = games[self.selected_game_index].id;
                self.settings.last_game = Some(id.to_string());
                return Some(LobbyResult::Play(id.to_string(), self.settings.clone()));
            }
            KeyCode::Char('s') => self.show_stats = true,
            KeyCode::Char('q') | KeyCode::Esc => return Some(LobbyResult::Quit),
            _ => {}
        }
        None
    }

    /// Refresh the numbers shown in the stats panel after a round.
    pub fn set_save(&mut self, save: SaveFile) {
        self.save = save;
    }

    fn render(&self, f: &mut Frame, games: &[GameInfo]) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(2)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
            .split(f.area());

        f.render_widget(
            Paragraph::new(" LETTERTERM ")
                .block(Block::default().borders(Borders::ALL))
                .alignment(Alignment::Center),
            chunks[0]
        );

        if self.show_stats {
            f.render_widget(
                Paragraph::new(stats_lines(&self.save))
                    .block(Block::default().title(" STATISTICS ").borders(Borders::ALL)),
                chunks[1]
            );
            f.render_widget(
                Paragraph::new("[S/Esc] Back").alignment(Alignment::Center),
                chunks[2]
            );
            return;
        }

        let highlight = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
        let Some(game) = games.get(self.selected_game_index) else {
            return;
        };
        let mut items = vec![ListItem::new(format!(" » {} : {}", game.name, game.description))
            .style(if self.selected_row == 0 { highlight } else { Style::default() })];
        for (i, kind) in game.options.iter().enumerate() {
            let style = if self.selected_row == i + 1 { highlight } else { Style::default() };
            items.push(
                ListItem::new(format!("     {:<12} ‹ {} ›", kind.label(), self.settings.value_of(*kind))).style(style),
            );
        }

        f.render_widget(
            List::new(items).block(Block::default().title(format!(" GAME {}/{} ", self.selected_game_index + 1, games.len())).borders(Borders::ALL)),
            chunks[1]
        );

        f.render_widget(
            Paragraph::new("[↑/↓] Select  [←/→] Change  [Enter] Play  [S] Stats  [Q] Quit")
                .alignment(Alignment::Center),
            chunks[2]
        );
    }
}

pub fn stats_lines(save: &SaveFile) -> Vec<Line<'static>> {
    let stats = &save.stats;
    let mut lines = vec![
        Line::from(format!("Games played    {}", stats.total_games)),
        Line::from(format!("Total score     {}", stats.total_score)),
        Line::from(format!("Hits / misses   {} / {}", stats.total_hits, stats.total_misses)),
        Line::from(format!("Best accuracy   {}%", stats.best_accuracy)),
        Line::from(format!("Time played     {}", format_time(stats.play_time_secs.min(u32::MAX as u64) as u32))),
        Line::from(""),
        Line::from("High scores"),
    ];
    if save.high_scores.is_empty() {
        lines.push(Line::from("  none yet"));
    }
    for (board, score) in &save.high_scores {
        lines.push(Line::from(format!("  {board:<14} {score}")));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::settings::{Difficulty, OptionKind};
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;

    const GAMES: [GameInfo; 2] = [
        GameInfo { id: "a", name: "A", description: "", author: "", options: &[OptionKind::Difficulty] },
        GameInfo { id: "b", name: "B", description: "", author: "", options: &[] },
    ];

    fn press(lobby: &mut LobbyManager, code: KeyCode) -> Option<LobbyResult> {
        lobby.handle_key(KeyEvent::new(code, KeyModifiers::NONE), &GAMES)
    }

    #[test]
    fn remembers_last_game() {
        let settings = Settings { last_game: Some("b".into()), ..Settings::default() };
        let lobby = LobbyManager::new(settings, SaveFile::default(), &GAMES);
        assert_eq!(lobby.selected_game_index, 1);
    }

    #[test]
    fn cycles_options_and_plays() {
        let mut lobby = LobbyManager::new(Settings::default(), SaveFile::default(), &GAMES);
        press(&mut lobby, KeyCode::Down);
        press(&mut lobby, KeyCode::Down);
        assert_eq!(lobby.selected_row, 1);
        press(&mut lobby, KeyCode::Right);
        assert_eq!(lobby.settings.difficulty, Difficulty::Medium);

        match press(&mut lobby, KeyCode::Enter) {
            Some(LobbyResult::Play(id, settings)) => {
                assert_eq!(id, "a");
                assert_eq!(settings.difficulty, Difficulty::Medium);
                assert_eq!(settings.last_game.as_deref(), Some("a"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn game_row_wraps() {
        let mut lobby = LobbyManager::new(Settings::default(), SaveFile::default(), &GAMES);
        press(&mut lobby, KeyCode::Left);
        assert_eq!(lobby.selected_game_index, 1);
        press(&mut lobby, KeyCode::Right);
        assert_eq!(lobby.selected_game_index, 0);
    }

    #[test]
    fn stats_panel_swallows_quit() {
        let mut lobby = LobbyManager::new(Settings::default(), SaveFile::default(), &GAMES);
        press(&mut lobby, KeyCode::Char('s'));
        assert!(lobby.show_stats);
        assert_eq!(press(&mut lobby, KeyCode::Esc), None);
        assert!(!lobby.show_stats);
        assert_eq!(press(&mut lobby, KeyCode::Char('q')), Some(LobbyResult::Quit));
    }
}
