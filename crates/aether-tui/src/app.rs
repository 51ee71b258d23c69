//! Application state and key handling for the TUI.
//!
//! `App` owns everything the UI task mutates: the query input, the
//! [`Selection`] over the latest reply and the [`HighlightEngine`] that
//! positions the bar. Key presses are translated into a [`KeyAction`] that
//! tells the event loop which side effect (query or launch) to perform, so
//! this module stays free of I/O.

use std::time::Instant;

use aether_types::{LaunchRequest, QueryReply};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, info, warn};

use crate::colors::Palette;
use crate::config::Config;
use crate::highlight::HighlightEngine;
use crate::launch::LaunchOutcome;
use crate::selection::{Selection, Transition, web_slot_label};

/// Side effect requested by a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    None,
    /// The input changed; send it as a query
    Query(String),
    Launch(LaunchRequest),
}

/// Main application state
pub struct App {
    pub input: String,
    /// Cursor position in characters, not bytes
    pub cursor_position: usize,
    pub selection: Selection,
    pub highlight: HighlightEngine,
    pub placeholder: String,
    pub web_label: String,
    pub palette: Palette,
    pub should_quit: bool,
    /// A launch request is in flight; further commits are ignored
    pub launching: bool,
    /// First visible row of the result list, maintained by the renderer
    pub scroll_top: usize,
    last_sent_seq: Option<u64>,
}

impl Default for App {
    fn default() -> Self {
        Self::new(&Config::default(), Palette::default())
    }
}

impl App {
    pub fn new(config: &Config, palette: Palette) -> Self {
        Self {
            input: String::new(),
            cursor_position: 0,
            selection: Selection::new(),
            highlight: HighlightEngine::new(config.highlight_duration()),
            placeholder: config.placeholder.clone(),
            web_label: config.web_search_label.clone(),
            palette,
            should_quit: false,
            launching: false,
            scroll_top: 0,
            last_sent_seq: None,
        }
    }

    pub fn move_cursor_left(&mut self) {
        let cursor_moved_left = self.cursor_position.saturating_sub(1);
        self.cursor_position = self.clamp_cursor(cursor_moved_left);
    }

    pub fn move_cursor_right(&mut self) {
        let cursor_moved_right = self.cursor_position.saturating_add(1);
        self.cursor_position = self.clamp_cursor(cursor_moved_right);
    }

    pub fn enter_char(&mut self, c: char) {
        let index = self.byte_index();
        self.input.insert(index, c);
        self.move_cursor_right();
    }

    /// Backspace. Returns whether anything was removed.
    pub fn delete_char(&mut self) -> bool {
        if self.cursor_position == 0 {
            return false;
        }
        let current_index = self.cursor_position;
        let before_char_to_delete = self.input.chars().take(current_index - 1);
        let after_char_to_delete = self.input.chars().skip(current_index);
        self.input = before_char_to_delete.chain(after_char_to_delete).collect();
        self.move_cursor_left();
        true
    }

    /// Delete. Returns whether anything was removed.
    pub fn delete_char_forward(&mut self) -> bool {
        if self.cursor_position >= self.input.chars().count() {
            return false;
        }
        let index = self.byte_index();
        self.input.remove(index);
        true
    }

    pub fn clear_input(&mut self) -> bool {
        if self.input.is_empty() {
            return false;
        }
        self.input.clear();
        self.cursor_position = 0;
        true
    }

    pub fn clamp_cursor(&self, new_cursor_pos: usize) -> usize {
        new_cursor_pos.clamp(0, self.input.chars().count())
    }

    fn byte_index(&self) -> usize {
        self.input
            .char_indices()
            .map(|(i, _)| i)
            .nth(self.cursor_position)
            .unwrap_or(self.input.len())
    }

    /// Record the sequence number of the query just sent; replies to older
    /// queries are dropped from now on.
    pub fn query_sent(&mut self, seq: u64) {
        self.last_sent_seq = Some(seq);
    }

    /// Apply a reply from the backend. Returns false if it was stale.
    pub fn handle_reply(&mut self, reply: QueryReply, now: Instant) -> bool {
        if let (Some(seq), Some(latest)) = (reply.seq, self.last_sent_seq)
            && seq != latest
        {
            debug!("Dropping stale reply {seq}, latest query is {latest}");
            return false;
        }

        let transition = self.selection.replace(reply.outcome);
        self.highlight.rebuild(self.row_heights());
        self.apply(transition, now);
        self.scroll_top = 0;
        true
    }

    pub fn select_next(&mut self, now: Instant) {
        if let Some(transition) = self.selection.move_down(&self.input) {
            self.apply(transition, now);
        }
    }

    pub fn select_previous(&mut self, now: Instant) {
        if let Some(transition) = self.selection.move_up() {
            self.apply(transition, now);
        }
    }

    /// Resolve the selection into a launch request, unless one is already
    /// in flight or there is nothing to launch.
    pub fn commit(&mut self) -> Option<LaunchRequest> {
        if self.launching {
            debug!("Launch already in flight, ignoring commit");
            return None;
        }
        let Some(request) = self.selection.commit(&self.input) else {
            info!("Nothing to launch for {:?}", self.input);
            return None;
        };
        self.launching = true;
        Some(request)
    }

    pub fn launch_finished(&mut self, outcome: LaunchOutcome) {
        debug!("Launch finished: {outcome:?}");
        self.launching = false;
    }

    /// The shutdown transition shared by Escape and external close requests.
    pub fn cancel(&mut self) {
        debug!("Launcher cancelled");
        self.should_quit = true;
    }

    /// The terminal stopped delivering events, so nothing can drive the
    /// launcher any more.
    pub fn input_closed(&mut self) {
        warn!("Terminal input closed");
        self.cancel();
    }

    /// Let parked highlight requests resolve once the frame is drawn.
    pub fn settle(&mut self) {
        self.highlight.settle();
    }

    /// Labels of the navigable rows, web slot last.
    pub fn rows(&self) -> Vec<String> {
        let Some(candidates) = self.selection.candidates() else {
            return Vec::new();
        };
        let mut rows = candidates.to_vec();
        if self.selection.has_web_slot(&self.input) {
            rows.push(web_slot_label(&self.web_label, &self.input));
        }
        rows
    }

    pub fn literal(&self) -> Option<&str> {
        self.selection.literal()
    }

    fn row_heights(&self) -> Vec<u16> {
        vec![1; self.selection.row_count(&self.input)]
    }

    fn apply(&mut self, transition: Transition, now: Instant) {
        self.highlight
            .highlight(transition.index, transition.animate, now);
    }

    /// The input changed: refresh the web slot and emit the new query.
    fn query_edited(&mut self, now: Instant) -> KeyAction {
        let rows = self.selection.row_count(&self.input);
        let rebuilt = rows != self.highlight.row_count();
        if rebuilt {
            self.highlight.rebuild(self.row_heights());
        }
        if let Some(transition) = self.selection.reclamp(&self.input) {
            self.apply(transition, now);
        } else if rebuilt {
            self.highlight
                .highlight(self.selection.selected(), false, now);
        }
        KeyAction::Query(self.input.clone())
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> KeyAction {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        match key.code {
            KeyCode::Esc => self.cancel(),
            KeyCode::Char('c') if ctrl => self.cancel(),
            KeyCode::Enter => {
                if let Some(request) = self.commit() {
                    return KeyAction::Launch(request);
                }
            }
            KeyCode::Up | KeyCode::BackTab => self.select_previous(now),
            KeyCode::Char('p' | 'k') if ctrl => self.select_previous(now),
            KeyCode::Down | KeyCode::Tab => self.select_next(now),
            KeyCode::Char('n' | 'j') if ctrl => self.select_next(now),
            KeyCode::Left => self.move_cursor_left(),
            KeyCode::Right => self.move_cursor_right(),
            KeyCode::Home => self.cursor_position = 0,
            KeyCode::Char('a') if ctrl => self.cursor_position = 0,
            KeyCode::End => self.cursor_position = self.input.chars().count(),
            KeyCode::Char('e') if ctrl => self.cursor_position = self.input.chars().count(),
            KeyCode::Char('u') if ctrl => {
                if self.clear_input() {
                    return self.query_edited(now);
                }
            }
            KeyCode::Backspace => {
                if self.delete_char() {
                    return self.query_edited(now);
                }
            }
            KeyCode::Delete => {
                if self.delete_char_forward() {
                    return self.query_edited(now);
                }
            }
            KeyCode::Char(c) if !ctrl && !alt => {
                self.enter_char(c);
                return self.query_edited(now);
            }
            _ => {}
        }
        KeyAction::None
    }
}
