use std::time::Duration;

use tracing::{debug, info};
use uuid::Uuid;

use crate::config::SimulationTiming;
use crate::models::{Participant, ScriptLine, TranscriptEntry};
use crate::scheduler::{as_millis, Timers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerPhase {
    Idle,
    /// Revealing the current line one character at a time
    Typing,
    /// Line committed, waiting before the next one
    Paused,
    /// Moving to the next line; only observed inside a tick
    Advancing,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlayerTimer {
    Reveal,
    Advance,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
    LineStarted { index: usize, speaker_id: String },
    CharRevealed { line: usize, ch: char },
    EntryCommitted(TranscriptEntry),
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerConfig {
    pub typing_interval: Duration,
    pub line_pause: Duration,
}

impl PlayerConfig {
    pub fn from_timing(timing: &SimulationTiming) -> Self {
        Self {
            typing_interval: timing.typing_interval(),
            line_pause: timing.line_pause(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self::from_timing(&SimulationTiming::default())
    }
}

/// Typewriter playback of a fixed conference script.
///
/// One-shot: once `Done` it never restarts. Re-mounting the conference view
/// means building a new player.
pub struct ConversationPlayer {
    script: Vec<ScriptLine>,
    roster: Vec<Participant>,
    config: PlayerConfig,
    phase: PlayerPhase,
    line_index: usize,
    typed: String,
    transcript: Vec<TranscriptEntry>,
    timers: Timers<PlayerTimer>,
}

impl ConversationPlayer {
    pub fn new(script: Vec<ScriptLine>, roster: Vec<Participant>, config: PlayerConfig) -> Self {
        Self {
            script,
            roster,
            config,
            phase: PlayerPhase::Idle,
            line_index: 0,
            typed: String::new(),
            transcript: Vec::new(),
            timers: Timers::new(),
        }
    }

    pub fn phase(&self) -> PlayerPhase {
        self.phase
    }

    pub fn conversation_ended(&self) -> bool {
        self.phase == PlayerPhase::Done
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn roster(&self) -> &[Participant] {
        &self.roster
    }

    /// The line being typed or last typed
    pub fn current_line(&self) -> Option<&ScriptLine> {
        match self.phase {
            PlayerPhase::Idle | PlayerPhase::Done => None,
            _ => self.script.get(self.line_index),
        }
    }

    /// Revealed part of the current line; always a prefix of its text
    pub fn typed_text(&self) -> &str {
        &self.typed
    }

    /// Roster index of the speaker whose line is being typed
    pub fn speaking_index(&self) -> Option<usize> {
        if self.phase != PlayerPhase::Typing {
            return None;
        }
        let line = self.script.get(self.line_index)?;
        self.roster.iter().position(|p| p.id == line.speaker_id)
    }

    /// Begin playback. Ignored unless idle.
    pub fn start(&mut self, now: Duration) -> Vec<PlayerEvent> {
        let mut events = Vec::new();
        if self.phase != PlayerPhase::Idle {
            return events;
        }

        info!(lines = self.script.len(), "conference playback started");
        if self.script.is_empty() {
            self.finish(&mut events);
        } else {
            self.begin_line(0, now, &mut events);
        }
        events
    }

    pub fn tick(&mut self, now: Duration) -> Vec<PlayerEvent> {
        let mut events = Vec::new();

        while let Some((at, timer)) = self.timers.pop_due(now) {
            match timer {
                PlayerTimer::Reveal => self.reveal_next(at, &mut events),
                PlayerTimer::Advance => {
                    self.phase = PlayerPhase::Advancing;
                    let next = self.line_index + 1;
                    self.begin_line(next, at, &mut events);
                }
            }
        }

        events
    }

    fn begin_line(&mut self, index: usize, at: Duration, events: &mut Vec<PlayerEvent>) {
        self.line_index = index;
        self.typed.clear();
        self.phase = PlayerPhase::Typing;

        let line = &self.script[index];
        debug!(index, speaker = %line.speaker_id, "line started");
        events.push(PlayerEvent::LineStarted {
            index,
            speaker_id: line.speaker_id.clone(),
        });

        if line.text.is_empty() {
            self.commit(at, events);
        } else {
            self.timers
                .schedule(PlayerTimer::Reveal, at + self.config.typing_interval);
        }
    }

    fn reveal_next(&mut self, at: Duration, events: &mut Vec<PlayerEvent>) {
        let text = &self.script[self.line_index].text;
        let Some(ch) = text[self.typed.len()..].chars().next() else {
            return;
        };
        self.typed.push(ch);
        events.push(PlayerEvent::CharRevealed {
            line: self.line_index,
            ch,
        });

        if self.typed.len() == text.len() {
            self.commit(at, events);
        } else {
            self.timers
                .schedule(PlayerTimer::Reveal, at + self.config.typing_interval);
        }
    }

    fn commit(&mut self, at: Duration, events: &mut Vec<PlayerEvent>) {
        let line = &self.script[self.line_index];
        let entry = TranscriptEntry {
            id: Uuid::new_v4().to_string(),
            speaker: line.speaker_name.clone(),
            content: line.text.clone(),
            completed_at: as_millis(at),
        };
        self.transcript.push(entry.clone());
        events.push(PlayerEvent::EntryCommitted(entry));

        if self.line_index + 1 >= self.script.len() {
            self.finish(events);
        } else {
            self.phase = PlayerPhase::Paused;
            self.timers
                .schedule(PlayerTimer::Advance, at + self.config.line_pause);
        }
    }

    fn finish(&mut self, events: &mut Vec<PlayerEvent>) {
        self.phase = PlayerPhase::Done;
        self.timers.clear();
        info!(entries = self.transcript.len(), "conference playback ended");
        events.push(PlayerEvent::Ended);
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Stop pending reveals; the transcript so far stays readable
    pub fn teardown(&mut self) {
        self.timers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn player(lines: &[(&str, &str)]) -> ConversationPlayer {
        let script = lines
            .iter()
            .map(|(speaker, text)| ScriptLine::new(*speaker, format!("Pembicara {}", speaker), *text))
            .collect();
        let roster = vec![
            Participant::new("A", "Pembicara A", "Manajer"),
            Participant::new("B", "Pembicara B", "Analis"),
        ];
        let config = PlayerConfig {
            typing_interval: ms(15),
            line_pause: ms(1_000),
        };
        ConversationPlayer::new(script, roster, config)
    }

    fn contents(player: &ConversationPlayer) -> Vec<&str> {
        player.transcript().iter().map(|e| e.content.as_str()).collect()
    }

    #[test]
    fn test_two_line_script_timing() {
        let mut p = player(&[("A", "hi"), ("B", "hello")]);
        p.start(ms(0));

        p.tick(ms(30));
        assert_eq!(contents(&p), vec!["hi"]);
        assert_eq!(p.phase(), PlayerPhase::Paused);

        p.tick(ms(1_104));
        assert!(!p.conversation_ended());
        assert_eq!(p.typed_text(), "hell");

        let events = p.tick(ms(1_105));
        assert_eq!(events.last(), Some(&PlayerEvent::Ended));
        assert_eq!(contents(&p), vec!["hi", "hello"]);
        assert!(p.conversation_ended());
        assert_eq!(p.transcript()[1].completed_at, 1_105);
        assert_eq!(p.next_deadline(), None);
    }

    #[test]
    fn test_n_lines_produce_n_entries_in_order() {
        for n in 1..=4 {
            let lines: Vec<(&str, String)> = (0..n).map(|i| ("A", format!("baris {}", i))).collect();
            let refs: Vec<(&str, &str)> = lines.iter().map(|(s, t)| (*s, t.as_str())).collect();
            let mut p = player(&refs);
            p.start(ms(0));

            let mut ended_after = None;
            let mut now = 0;
            while !p.conversation_ended() {
                now += 15;
                for event in p.tick(ms(now)) {
                    if event == PlayerEvent::Ended {
                        ended_after = Some(p.transcript().len());
                    }
                }
            }

            let expected: Vec<&str> = refs.iter().map(|(_, t)| *t).collect();
            assert_eq!(contents(&p), expected);
            assert_eq!(ended_after, Some(n));
        }
    }

    #[test]
    fn test_typed_text_is_growing_prefix() {
        let mut p = player(&[("A", "Selamat pagi, tim")]);
        p.start(ms(0));
        let target = "Selamat pagi, tim";
        let mut last_len = 0;
        for step in 1..=17 {
            p.tick(ms(step * 15));
            if p.conversation_ended() {
                break;
            }
            assert!(target.starts_with(p.typed_text()));
            assert!(p.typed_text().len() >= last_len);
            last_len = p.typed_text().len();
        }
        assert!(p.conversation_ended());
    }

    #[test]
    fn test_multibyte_characters_reveal_whole() {
        let mut p = player(&[("A", "héé")]);
        p.start(ms(0));
        let events = p.tick(ms(30));
        let chars: Vec<char> = events
            .iter()
            .filter_map(|e| match e {
                PlayerEvent::CharRevealed { ch, .. } => Some(*ch),
                _ => None,
            })
            .collect();
        assert_eq!(chars, vec!['h', 'é']);
        assert_eq!(p.typed_text(), "hé");
        p.tick(ms(45));
        assert_eq!(contents(&p), vec!["héé"]);
    }

    #[test]
    fn test_speaking_index_follows_roster() {
        let mut p = player(&[("B", "halo"), ("X", "tamu")]);
        assert_eq!(p.speaking_index(), None);
        p.start(ms(0));
        assert_eq!(p.speaking_index(), Some(1));

        p.tick(ms(60));
        assert_eq!(p.phase(), PlayerPhase::Paused);
        assert_eq!(p.speaking_index(), None);

        p.tick(ms(1_060));
        assert_eq!(p.phase(), PlayerPhase::Typing);
        // Speaker missing from the roster
        assert_eq!(p.speaking_index(), None);
    }

    #[test]
    fn test_empty_script_ends_immediately() {
        let mut p = player(&[]);
        assert_eq!(p.start(ms(0)), vec![PlayerEvent::Ended]);
        assert!(p.conversation_ended());
        assert!(p.transcript().is_empty());
    }

    #[test]
    fn test_empty_line_commits_immediately() {
        let mut p = player(&[("A", ""), ("B", "ok")]);
        let events = p.start(ms(0));
        assert!(matches!(events.last(), Some(PlayerEvent::EntryCommitted(e)) if e.content.is_empty()));
        assert_eq!(p.phase(), PlayerPhase::Paused);
        p.tick(ms(1_030));
        assert_eq!(contents(&p), vec!["", "ok"]);
        assert!(p.conversation_ended());
    }

    #[test]
    fn test_start_is_one_shot() {
        let mut p = player(&[("A", "hi")]);
        assert!(!p.start(ms(0)).is_empty());
        assert!(p.start(ms(5)).is_empty());
        p.tick(ms(30));
        assert!(p.conversation_ended());
        assert!(p.start(ms(100)).is_empty());
        assert_eq!(p.transcript().len(), 1);
    }

    #[test]
    fn test_teardown_stops_playback() {
        let mut p = player(&[("A", "hi"), ("B", "hello")]);
        p.start(ms(0));
        p.tick(ms(15));
        p.teardown();
        assert!(p.tick(ms(10_000)).is_empty());
        assert_eq!(p.typed_text(), "h");
        assert!(!p.conversation_ended());
    }
}
