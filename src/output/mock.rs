//! In-memory [`AudioOutput`] that records every command it receives.

use std::collections::VecDeque;

use crate::error::OutputError;

use super::types::{AudioOutput, OutputEvent};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Cmd {
    Load(String),
    Play,
    Pause,
    Seek(f64),
    Volume(f32),
    Unload,
}

#[derive(Debug, Default)]
pub(crate) struct MockOutput {
    pub commands: Vec<Cmd>,
    pub clock: f64,
    pub length: Option<f64>,
    pub fail_load: Option<OutputError>,
    pub fail_play: Option<OutputError>,
    pub pending: VecDeque<OutputEvent>,
}

impl MockOutput {
    pub fn count(&self, cmd: &Cmd) -> usize {
        self.commands.iter().filter(|c| *c == cmd).count()
    }

    pub fn last_volume(&self) -> Option<f32> {
        self.commands.iter().rev().find_map(|c| match c {
            Cmd::Volume(v) => Some(*v),
            _ => None,
        })
    }
}

impl AudioOutput for MockOutput {
    fn load(&mut self, locator: &str) -> Result<(), OutputError> {
        self.commands.push(Cmd::Load(locator.to_string()));
        self.clock = 0.0;
        match &self.fail_load {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    fn play(&mut self) -> Result<(), OutputError> {
        self.commands.push(Cmd::Play);
        match &self.fail_play {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    fn pause(&mut self) {
        self.commands.push(Cmd::Pause);
    }

    fn seek(&mut self, seconds: f64) -> Result<(), OutputError> {
        self.commands.push(Cmd::Seek(seconds));
        self.clock = seconds;
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        self.commands.push(Cmd::Volume(volume));
    }

    fn unload(&mut self) {
        self.commands.push(Cmd::Unload);
        self.clock = 0.0;
        self.length = None;
    }

    fn current_time(&self) -> f64 {
        self.clock
    }

    fn duration(&self) -> Option<f64> {
        self.length
    }

    fn poll_event(&mut self) -> Option<OutputEvent> {
        self.pending.pop_front()
    }
}
