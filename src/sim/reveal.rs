//! Stage three: find the hidden prizes in a grid of covered cells

use std::collections::BTreeSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::GameEvent;
use crate::config::RevealConfig;

/// One covered cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealCell {
    pub index: usize,
    pub revealed: bool,
    pub is_prize: bool,
}

/// Result of clicking a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    /// Already revealed or out of range
    Ignored,
    /// Uncovered an empty cell
    Blank,
    /// Uncovered a prize
    Prize { found: usize },
    /// Uncovered the last prize
    Complete,
}

/// Reveal grid state. Prize positions are fixed for the lifetime of a build.
#[derive(Debug, Clone)]
pub struct RevealGrid {
    columns: usize,
    rows: usize,
    prize_count: usize,
    cells: Vec<RevealCell>,
    prizes: BTreeSet<usize>,
    found: usize,
    events: Vec<GameEvent>,
}

impl RevealGrid {
    /// Create and build a grid
    pub fn new<R: Rng + ?Sized>(config: &RevealConfig, rng: &mut R) -> Self {
        let mut grid = Self {
            columns: config.columns,
            rows: config.rows,
            prize_count: config.prize_count.min(config.cell_count()),
            cells: Vec::new(),
            prizes: BTreeSet::new(),
            found: 0,
            events: Vec::new(),
        };
        grid.build(rng);
        grid
    }

    /// Cover every cell and pick a fresh prize set
    pub fn build<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let total = self.columns * self.rows;
        self.prizes = rand::seq::index::sample(rng, total, self.prize_count)
            .into_iter()
            .collect();
        self.found = 0;
        self.cells = (0..total)
            .map(|index| RevealCell {
                index,
                revealed: false,
                is_prize: self.prizes.contains(&index),
            })
            .collect();
        log::debug!("Reveal grid built, prizes at {:?}", self.prizes);
    }

    /// Uncover a cell. Revealing a cell twice does nothing.
    pub fn reveal(&mut self, index: usize) -> RevealOutcome {
        let Some(cell) = self.cells.get_mut(index) else {
            return RevealOutcome::Ignored;
        };
        if cell.revealed {
            return RevealOutcome::Ignored;
        }
        cell.revealed = true;
        let prize = cell.is_prize;
        self.events.push(GameEvent::CellRevealed { index, prize });

        if !prize {
            return RevealOutcome::Blank;
        }
        self.found += 1;
        if self.found == self.prize_count {
            self.events.push(GameEvent::AllPrizesFound);
            log::info!("All {} prizes found", self.prize_count);
            RevealOutcome::Complete
        } else {
            RevealOutcome::Prize { found: self.found }
        }
    }

    pub fn is_complete(&self) -> bool {
        self.found == self.prize_count
    }

    pub fn found(&self) -> usize {
        self.found
    }

    pub fn prize_count(&self) -> usize {
        self.prize_count
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cells(&self) -> &[RevealCell] {
        &self.cells
    }

    pub fn prizes(&self) -> &BTreeSet<usize> {
        &self.prizes
    }

    pub fn score_text(&self) -> String {
        format!("{} / {}", self.found, self.prize_count)
    }

    pub(crate) fn drain_events(&mut self) -> std::vec::Drain<'_, GameEvent> {
        self.events.drain(..)
    }
}
