//! Внешняя проекция готового подземелья
//!
//! Рендер видит только [`DungeonMap`]: для каждой непустой клетки,
//! кроме голого периметра комнат, хранится запись с идентификаторами комнаты,
//! коридора, двери и лестницы.

use crate::cell::CellFlags;
use crate::door::Door;
use crate::grid::Grid;
use crate::stairs::{Stair, StairKey};
use serde::Serialize;
use std::collections::HashMap;

/// Запись карты для одной клетки
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellInfo {
    pub row: usize,
    pub col: usize,
    pub room: Option<u32>,
    pub corridor: Option<u32>,
    pub door: Option<u32>,
    pub stair: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stair_key: Option<StairKey>,
}

impl CellInfo {
    /// Проходима ли клетка: комната, коридор или дверь
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.room.is_some() || self.corridor.is_some() || self.door.is_some()
    }
}

/// Разреженная карта клеток размером `(n_rows + 1) × (n_cols + 1)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DungeonMap {
    pub n_rows: usize,
    pub n_cols: usize,
    #[serde(rename = "cells")]
    entries: Vec<CellInfo>,
    #[serde(skip)]
    index: Vec<Option<usize>>,
}

impl DungeonMap {
    /// Собирает карту по финальной сетке
    #[must_use]
    pub fn build(grid: &Grid, doors: &[Door], stairs: &[Stair]) -> Self {
        let door_at: HashMap<(usize, usize), u32> =
            doors.iter().map(|d| ((d.row, d.col), d.id)).collect();
        let stair_at: HashMap<(usize, usize), &Stair> =
            stairs.iter().map(|s| ((s.row, s.col), s)).collect();

        let mut entries = Vec::new();
        let mut index = vec![None; (grid.n_rows + 1) * (grid.n_cols + 1)];

        for (row, col) in grid.positions() {
            let cell = grid.cell(row, col);
            if cell.is_empty() || cell.flags() == CellFlags::PERIMETER {
                continue;
            }
            let stair = stair_at.get(&(row, col));
            let info = CellInfo {
                row,
                col,
                room: cell.room_id(),
                corridor: cell.corridor_id(),
                door: door_at.get(&(row, col)).copied(),
                stair: stair.map(|s| s.id),
                stair_key: stair.map(|s| s.key),
            };
            if !info.is_open() && info.stair.is_none() {
                continue;
            }
            index[row * (grid.n_cols + 1) + col] = Some(entries.len());
            entries.push(info);
        }

        Self {
            n_rows: grid.n_rows,
            n_cols: grid.n_cols,
            entries,
            index,
        }
    }

    /// Запись клетки; `None` для пустых клеток и координат за пределами карты
    #[must_use]
    pub fn get(&self, row: isize, col: isize) -> Option<&CellInfo> {
        if row < 0 || col < 0 || row as usize > self.n_rows || col as usize > self.n_cols {
            return None;
        }
        let slot = self.index[row as usize * (self.n_cols + 1) + col as usize]?;
        self.entries.get(slot)
    }

    /// Все записи в порядке развёртки
    pub fn cells(&self) -> impl Iterator<Item = &CellInfo> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
