//! Коридоры: прокладка, разметка и отбраковка
//!
//! Прокладка идёт рандомизированным обходом в глубину по центрам клеток со
//! случайным порядком направлений. Рекурсия заменена явным стеком кадров,
//! порядок перебора направлений сохраняется.

use crate::cell::{CellFlags, Direction};
use crate::door::Door;
use crate::grid::Grid;
use crate::rng::DungeonRng;
use crate::stairs::Stair;
use serde::Serialize;
use std::collections::HashMap;

/// Связная компонента коридорных клеток
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Corridor {
    /// Идентификатор (с единицы)
    pub id: u32,
    pub cells: Vec<(usize, usize)>,
    /// Двери на клетках коридора
    pub doors: Vec<u32>,
    /// Комнаты, в которые ведут эти двери
    pub rooms: Vec<u32>,
    pub stairs: Vec<u32>,
}

/// Кадр обхода: текущая клетка в половинных координатах и очередь направлений
struct TunnelFrame {
    i: isize,
    j: isize,
    dirs: Vec<Direction>,
    next: usize,
}

/// Прокладывает коридоры от каждой внутренней клетки, ещё не ставшей коридором
pub fn carve_corridors(grid: &mut Grid, rng: &mut DungeonRng, corridor_layout: u32) {
    for i in 1..grid.n_i {
        let r = i * 2 + 1;
        for j in 1..grid.n_j {
            let c = j * 2 + 1;
            let cell = grid.cell(r, c);
            if cell.intersects(CellFlags::CORRIDOR | CellFlags::BLOCKED) {
                continue;
            }
            tunnel(grid, rng, corridor_layout, i as isize, j as isize);
        }
    }
}

fn tunnel(grid: &mut Grid, rng: &mut DungeonRng, layout: u32, i: isize, j: isize) {
    let mut stack = vec![TunnelFrame {
        i,
        j,
        dirs: tunnel_dirs(rng, layout, None),
        next: 0,
    }];

    while let Some(frame) = stack.last_mut() {
        let Some(&dir) = frame.dirs.get(frame.next) else {
            stack.pop();
            continue;
        };
        frame.next += 1;
        let (i, j) = (frame.i, frame.j);

        if open_tunnel(grid, i, j, dir) {
            stack.push(TunnelFrame {
                i: i + dir.di(),
                j: j + dir.dj(),
                dirs: tunnel_dirs(rng, layout, Some(dir)),
                next: 0,
            });
        }
    }
}

/// Случайный порядок направлений; с вероятностью `layout`% первым идёт прежнее направление
fn tunnel_dirs(rng: &mut DungeonRng, layout: u32, last_dir: Option<Direction>) -> Vec<Direction> {
    let mut dirs = rng.shuffle(Direction::ALL.to_vec());
    if let Some(last) = last_dir
        && layout > 0
        && rng.next_int(0, 100) < i64::from(layout)
    {
        dirs.insert(0, last);
    }
    dirs
}

fn open_tunnel(grid: &mut Grid, i: isize, j: isize, dir: Direction) -> bool {
    let this_r = i * 2 + 1;
    let this_c = j * 2 + 1;
    let next_r = (i + dir.di()) * 2 + 1;
    let next_c = (j + dir.dj()) * 2 + 1;
    let mid_r = (this_r + next_r) / 2;
    let mid_c = (this_c + next_c) / 2;

    if !sound_tunnel(grid, mid_r, mid_c, next_r, next_c) {
        return false;
    }
    delve_tunnel(grid, this_r, this_c, next_r, next_c);
    true
}

/// Коридор не заходит в заблокированные клетки, периметры комнат, комнаты и другие коридоры
fn sound_tunnel(grid: &Grid, mid_r: isize, mid_c: isize, next_r: isize, next_c: isize) -> bool {
    if !grid.contains(next_r, next_c) {
        return false;
    }
    [(mid_r, mid_c), (next_r, next_c)]
        .into_iter()
        .all(|(r, c)| !grid.flags_at(r, c).intersects(CellFlags::BLOCK_CORR))
}

fn delve_tunnel(grid: &mut Grid, this_r: isize, this_c: isize, next_r: isize, next_c: isize) {
    let (r1, r2) = (this_r.min(next_r) as usize, this_r.max(next_r) as usize);
    let (c1, c2) = (this_c.min(next_c) as usize, this_c.max(next_c) as usize);
    for r in r1..=r2 {
        for c in c1..=c2 {
            grid.cell_mut(r, c).carve();
        }
    }
}

/// Размечает связные компоненты коридоров.
///
/// Компонента, не касающаяся ни одной двери, стирается целиком:
/// до неё нельзя дойти ни из одной комнаты.
pub fn label_corridors(grid: &mut Grid) -> Vec<Corridor> {
    let mut corridors = Vec::new();
    let mut id = 1u32;
    let mut discarded = 0usize;

    for r in 0..=grid.n_rows {
        for c in 0..=grid.n_cols {
            let cell = grid.cell(r, c);
            if !cell.contains(CellFlags::CORRIDOR) || cell.owner().is_some() {
                continue;
            }
            let cells = flood_corridor(grid, r, c, id);
            if cells.is_empty() {
                continue;
            }

            let door_weight: usize = cells
                .iter()
                .map(|&(r, c)| {
                    let cell = grid.cell(r, c);
                    match (cell.contains(CellFlags::DOOR), cell.contains(CellFlags::BETWEEN)) {
                        (false, _) => 0,
                        (true, false) => 1,
                        (true, true) => 2,
                    }
                })
                .sum();

            if door_weight == 0 {
                for &(r, c) in &cells {
                    grid.cell_mut(r, c).clear();
                }
                discarded += 1;
            } else {
                corridors.push(Corridor {
                    id,
                    cells,
                    doors: Vec::new(),
                    rooms: Vec::new(),
                    stairs: Vec::new(),
                });
                id += 1;
            }
        }
    }

    log::debug!(
        "labeled {} corridors, discarded {discarded} without doors",
        corridors.len()
    );
    corridors
}

/// Заливка 4-связной компоненты; клетки получают метку `id`
fn flood_corridor(grid: &mut Grid, r: usize, c: usize, id: u32) -> Vec<(usize, usize)> {
    let mut cells = Vec::new();
    let mut seen = grid.mark_layer();
    let mut stack = vec![(r, c)];
    seen.mark(r, c);

    while let Some((r, c)) = stack.pop() {
        let cell = grid.cell(r, c);
        if cell.is_empty() {
            continue;
        }
        let passable = cell.contains(CellFlags::CORRIDOR)
            || (cell.contains(CellFlags::ENTRANCE) && !cell.contains(CellFlags::ROOM));
        if !passable || cell.owner().is_some() {
            continue;
        }

        grid.cell_mut(r, c).set_corridor(id);
        cells.push((r, c));

        for (dr, dc) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            if let Some((nr, nc)) = grid.offset(r, c, dr, dc)
                && seen.mark(nr, nc)
            {
                stack.push((nr, nc));
            }
        }
    }
    cells
}

/// Обновляет коридоры после чистки и собирает их двери, комнаты и лестницы.
///
/// Клетки, потерявшие метку коридора (схлопнутые тупики, разжалованные двери),
/// убираются из списка; коридоры без клеток удаляются. Идентификаторы не перенумеровываются.
pub fn derive_corridor_data(
    grid: &Grid,
    corridors: &mut Vec<Corridor>,
    doors: &[Door],
    stairs: &[Stair],
) {
    let door_at: HashMap<(usize, usize), &Door> = doors.iter().map(|d| ((d.row, d.col), d)).collect();
    let stair_at: HashMap<(usize, usize), u32> =
        stairs.iter().map(|s| ((s.row, s.col), s.id)).collect();

    for corridor in corridors.iter_mut() {
        let id = corridor.id;
        corridor
            .cells
            .retain(|&(r, c)| grid.cell(r, c).corridor_id() == Some(id));

        corridor.doors.clear();
        corridor.rooms.clear();
        corridor.stairs.clear();
        for pos in &corridor.cells {
            if let Some(door) = door_at.get(pos) {
                corridor.doors.push(door.id);
                for room in std::iter::once(door.in_id).chain(door.out_id) {
                    if !corridor.rooms.contains(&room) {
                        corridor.rooms.push(room);
                    }
                }
            }
            if let Some(&stair) = stair_at.get(pos) {
                corridor.stairs.push(stair);
            }
        }
    }
    corridors.retain(|corridor| !corridor.cells.is_empty());
}
