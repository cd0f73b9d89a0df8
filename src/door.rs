//! Двери и связность комнат
//!
//! Двери создаются в два этапа. Сначала для каждой комнаты открываются проёмы,
//! и каждая дверь существует только как черновик ([`DoorDraft`]) с индексом.
//! После прокладки и чистки коридоров черновики сводятся: дубликаты убираются,
//! и только тогда выдаются окончательные идентификаторы ([`Door`]).

use crate::cell::{Cell, CellFlags, Direction};
use crate::deadend::collapse;
use crate::grid::Grid;
use crate::rng::DungeonRng;
use crate::room::Room;
use serde::Serialize;

/// Окончательная дверь
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Door {
    pub id: u32,
    pub row: usize,
    pub col: usize,
    /// Стена комнаты `in_id`, в которой прорублена дверь
    pub direction: Direction,
    /// Комната, открывшая дверь
    pub in_id: u32,
    /// Комната по ту сторону стены, если дверь ведёт не в коридор
    pub out_id: Option<u32>,
    /// Коридор, на который открывается дверь
    pub corridor: Option<u32>,
}

/// Кандидат на проём в стене комнаты
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Sill {
    sill_r: usize,
    sill_c: usize,
    dir: Direction,
    door_r: usize,
    door_c: usize,
    out_id: Option<u32>,
}

#[derive(Debug, Clone)]
struct DoorDraft {
    row: usize,
    col: usize,
    dir: Direction,
    in_id: u32,
    out_id: Option<u32>,
    corridor: Option<u32>,
}

impl DoorDraft {
    /// Комната по другую сторону двери относительно `room`
    fn other_room(&self, room: u32) -> Option<u32> {
        if self.in_id == room {
            self.out_id
        } else {
            Some(self.in_id)
        }
    }
}

/// Черновики дверей и их привязка к стенам комнат
#[derive(Debug, Clone, Default)]
pub struct DoorBuilder {
    drafts: Vec<DoorDraft>,
    /// Индексы черновиков по стенам каждой комнаты (порядок `Direction::ALL`)
    walls: Vec<[Vec<usize>; 4]>,
}

impl DoorBuilder {
    #[must_use]
    pub fn draft_count(&self) -> usize {
        self.drafts.len()
    }

    fn register(&mut self, room: u32, dir: Direction, draft: usize) {
        let list = &mut self.walls[room as usize][dir.index()];
        if !list.contains(&draft) {
            list.push(draft);
        }
    }
}

/// Открывает проёмы во всех комнатах по возрастанию идентификатора
pub fn open_rooms(grid: &mut Grid, rng: &mut DungeonRng, rooms: &mut [Room]) -> DoorBuilder {
    let mut builder = DoorBuilder {
        drafts: Vec::new(),
        walls: vec![Default::default(); rooms.len()],
    };
    for id in 0..rooms.len() {
        open_room(grid, rng, rooms, id, &mut builder);
    }
    log::debug!("opened {} doors", builder.drafts.len());
    builder
}

fn open_room(
    grid: &mut Grid,
    rng: &mut DungeonRng,
    rooms: &mut [Room],
    id: usize,
    builder: &mut DoorBuilder,
) {
    let mut list = door_sills(grid, rng, &rooms[id]);
    if list.is_empty() {
        return;
    }
    let n_opens = alloc_opens(rng, &rooms[id]);
    let room_id = rooms[id].id;

    for _ in 0..n_opens {
        let Some(k) = rng.take_index(list.len()) else {
            break;
        };
        let sill = list.remove(k);
        if grid.cell(sill.door_r, sill.door_c).contains(CellFlags::DOOR) {
            continue;
        }

        if let Some(out_id) = sill.out_id {
            // Две комнаты соединяются не больше чем одной общей дверью
            if rooms[id].connect.contains(&out_id) {
                continue;
            }
            rooms[id].connect_to(out_id);
            rooms[out_id as usize].connect_to(room_id);
            grid.cell_mut(sill.door_r, sill.door_c).insert(CellFlags::BETWEEN);
        }

        let draft = builder.drafts.len();
        builder.drafts.push(DoorDraft {
            row: sill.door_r,
            col: sill.door_c,
            dir: sill.dir,
            in_id: room_id,
            out_id: sill.out_id,
            corridor: None,
        });

        // Порог, дверь и клетка за ней становятся входом
        for x in 0..3 {
            let r = (sill.sill_r as isize + sill.dir.di() * x) as usize;
            let c = (sill.sill_c as isize + sill.dir.dj() * x) as usize;
            let cell = grid.cell_mut(r, c);
            cell.remove(CellFlags::PERIMETER);
            cell.insert(CellFlags::ENTRANCE);
        }
        let door_cell = grid.cell_mut(sill.door_r, sill.door_c);
        door_cell.insert(CellFlags::DOOR);

        match sill.out_id {
            Some(out_id) => builder.register(out_id, sill.dir.opposite(), draft),
            // Коридор будет прорублен от этой двери
            None => door_cell.insert(CellFlags::CORRIDOR),
        }
        builder.register(room_id, sill.dir, draft);
    }
}

/// Количество проёмов растёт с площадью комнаты
fn alloc_opens(rng: &mut DungeonRng, room: &Room) -> usize {
    let room_h = (room.south - room.north) / 2 + 1;
    let room_w = (room.east - room.west) / 2 + 1;
    let flumph = ((room_w * room_h) as f64).sqrt().floor() as i64;
    (flumph + rng.next_int(0, flumph)) as usize
}

/// Перечисляет подходящие пороги вдоль четырёх стен и перемешивает их
fn door_sills(grid: &Grid, rng: &mut DungeonRng, room: &Room) -> Vec<Sill> {
    let mut list = Vec::new();

    if room.north >= 3 {
        for c in (room.west..=room.east).step_by(2) {
            list.extend(check_sill(grid, room, room.north, c, Direction::North));
        }
    }
    if room.south + 3 <= grid.n_rows {
        for c in (room.west..=room.east).step_by(2) {
            list.extend(check_sill(grid, room, room.south, c, Direction::South));
        }
    }
    if room.west >= 3 {
        for r in (room.north..=room.south).step_by(2) {
            list.extend(check_sill(grid, room, r, room.west, Direction::West));
        }
    }
    if room.east + 3 <= grid.n_cols {
        for r in (room.north..=room.south).step_by(2) {
            list.extend(check_sill(grid, room, r, room.east, Direction::East));
        }
    }
    rng.shuffle(list)
}

fn check_sill(grid: &Grid, room: &Room, sill_r: usize, sill_c: usize, dir: Direction) -> Option<Sill> {
    let (door_r, door_c) = grid.offset(sill_r, sill_c, dir.di(), dir.dj())?;
    let door_cell = grid.cell(door_r, door_c);
    if !door_cell.contains(CellFlags::PERIMETER) || door_cell.intersects(CellFlags::BLOCK_DOOR) {
        return None;
    }

    let (out_r, out_c) = grid.offset(door_r, door_c, dir.di(), dir.dj())?;
    let out_cell = grid.cell(out_r, out_c);
    if out_cell.contains(CellFlags::BLOCKED) {
        return None;
    }

    let out_id = out_cell.room_id();
    if out_id == Some(room.id) {
        return None;
    }

    Some(Sill {
        sill_r,
        sill_c,
        dir,
        door_r,
        door_c,
        out_id,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fixed {
    Kept,
    Demoted,
}

/// Сводит черновики в окончательные двери.
///
/// 1. Двери, клетки которых больше не проходимы (схлопнуты вместе с тупиком), отбрасываются.
/// 2. На одной стене комнаты эквивалентные двери (в ту же комнату или в тот же коридор)
///    оставляются не более `max_door` штук (минимум одна); лишние снова становятся периметром.
///    С `collapse_stubs` обрывок коридора за убранной дверью схлопывается как тупик.
/// 3. Оставшимся дверям выдаются идентификаторы, а комнаты получают списки дверей по стенам.
pub fn finalize_doors(
    builder: DoorBuilder,
    grid: &mut Grid,
    rooms: &mut [Room],
    max_door: usize,
    collapse_stubs: bool,
) -> Vec<Door> {
    let DoorBuilder { mut drafts, mut walls } = builder;
    let allowed = max_door.max(1);
    let mut fixed: Vec<Option<Fixed>> = vec![None; drafts.len()];
    let mut at_cell = grid.mark_layer();
    let mut demoted = 0usize;
    let mut stub_cells = 0usize;

    for room in rooms.iter() {
        let room_id = room.id;
        for dir in Direction::ALL {
            let candidates = std::mem::take(&mut walls[room_id as usize][dir.index()]);
            let mut shiny: Vec<usize> = Vec::new();

            for d in candidates {
                let (row, col) = (drafts[d].row, drafts[d].col);
                let cell = grid.cell(row, col);
                if cell.contains(CellFlags::CORRIDOR) {
                    drafts[d].corridor = cell.corridor_id();
                }
                if !cell.intersects(CellFlags::OPENSPACE) {
                    continue;
                }

                match fixed[d] {
                    Some(Fixed::Kept) => {
                        if !shiny.contains(&d) {
                            shiny.push(d);
                        }
                        continue;
                    }
                    Some(Fixed::Demoted) => continue,
                    None => {}
                }

                // Две двери на одной клетке: вторая считается той же дверью
                if !at_cell.mark(row, col) {
                    fixed[d] = Some(Fixed::Demoted);
                    continue;
                }

                let other = drafts[d].other_room(room_id);
                let corridor = drafts[d].corridor;
                let equivalent = shiny
                    .iter()
                    .filter(|&&s| {
                        let same_room = other.is_some() && drafts[s].other_room(room_id) == other;
                        let same_corridor = corridor.is_some() && drafts[s].corridor == corridor;
                        same_room || same_corridor
                    })
                    .count();
                if equivalent >= allowed {
                    fixed[d] = Some(Fixed::Demoted);
                    *grid.cell_mut(row, col) = Cell::with_flags(CellFlags::PERIMETER);
                    demoted += 1;
                    if collapse_stubs
                        && let Some((r, c)) = grid.offset(row, col, dir.di(), dir.dj())
                    {
                        stub_cells += collapse(grid, r, c);
                    }
                    continue;
                }

                if let Some(other) = other {
                    let list = &mut walls[other as usize][dir.opposite().index()];
                    if !list.contains(&d) {
                        list.push(d);
                    }
                }
                shiny.push(d);
                fixed[d] = Some(Fixed::Kept);
            }
            walls[room_id as usize][dir.index()] = shiny;
        }
    }

    // Идентификаторы выдаются в порядке комнат и стен.
    // Дверь, стёртую вместе с обрывком, пропускаем.
    let mut ids: Vec<Option<u32>> = vec![None; drafts.len()];
    let mut doors = Vec::new();
    for room in rooms.iter_mut() {
        for dir in Direction::ALL {
            let list = room.doors.get_mut(dir);
            list.clear();
            for &d in &walls[room.id as usize][dir.index()] {
                let draft = &drafts[d];
                if !grid.cell(draft.row, draft.col).intersects(CellFlags::OPENSPACE) {
                    continue;
                }
                let id = *ids[d].get_or_insert_with(|| {
                    let id = doors.len() as u32;
                    doors.push(Door {
                        id,
                        row: draft.row,
                        col: draft.col,
                        direction: draft.dir,
                        in_id: draft.in_id,
                        out_id: draft.out_id,
                        corridor: draft.corridor,
                    });
                    id
                });
                list.push(id);
            }
        }
    }

    log::debug!(
        "kept {} of {} doors, demoted {demoted} duplicates, collapsed {stub_cells} stub cells",
        doors.len(),
        drafts.len()
    );
    doors
}
