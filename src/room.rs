//! Расстановка комнат
//!
//! Комната занимает прямоугольник с нечётными границами. Вокруг неё ставится
//! однопиксельный `PERIMETER`, который не дают пересекать коридорам.

use crate::cell::{CellFlags, Direction};
use crate::config::{DungeonParams, RoomLayout, RoomStrategy};
use crate::grid::Grid;
use crate::rng::DungeonRng;
use serde::Serialize;

/// Предел количества комнат на случай неудачной конфигурации
pub const MAX_ROOMS: usize = 999;

/// Списки дверей комнаты по стенам
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoomDoors {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub north: Vec<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub south: Vec<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub west: Vec<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub east: Vec<u32>,
}

impl RoomDoors {
    #[must_use]
    pub fn get(&self, dir: Direction) -> &[u32] {
        match dir {
            Direction::North => &self.north,
            Direction::South => &self.south,
            Direction::West => &self.west,
            Direction::East => &self.east,
        }
    }

    pub fn get_mut(&mut self, dir: Direction) -> &mut Vec<u32> {
        match dir {
            Direction::North => &mut self.north,
            Direction::South => &mut self.south,
            Direction::West => &mut self.west,
            Direction::East => &mut self.east,
        }
    }

    /// Все двери комнаты в порядке север, юг, запад, восток
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        Direction::ALL
            .into_iter()
            .flat_map(|dir| self.get(dir).iter().copied())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        Direction::ALL.iter().all(|&dir| self.get(dir).is_empty())
    }
}

/// Комната подземелья
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Room {
    pub id: u32,
    pub north: usize,
    pub south: usize,
    pub west: usize,
    pub east: usize,
    pub height: usize,
    pub width: usize,
    pub area: usize,
    /// Комнаты, соединённые с этой напрямую (общая дверь без коридора)
    pub connect: Vec<u32>,
    pub doors: RoomDoors,
}

impl Room {
    /// Пересекаются ли прямоугольники двух комнат
    #[must_use]
    pub fn overlaps(&self, other: &Room) -> bool {
        self.north <= other.south
            && other.north <= self.south
            && self.west <= other.east
            && other.west <= self.east
    }

    #[must_use]
    pub fn contains(&self, r: usize, c: usize) -> bool {
        (self.north..=self.south).contains(&r) && (self.west..=self.east).contains(&c)
    }

    pub(crate) fn connect_to(&mut self, other: u32) -> bool {
        if self.connect.contains(&other) {
            false
        } else {
            self.connect.push(other);
            true
        }
    }
}

/// Заготовка комнаты в половинных координатах. Пустые поля выбираются случайно.
#[derive(Debug, Clone, Copy, Default)]
struct RoomProto {
    i: Option<usize>,
    j: Option<usize>,
    height: Option<usize>,
    width: Option<usize>,
}

/// Размеры комнат в половинных координатах
#[derive(Debug, Clone, Copy)]
struct RoomSizing {
    base: usize,
    radix: usize,
}

impl RoomSizing {
    fn new(params: &DungeonParams) -> Self {
        Self {
            base: (params.room_min + 1) / 2,
            radix: (params.room_max - params.room_min) / 2,
        }
    }
}

/// Расставляет комнаты выбранной стратегией
pub fn emplace_rooms(grid: &mut Grid, rng: &mut DungeonRng, params: &DungeonParams) -> Vec<Room> {
    let sizing = RoomSizing::new(params);
    let mut rooms = Vec::new();

    match params.room_layout {
        RoomLayout::Strategy(RoomStrategy::Packed) => pack_rooms(grid, rng, sizing, &mut rooms),
        RoomLayout::Strategy(RoomStrategy::Scattered) => {
            let dungeon_area = grid.n_cols * grid.n_rows;
            let room_area = params.room_max * params.room_max;
            scatter_rooms(grid, rng, sizing, dungeon_area / room_area, &mut rooms);
        }
        RoomLayout::Count(n) => scatter_rooms(grid, rng, sizing, n, &mut rooms),
    }

    log::debug!("placed {} rooms", rooms.len());
    rooms
}

/// Плотная упаковка: попытка комнаты в каждой свободной клетке
fn pack_rooms(grid: &mut Grid, rng: &mut DungeonRng, sizing: RoomSizing, rooms: &mut Vec<Room>) {
    for i in 0..grid.n_i {
        let r = i * 2 + 1;
        for j in 0..grid.n_j {
            let c = j * 2 + 1;
            if grid.cell(r, c).contains(CellFlags::ROOM) {
                continue;
            }
            // Клетки у края пропускаем с вероятностью 1/4
            if (i == 0 || j == 0) && rng.next_int(0, 3) == 0 {
                continue;
            }
            let proto = RoomProto {
                i: Some(i),
                j: Some(j),
                ..RoomProto::default()
            };
            emplace_room(grid, rng, sizing, proto, rooms);
        }
    }
}

fn scatter_rooms(
    grid: &mut Grid,
    rng: &mut DungeonRng,
    sizing: RoomSizing,
    n_rooms: usize,
    rooms: &mut Vec<Room>,
) {
    for _ in 0..n_rooms {
        emplace_room(grid, rng, sizing, RoomProto::default(), rooms);
    }
}

/// Выбирает размер и положение комнаты
fn set_room(grid: &Grid, rng: &mut DungeonRng, sizing: RoomSizing, proto: RoomProto) -> (usize, usize, usize, usize) {
    let RoomSizing { base, radix } = sizing;
    let radix = radix as i64;

    let height = proto.height.unwrap_or_else(|| {
        let r = match proto.i {
            Some(i) => (grid.n_i as i64 - base as i64 - i as i64).clamp(0, radix),
            None => radix,
        };
        rng.next_int(0, r) as usize + base
    });
    let width = proto.width.unwrap_or_else(|| {
        let r = match proto.j {
            Some(j) => (grid.n_j as i64 - base as i64 - j as i64).clamp(0, radix),
            None => radix,
        };
        rng.next_int(0, r) as usize + base
    });
    let i = proto
        .i
        .unwrap_or_else(|| rng.next_int(0, grid.n_i as i64 - height as i64).max(0) as usize);
    let j = proto
        .j
        .unwrap_or_else(|| rng.next_int(0, grid.n_j as i64 - width as i64).max(0) as usize);

    (i, j, height, width)
}

/// Проверяет прямоугольник на столкновения.
///
/// `None` — прямоугольник задевает заблокированную клетку, иначе список
/// комнат, с которыми он пересекается.
fn sound_room(grid: &Grid, r1: usize, c1: usize, r2: usize, c2: usize) -> Option<Vec<u32>> {
    let mut hit = Vec::new();
    for r in r1..=r2 {
        for c in c1..=c2 {
            let cell = grid.cell(r, c);
            if cell.contains(CellFlags::BLOCKED) {
                return None;
            }
            if let Some(id) = cell.room_id()
                && !hit.contains(&id)
            {
                hit.push(id);
            }
        }
    }
    Some(hit)
}

fn emplace_room(
    grid: &mut Grid,
    rng: &mut DungeonRng,
    sizing: RoomSizing,
    proto: RoomProto,
    rooms: &mut Vec<Room>,
) {
    if rooms.len() >= MAX_ROOMS {
        return;
    }

    let (i, j, height, width) = set_room(grid, rng, sizing, proto);
    if height == 0 || width == 0 {
        return;
    }

    // Границы комнаты
    let r1 = i * 2 + 1;
    let c1 = j * 2 + 1;
    let r2 = (i + height) * 2 - 1;
    let c2 = (j + width) * 2 - 1;

    if r2 > grid.max_row() || c2 > grid.max_col() {
        return;
    }

    match sound_room(grid, r1, c1, r2, c2) {
        Some(hit) if hit.is_empty() => {}
        _ => return,
    }

    let room_id = rooms.len() as u32;

    for r in r1..=r2 {
        for c in c1..=c2 {
            let cell = grid.cell_mut(r, c);
            if cell.contains(CellFlags::ENTRANCE) {
                cell.remove(CellFlags::ESPACE);
            } else if cell.contains(CellFlags::PERIMETER) {
                cell.remove(CellFlags::PERIMETER);
            }
            cell.set_room(room_id);
        }
    }

    let height = r2 - r1 + 1;
    let width = c2 - c1 + 1;
    rooms.push(Room {
        id: room_id,
        north: r1,
        south: r2,
        west: c1,
        east: c2,
        height,
        width,
        area: height * width,
        connect: Vec::new(),
        doors: RoomDoors::default(),
    });

    // Периметр отгораживает комнату от коридоров
    let keep = CellFlags::ROOM | CellFlags::ENTRANCE;
    for r in (r1 - 1)..=(r2 + 1) {
        for c in [c1 - 1, c2 + 1] {
            let cell = grid.cell_mut(r, c);
            if !cell.intersects(keep) {
                cell.insert(CellFlags::PERIMETER);
            }
        }
    }
    for c in (c1 - 1)..=(c2 + 1) {
        for r in [r1 - 1, r2 + 1] {
            let cell = grid.cell_mut(r, c);
            if !cell.intersects(keep) {
                cell.insert(CellFlags::PERIMETER);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DungeonLayout;
    use crate::mask::apply_layout;

    fn params(layout: RoomLayout) -> DungeonParams {
        DungeonParams {
            n_rows: 30,
            n_cols: 30,
            room_min: 3,
            room_max: 7,
            room_layout: layout,
            ..DungeonParams::default()
        }
    }

    fn place(seed: i64, layout: RoomLayout) -> (Grid, Vec<Room>) {
        let params = params(layout);
        let mut grid = Grid::new(params.n_rows, params.n_cols);
        let mut rng = DungeonRng::new(seed);
        let rooms = emplace_rooms(&mut grid, &mut rng, &params);
        (grid, rooms)
    }

    #[test]
    fn packed_rooms_do_not_overlap() {
        let (_, rooms) = place(5, RoomLayout::Strategy(RoomStrategy::Packed));
        assert!(!rooms.is_empty());
        for (k, a) in rooms.iter().enumerate() {
            for b in &rooms[k + 1..] {
                assert!(!a.overlaps(b), "rooms {} and {} overlap", a.id, b.id);
            }
        }
    }

    #[test]
    fn rooms_have_odd_bounds_and_sequential_ids() {
        let (_, rooms) = place(9, RoomLayout::Strategy(RoomStrategy::Scattered));
        for (k, room) in rooms.iter().enumerate() {
            assert_eq!(room.id as usize, k);
            for v in [room.north, room.south, room.west, room.east] {
                assert_eq!(v % 2, 1);
            }
            assert_eq!(room.height % 2, 1);
            assert_eq!(room.width % 2, 1);
            assert_eq!(room.area, room.height * room.width);
        }
    }

    #[test]
    fn room_cells_and_perimeter_are_stamped() {
        let (grid, rooms) = place(2, RoomLayout::Count(6));
        for room in &rooms {
            for r in room.north..=room.south {
                for c in room.west..=room.east {
                    assert_eq!(grid.cell(r, c).room_id(), Some(room.id));
                }
            }
            for c in room.west - 1..=room.east + 1 {
                let above = grid.cell(room.north - 1, c);
                assert!(above.intersects(CellFlags::PERIMETER | CellFlags::ROOM));
            }
        }
    }

    #[test]
    fn fully_blocked_grid_gets_no_rooms() {
        let params = params(RoomLayout::Strategy(RoomStrategy::Packed));
        let mut grid = Grid::new(params.n_rows, params.n_cols);
        apply_layout(&mut grid, &DungeonLayout::Mask(vec![vec![false]]));
        let mut rng = DungeonRng::new(1);
        assert!(emplace_rooms(&mut grid, &mut rng, &params).is_empty());
    }

    #[test]
    fn oversized_rooms_silently_fail() {
        let params = DungeonParams {
            n_rows: 6,
            n_cols: 6,
            room_min: 9,
            room_max: 15,
            room_layout: RoomLayout::Count(10),
            ..DungeonParams::default()
        };
        let mut grid = Grid::new(params.n_rows, params.n_cols);
        let mut rng = DungeonRng::new(0);
        assert!(emplace_rooms(&mut grid, &mut rng, &params).is_empty());
    }
}
