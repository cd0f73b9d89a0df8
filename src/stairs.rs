use crate::cell::CellFlags;
use crate::grid::Grid;
use crate::rng::DungeonRng;
use serde::Serialize;

/// Тип лестницы
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StairKey {
    Down,
    Up,
}

impl StairKey {
    #[must_use]
    pub fn flag(self) -> CellFlags {
        match self {
            StairKey::Down => CellFlags::STAIR_DN,
            StairKey::Up => CellFlags::STAIR_UP,
        }
    }
}

/// Лестница в конце коридора
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stair {
    pub id: u32,
    pub row: usize,
    pub col: usize,
    /// Площадка: соседняя клетка коридора, на которую выходит лестница
    pub next_row: usize,
    pub next_col: usize,
    pub key: StairKey,
    pub corridor: Option<u32>,
}

/// Шаблон тупика под лестницу
struct StairEnd {
    /// Смещения, которые не должны быть проходимы
    walled: &'static [(isize, isize)],
    /// Прямой отрезок коридора под лестницей
    corridor: &'static [(isize, isize)],
    next: (isize, isize),
}

/// Шаблоны по сторонам света: север, юг, запад, восток
static STAIR_ENDS: [StairEnd; 4] = [
    StairEnd {
        walled: &[(1, -1), (0, -1), (-1, -1), (-1, 0), (-1, 1), (0, 1), (1, 1)],
        corridor: &[(0, 0), (1, 0), (2, 0)],
        next: (1, 0),
    },
    StairEnd {
        walled: &[(-1, -1), (0, -1), (1, -1), (1, 0), (1, 1), (0, 1), (-1, 1)],
        corridor: &[(0, 0), (-1, 0), (-2, 0)],
        next: (-1, 0),
    },
    StairEnd {
        walled: &[(-1, 1), (-1, 0), (-1, -1), (0, -1), (1, -1), (1, 0), (1, 1)],
        corridor: &[(0, 0), (0, 1), (0, 2)],
        next: (0, 1),
    },
    StairEnd {
        walled: &[(-1, -1), (-1, 0), (-1, 1), (0, 1), (1, 1), (1, 0), (1, -1)],
        corridor: &[(0, 0), (0, -1), (0, -2)],
        next: (0, -1),
    },
];

/// Кандидат на место лестницы
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EndCandidate {
    row: usize,
    col: usize,
    next_row: usize,
    next_col: usize,
}

/// Проверяет шаблон: под коридорными смещениями коридор, стены не проходимы.
/// Клетки за пределами сетки считаются стеной и не считаются коридором.
fn check_end(grid: &Grid, r: usize, c: usize, end: &StairEnd) -> bool {
    let at = |(dr, dc): (isize, isize)| grid.flags_at(r as isize + dr, c as isize + dc);
    end.corridor
        .iter()
        .all(|&p| at(p).contains(CellFlags::CORRIDOR))
        && end
            .walled
            .iter()
            .all(|&p| !at(p).intersects(CellFlags::OPENSPACE))
}

fn stair_ends(grid: &Grid) -> Vec<EndCandidate> {
    let mut list = Vec::new();
    for (r, c) in grid.odd_cells() {
        let cell = grid.cell(r, c);
        if !cell.contains(CellFlags::CORRIDOR) || cell.intersects(CellFlags::STAIRS) {
            continue;
        }
        for end in &STAIR_ENDS {
            if check_end(grid, r, c, end)
                && let Some((next_row, next_col)) = grid.offset(r, c, end.next.0, end.next.1)
            {
                list.push(EndCandidate {
                    row: r,
                    col: c,
                    next_row,
                    next_col,
                });
            }
        }
    }
    list
}

/// Ставит до `n` лестниц в тупиках коридоров.
///
/// Первая лестница ведёт вниз, вторая вверх, тип остальных выбирается случайно.
/// Если подходящих тупиков меньше, ставится сколько есть.
pub fn emplace_stairs(grid: &mut Grid, rng: &mut DungeonRng, n: usize) -> Vec<Stair> {
    let mut stairs = Vec::new();
    if n == 0 {
        return stairs;
    }
    let mut list = stair_ends(grid);
    if list.is_empty() {
        return stairs;
    }

    while stairs.len() < n {
        let Some(k) = rng.take_index(list.len()) else {
            break;
        };
        let end = list.remove(k);
        if grid.cell(end.row, end.col).intersects(CellFlags::STAIRS) {
            continue;
        }
        let key = match stairs.len() {
            0 => StairKey::Down,
            1 => StairKey::Up,
            _ if rng.next_int(0, 1) == 0 => StairKey::Down,
            _ => StairKey::Up,
        };
        grid.cell_mut(end.row, end.col).insert(key.flag());
        stairs.push(Stair {
            id: stairs.len() as u32,
            row: end.row,
            col: end.col,
            next_row: end.next_row,
            next_col: end.next_col,
            key,
            corridor: None,
        });
    }

    log::debug!("placed {} of {n} requested stairs", stairs.len());
    stairs
}

/// Привязывает лестницы к коридорам по метке их клетки
pub fn attach_corridors(grid: &Grid, stairs: &mut [Stair]) {
    for stair in stairs {
        stair.corridor = grid.cell(stair.row, stair.col).corridor_id();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Горизонтальный коридор `(3, 1..=7)` и вертикальный `(1..=7, 11)`: четыре тупика
    fn two_corridors() -> Grid {
        let mut grid = Grid::new(10, 14);
        for c in 1..=7 {
            grid.cell_mut(3, c).set_corridor(1);
        }
        for r in 1..=7 {
            grid.cell_mut(r, 11).set_corridor(2);
        }
        grid
    }

    #[test]
    fn finds_dead_ends_with_landings() {
        let grid = two_corridors();
        let mut ends = stair_ends(&grid);
        ends.sort_by_key(|e| (e.row, e.col));
        let cells: Vec<_> = ends.iter().map(|e| (e.row, e.col, e.next_row, e.next_col)).collect();
        assert_eq!(
            cells,
            vec![(1, 11, 2, 11), (3, 1, 3, 2), (3, 7, 3, 6), (7, 11, 6, 11)]
        );
    }

    #[test]
    fn first_two_stairs_are_down_then_up() {
        let mut grid = two_corridors();
        let mut rng = DungeonRng::new(5);
        let mut stairs = emplace_stairs(&mut grid, &mut rng, 2);
        assert_eq!(stairs.len(), 2);
        assert_eq!(stairs[0].key, StairKey::Down);
        assert_eq!(stairs[1].key, StairKey::Up);
        assert!(grid.cell(stairs[0].row, stairs[0].col).contains(CellFlags::STAIR_DN));
        assert!(grid.cell(stairs[1].row, stairs[1].col).contains(CellFlags::STAIR_UP));

        attach_corridors(&grid, &mut stairs);
        for stair in &stairs {
            assert!(stair.corridor.is_some());
        }
    }

    #[test]
    fn requests_beyond_candidates_are_capped() {
        let mut grid = two_corridors();
        let mut rng = DungeonRng::new(1);
        let mut twin = rng.clone();
        let stairs = emplace_stairs(&mut grid, &mut rng, 10);
        assert_eq!(stairs.len(), 4);
        let mut cells: Vec<_> = stairs.iter().map(|s| (s.row, s.col)).collect();
        cells.sort_unstable();
        cells.dedup();
        assert_eq!(cells.len(), 4);

        // Четыре извлечения, два типа для третьей и четвёртой лестниц
        // и одно извлечение из опустевшего списка
        for _ in 0..7 {
            twin.next_f64();
        }
        assert_eq!(rng, twin);
    }

    #[test]
    fn exact_request_does_not_touch_empty_list() {
        let mut grid = two_corridors();
        let mut rng = DungeonRng::new(1);
        let mut twin = rng.clone();
        assert_eq!(emplace_stairs(&mut grid, &mut rng, 4).len(), 4);
        for _ in 0..6 {
            twin.next_f64();
        }
        assert_eq!(rng, twin);
    }

    #[test]
    fn no_corridors_no_stairs() {
        let mut grid = Grid::new(10, 10);
        let mut rng = DungeonRng::new(1);
        let before = rng.clone();
        assert!(emplace_stairs(&mut grid, &mut rng, 3).is_empty());
        assert_eq!(rng, before);
    }
}
