use crate::cell::CellFlags;
use crate::grid::Grid;
use crate::rng::DungeonRng;

/// Шаблон тупика: стены вокруг клетки и направление, куда продолжать схлопывание
#[derive(Debug, Clone, Copy)]
pub(crate) struct CloseEnd {
    pub(crate) walled: &'static [(isize, isize)],
    pub(crate) recurse: (isize, isize),
}

/// Тупики, открытые на север, юг, запад и восток
pub(crate) static CLOSE_ENDS: [CloseEnd; 4] = [
    CloseEnd {
        walled: &[(0, -1), (1, -1), (1, 0), (1, 1), (0, 1)],
        recurse: (-1, 0),
    },
    CloseEnd {
        walled: &[(0, -1), (-1, -1), (-1, 0), (-1, 1), (0, 1)],
        recurse: (1, 0),
    },
    CloseEnd {
        walled: &[(-1, 0), (-1, 1), (0, 1), (1, 1), (1, 0)],
        recurse: (0, -1),
    },
    CloseEnd {
        walled: &[(-1, 0), (-1, -1), (0, -1), (1, -1), (1, 0)],
        recurse: (0, 1),
    },
];

/// Можно ли стереть клетку: проходима, но не комната и не лестница
fn collapsible(flags: CellFlags) -> bool {
    flags.intersects(CellFlags::OPENSPACE) && !flags.intersects(CellFlags::ROOM | CellFlags::STAIRS)
}

/// Шаблон тупика, которому соответствует клетка, если она стираемая.
/// Площадка перед лестницей не стирается.
pub(crate) fn matching_end(grid: &Grid, r: usize, c: usize) -> Option<&'static CloseEnd> {
    if !collapsible(grid.cell(r, c).flags()) {
        return None;
    }
    let at = |(dr, dc): (isize, isize)| grid.flags_at(r as isize + dr, c as isize + dc);
    CLOSE_ENDS.iter().find(|end| {
        end.walled
            .iter()
            .all(|&p| !at(p).intersects(CellFlags::OPENSPACE))
            && !at(end.recurse).intersects(CellFlags::STAIRS)
    })
}

/// Схлопывает тупики коридоров.
///
/// `percent` задаёт вероятность попытки для каждого центра клетки, `100` значит для всех.
/// Возвращает количество стёртых клеток.
pub fn collapse_tunnels(grid: &mut Grid, rng: &mut DungeonRng, percent: u32) -> usize {
    if percent == 0 {
        return 0;
    }
    let all = percent >= 100;
    let mut erased = 0;

    let centres: Vec<(usize, usize)> = grid.odd_cells().collect();
    for (r, c) in centres {
        let flags = grid.cell(r, c).flags();
        if !flags.intersects(CellFlags::OPENSPACE) || flags.intersects(CellFlags::STAIRS) {
            continue;
        }
        if !all && rng.next_int(0, 100) >= i64::from(percent) {
            continue;
        }
        erased += collapse(grid, r, c);
    }

    log::debug!("collapsed {erased} dead-end cells");
    erased
}

/// Стирает тупик и идёт вдоль коридора, пока не упрётся в развилку, комнату или лестницу.
/// Случайных чисел не тянет.
pub(crate) fn collapse(grid: &mut Grid, r: usize, c: usize) -> usize {
    let mut erased = 0;
    let mut cursor = Some((r, c));

    while let Some((r, c)) = cursor.take() {
        let Some(end) = matching_end(grid, r, c) else {
            break;
        };
        grid.cell_mut(r, c).clear();
        erased += 1;
        cursor = grid.offset(r, c, end.recurse.0, end.recurse.1);
    }
    erased
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor(grid: &mut Grid, cells: &[(usize, usize)]) {
        for &(r, c) in cells {
            grid.cell_mut(r, c).set_corridor(1);
        }
    }

    #[test]
    fn stub_collapses_back_to_junction() {
        // Т-образная развилка в (5, 5) с отростком на север
        let mut grid = Grid::new(12, 12);
        let main: Vec<_> = (1..=9).map(|c| (5, c)).collect();
        corridor(&mut grid, &main);
        corridor(&mut grid, &[(1, 5), (2, 5), (3, 5), (4, 5)]);
        // Концы главного коридора упираются в комнаты
        grid.cell_mut(5, 0).set_room(0);
        grid.cell_mut(5, 10).set_room(1);

        let erased = collapse(&mut grid, 1, 5);
        assert_eq!(erased, 4);
        for r in 1..=4 {
            assert!(grid.cell(r, 5).is_empty());
        }
        assert!(grid.cell(5, 5).contains(CellFlags::CORRIDOR));
    }

    #[test]
    fn isolated_corridor_vanishes_entirely() {
        let mut grid = Grid::new(10, 10);
        let cells: Vec<_> = (1..=7).map(|c| (3, c)).collect();
        corridor(&mut grid, &cells);
        let mut rng = DungeonRng::new(0);
        collapse_tunnels(&mut grid, &mut rng, 100);
        assert!(cells.iter().all(|&(r, c)| grid.cell(r, c).is_empty()));
    }

    #[test]
    fn stairs_stop_the_collapse() {
        let mut grid = Grid::new(10, 10);
        let cells: Vec<_> = (1..=7).map(|c| (3, c)).collect();
        corridor(&mut grid, &cells);
        grid.cell_mut(3, 1).insert(CellFlags::STAIR_DN);
        let mut rng = DungeonRng::new(0);
        collapse_tunnels(&mut grid, &mut rng, 100);
        assert!(grid.cell(3, 1).contains(CellFlags::STAIR_DN));
        assert!(grid.cell(3, 2).contains(CellFlags::CORRIDOR));
        assert!(grid.cell(3, 7).is_empty());
    }

    #[test]
    fn zero_percent_is_a_no_op() {
        let mut grid = Grid::new(10, 10);
        corridor(&mut grid, &[(3, 3), (3, 4), (3, 5)]);
        let mut rng = DungeonRng::new(0);
        assert_eq!(collapse_tunnels(&mut grid, &mut rng, 0), 0);
        assert!(grid.cell(3, 4).contains(CellFlags::CORRIDOR));
    }
}
