use crate::cell::{Cell, CellFlags};

/// Сетка подземелья размером `(n_rows + 1) × (n_cols + 1)`.
///
/// `n_rows` и `n_cols` всегда чётные: нечётные координаты — центры клеток
/// (комнаты, коридоры, двери, лестницы), чётные — стены и углы.
#[derive(Debug, Clone)]
pub struct Grid {
    pub n_i: usize,
    pub n_j: usize,
    pub n_rows: usize,
    pub n_cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Создаёт пустую сетку, округляя размеры вниз до чётных
    #[must_use]
    pub fn new(n_rows: usize, n_cols: usize) -> Self {
        let n_i = n_rows / 2;
        let n_j = n_cols / 2;
        let n_rows = n_i * 2;
        let n_cols = n_j * 2;
        Self {
            n_i,
            n_j,
            n_rows,
            n_cols,
            cells: vec![Cell::EMPTY; (n_rows + 1) * (n_cols + 1)],
        }
    }

    #[must_use]
    pub fn max_row(&self) -> usize {
        self.n_rows - 1
    }

    #[must_use]
    pub fn max_col(&self) -> usize {
        self.n_cols - 1
    }

    fn index(&self, r: usize, c: usize) -> usize {
        r * (self.n_cols + 1) + c
    }

    #[must_use]
    pub fn contains(&self, r: isize, c: isize) -> bool {
        r >= 0 && c >= 0 && r as usize <= self.n_rows && c as usize <= self.n_cols
    }

    /// Клетка по координатам внутри сетки
    #[must_use]
    pub fn cell(&self, r: usize, c: usize) -> Cell {
        self.cells[self.index(r, c)]
    }

    pub fn cell_mut(&mut self, r: usize, c: usize) -> &mut Cell {
        let idx = self.index(r, c);
        &mut self.cells[idx]
    }

    /// Клетка по знаковым координатам; `None` за пределами сетки
    #[must_use]
    pub fn get(&self, r: isize, c: isize) -> Option<Cell> {
        if self.contains(r, c) {
            Some(self.cell(r as usize, c as usize))
        } else {
            None
        }
    }

    /// Флаги клетки; за пределами сетки пустые
    #[must_use]
    pub fn flags_at(&self, r: isize, c: isize) -> CellFlags {
        self.get(r, c).map_or(CellFlags::empty(), Cell::flags)
    }

    /// Координаты клетки, сдвинутой на `(dr, dc)`, если она внутри сетки
    #[must_use]
    pub fn offset(&self, r: usize, c: usize, dr: isize, dc: isize) -> Option<(usize, usize)> {
        let nr = r as isize + dr;
        let nc = c as isize + dc;
        self.contains(nr, nc).then_some((nr as usize, nc as usize))
    }

    /// Центры клеток (нечётные координаты) в порядке развёртки
    pub fn odd_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.n_i).flat_map(move |i| (0..self.n_j).map(move |j| (i * 2 + 1, j * 2 + 1)))
    }

    /// Все координаты сетки в порядке развёртки
    pub fn positions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..=self.n_rows).flat_map(move |r| (0..=self.n_cols).map(move |c| (r, c)))
    }

    /// Плотная булева карта того же размера, что и сетка
    #[must_use]
    pub fn mark_layer(&self) -> MarkLayer {
        MarkLayer {
            width: self.n_cols + 1,
            data: vec![false; self.cells.len()],
        }
    }

    /// Сбрасывает заблокированные клетки в пустые перед сборкой карты
    pub fn empty_blocks(&mut self) {
        for cell in &mut self.cells {
            if cell.contains(CellFlags::BLOCKED) {
                cell.clear();
            }
        }
    }
}

/// Множество посещённых клеток в виде плотного слоя
#[derive(Debug, Clone)]
pub struct MarkLayer {
    width: usize,
    data: Vec<bool>,
}

impl MarkLayer {
    /// Отмечает клетку; `true`, если раньше она отмечена не была
    pub fn mark(&mut self, r: usize, c: usize) -> bool {
        let idx = r * self.width + c;
        !std::mem::replace(&mut self.data[idx], true)
    }

    #[must_use]
    pub fn is_marked(&self, r: usize, c: usize) -> bool {
        self.data[r * self.width + c]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_forced_even() {
        let grid = Grid::new(11, 9);
        assert_eq!((grid.n_rows, grid.n_cols), (10, 8));
        assert_eq!((grid.n_i, grid.n_j), (5, 4));
        assert!(grid.get(10, 8).is_some());
        assert!(grid.get(11, 0).is_none());
        assert!(grid.get(-1, 0).is_none());
    }

    #[test]
    fn odd_cells_are_centres() {
        let grid = Grid::new(6, 6);
        let cells: Vec<_> = grid.odd_cells().collect();
        assert_eq!(cells.len(), 9);
        assert_eq!(cells[0], (1, 1));
        assert_eq!(cells[8], (5, 5));
        assert!(cells.iter().all(|&(r, c)| r % 2 == 1 && c % 2 == 1));
    }

    #[test]
    fn out_of_bounds_flags_are_empty() {
        let mut grid = Grid::new(4, 4);
        grid.cell_mut(0, 0).insert(CellFlags::BLOCKED);
        assert_eq!(grid.flags_at(0, 0), CellFlags::BLOCKED);
        assert_eq!(grid.flags_at(-1, -1), CellFlags::empty());
        grid.empty_blocks();
        assert!(grid.cell(0, 0).is_empty());
    }

    #[test]
    fn mark_layer_reports_first_visit() {
        let grid = Grid::new(4, 4);
        let mut layer = grid.mark_layer();
        assert!(layer.mark(2, 3));
        assert!(!layer.mark(2, 3));
        assert!(layer.is_marked(2, 3));
    }
}
