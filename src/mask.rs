use crate::cell::{Cell, CellFlags};
use crate::config::{DungeonLayout, LayoutTemplate};
use crate::grid::Grid;

/// Применяет маску формы подземелья: клетки вне допустимой области помечаются `BLOCKED`.
///
/// Должна выполняться до расстановки комнат и коридоров.
pub fn apply_layout(grid: &mut Grid, layout: &DungeonLayout) {
    match layout {
        DungeonLayout::Template(LayoutTemplate::Normal) => {}
        DungeonLayout::Template(LayoutTemplate::Round) => round_mask(grid),
        DungeonLayout::Template(template) => {
            if let Some(mask) = template.mask() {
                let rows: Vec<Vec<bool>> = mask.iter().map(|row| row.to_vec()).collect();
                mask_cells(grid, &rows);
            }
        }
        DungeonLayout::Mask(mask) => mask_cells(grid, mask),
    }
}

/// Масштабирует булеву маску на сетку методом ближайшего соседа.
///
/// Последняя строка и последний столбец сетки (внешняя стена) маской не затрагиваются.
fn mask_cells(grid: &mut Grid, mask: &[Vec<bool>]) {
    let mask_rows = mask.len();
    let mask_cols = mask.first().map_or(0, Vec::len);
    if mask_rows == 0 || mask_cols == 0 {
        return;
    }
    let r_x = mask_rows as f64 / grid.n_rows as f64;
    let c_x = mask_cols as f64 / grid.n_cols as f64;

    for r in 0..grid.n_rows {
        let mr = ((r as f64 * r_x).floor() as usize).min(mask_rows - 1);
        for c in 0..grid.n_cols {
            let mc = ((c as f64 * c_x).floor() as usize).min(mask_cols - 1);
            let open = mask[mr].get(mc).copied().unwrap_or(false);
            let cell = grid.cell_mut(r, c);
            if open {
                cell.clear();
            } else {
                *cell = Cell::with_flags(CellFlags::BLOCKED);
            }
        }
    }
}

/// Круглая маска: блокирует всё, что дальше половины ширины от центра
fn round_mask(grid: &mut Grid) {
    let center_r = (grid.n_rows / 2) as f64;
    let center_c = (grid.n_cols / 2) as f64;

    for r in 0..=grid.n_rows {
        for c in 0..=grid.n_cols {
            let d = ((r as f64 - center_r).powi(2) + (c as f64 - center_c).powi(2)).sqrt();
            if d > center_c {
                grid.cell_mut(r, c).insert(CellFlags::BLOCKED);
            }
        }
    }
}
