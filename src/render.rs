// src/render.rs
//! Отладочный рендер готового подземелья
//!
//! Рендер только читает [`DungeonMap`](crate::map::DungeonMap) и списки дверей
//! и лестниц, ничего не меняя в подземелье. Слои рисуются по порядку:
//! фон, камень, открытые клетки, сетка, стены, двери, лестницы.
//!
//! # Пример
//! ```no_run
//! use dungeongen::{Dungeon, DungeonParams};
//! use dungeongen::render::{RenderOptions, save_png};
//!
//! let params = DungeonParams::default();
//! let dungeon = Dungeon::generate(&params)?;
//! save_png(&dungeon, &RenderOptions::from_params(&params), "dungeon.png")?;
//! # Ok::<(), dungeongen::DungeonError>(())
//! ```

use crate::config::{DungeonParams, Palette, parse_hex_color};
use crate::dungeon::Dungeon;
use crate::error::Result;
use crate::map::DungeonMap;
use crate::stairs::{Stair, StairKey};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use std::path::Path;

/// Настройки рендера
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Размер клетки в пикселях
    pub cell_size: u32,
    pub palette: Palette,
    /// Рисовать квадратную сетку поверх открытых клеток
    pub grid: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            cell_size: 18,
            palette: Palette::standard(),
            grid: true,
        }
    }
}

impl RenderOptions {
    #[must_use]
    pub fn from_params(params: &DungeonParams) -> Self {
        Self {
            cell_size: params.cell_size.max(1),
            palette: params.map_style.palette(),
            grid: true,
        }
    }
}

/// Цвета палитры, разобранные один раз на весь рендер
struct Colors {
    background: Rgb<u8>,
    wall: Rgb<u8>,
    fill: Rgb<u8>,
    open: Rgb<u8>,
    open_grid: Rgb<u8>,
    door: Rgb<u8>,
    stair: Rgb<u8>,
}

impl Colors {
    fn new(palette: &Palette) -> Self {
        let rgb = |c: &str| Rgb(parse_hex_color(c).unwrap_or([0, 0, 0]));
        Self {
            background: rgb(&palette.background),
            wall: rgb(&palette.wall),
            fill: rgb(&palette.fill),
            open: rgb(&palette.open),
            open_grid: rgb(&palette.open_grid),
            door: rgb(palette.door_color()),
            stair: rgb(palette.stair_color()),
        }
    }
}

fn is_open(map: &DungeonMap, r: isize, c: isize) -> bool {
    map.get(r, c).is_some_and(|cell| cell.is_open())
}

/// Рисует подземелье в RGB-изображение
#[must_use]
pub fn render_png(dungeon: &Dungeon, options: &RenderOptions) -> RgbImage {
    let map = dungeon.map();
    let dim = options.cell_size.max(1);
    let max_x = (map.n_cols as u32 + 1) * dim;
    let max_y = (map.n_rows as u32 + 1) * dim;
    let colors = Colors::new(&options.palette);

    let mut img = RgbImage::from_pixel(max_x + 1, max_y + 1, colors.background);
    draw_filled_rect_mut(&mut img, Rect::at(0, 0).of_size(max_x, max_y), colors.fill);

    for cell in map.cells().filter(|cell| cell.is_open()) {
        let x = (cell.col as u32 * dim) as i32;
        let y = (cell.row as u32 * dim) as i32;
        draw_filled_rect_mut(&mut img, Rect::at(x, y).of_size(dim, dim), colors.open);
    }

    if options.grid {
        draw_grid(&mut img, map, dim, colors.open_grid);
    }
    draw_walls(&mut img, map, dim, colors.wall);
    draw_doors(&mut img, dungeon, dim, colors.door);
    for stair in dungeon.stairs() {
        draw_stair(&mut img, stair, dim, colors.stair);
    }
    img
}

/// Сохраняет рендер в PNG
pub fn save_png(dungeon: &Dungeon, options: &RenderOptions, path: impl AsRef<Path>) -> Result<()> {
    render_png(dungeon, options).save(path)?;
    Ok(())
}

/// Сетка только по открытым клеткам, чтобы камень оставался сплошным
fn draw_grid(img: &mut RgbImage, map: &DungeonMap, dim: u32, color: Rgb<u8>) {
    if dim < 4 {
        return;
    }
    for cell in map.cells().filter(|cell| cell.is_open()) {
        let x1 = (cell.col as u32 * dim) as f32;
        let y1 = (cell.row as u32 * dim) as f32;
        let x2 = x1 + dim as f32;
        let y2 = y1 + dim as f32;
        draw_line_segment_mut(img, (x1, y1), (x2, y1), color);
        draw_line_segment_mut(img, (x1, y1), (x1, y2), color);
        draw_line_segment_mut(img, (x2, y1), (x2, y2), color);
        draw_line_segment_mut(img, (x1, y2), (x2, y2), color);
    }
}

/// Стены рисуются между открытой клеткой и закрытой соседней
fn draw_walls(img: &mut RgbImage, map: &DungeonMap, dim: u32, color: Rgb<u8>) {
    for cell in map.cells().filter(|cell| cell.is_open()) {
        let (r, c) = (cell.row as isize, cell.col as isize);
        let x1 = (cell.col as u32 * dim) as f32;
        let y1 = (cell.row as u32 * dim) as f32;
        let x2 = x1 + dim as f32;
        let y2 = y1 + dim as f32;

        if !is_open(map, r - 1, c) {
            draw_line_segment_mut(img, (x1, y1), (x2, y1), color);
        }
        if !is_open(map, r + 1, c) {
            draw_line_segment_mut(img, (x1, y2), (x2, y2), color);
        }
        if !is_open(map, r, c - 1) {
            draw_line_segment_mut(img, (x1, y1), (x1, y2), color);
        }
        if !is_open(map, r, c + 1) {
            draw_line_segment_mut(img, (x2, y1), (x2, y2), color);
        }
    }
}

/// Дверь — толстая черта поперёк прохода
fn draw_doors(img: &mut RgbImage, dungeon: &Dungeon, dim: u32, color: Rgb<u8>) {
    let map = dungeon.map();
    let thick = dim.div_ceil(4).max(1);

    for door in dungeon.doors() {
        let x1 = door.col as u32 * dim;
        let y1 = door.row as u32 * dim;
        let rect = if is_open(map, door.row as isize, door.col as isize - 1) {
            // Проход горизонтальный: черта вертикальная
            let xc = x1 + dim / 2;
            Rect::at((xc - thick / 2) as i32, y1 as i32).of_size(thick, dim)
        } else {
            let yc = y1 + dim / 2;
            Rect::at(x1 as i32, (yc - thick / 2) as i32).of_size(dim, thick)
        };
        draw_filled_rect_mut(img, rect, color);
    }
}

/// Ступени от лестницы к площадке; спуск сужается, подъём одной ширины
fn draw_stair(img: &mut RgbImage, stair: &Stair, dim: u32, color: Rgb<u8>) {
    let dim = dim as f32;
    let half = (dim / 2.0).floor();
    let step = (dim / 20.0).floor() + 2.0;
    let width = |t: f32| match stair.key {
        StairKey::Down => (t * half).floor(),
        StairKey::Up => half,
    };

    let vertical = stair.next_col == stair.col;
    let (start, end, centre) = if vertical {
        let centre = ((stair.col as f32 + 0.5) * dim).floor();
        if stair.next_row > stair.row {
            (stair.row as f32 * dim, (stair.next_row as f32 + 1.0) * dim, centre)
        } else {
            ((stair.row as f32 + 1.0) * dim, stair.next_row as f32 * dim, centre)
        }
    } else {
        let centre = ((stair.row as f32 + 0.5) * dim).floor();
        if stair.next_col > stair.col {
            (stair.col as f32 * dim, (stair.next_col as f32 + 1.0) * dim, centre)
        } else {
            ((stair.col as f32 + 1.0) * dim, stair.next_col as f32 * dim, centre)
        }
    };

    let span = end - start;
    let dir = span.signum();
    let mut pos = start;
    while (end - pos) * dir > 0.0 {
        let d = width((pos - start) / span);
        if vertical {
            draw_line_segment_mut(img, (centre - d, pos), (centre + d, pos), color);
        } else {
            draw_line_segment_mut(img, (pos, centre - d), (pos, centre + d), color);
        }
        pos += step * dir;
    }
}

/// Текстовая карта: `#` стена, `.` комната, `,` коридор, `+` дверь, `>`/`<` лестницы
#[must_use]
pub fn render_ascii(dungeon: &Dungeon) -> String {
    let map = dungeon.map();
    let mut out = String::with_capacity((map.n_rows + 1) * (map.n_cols + 2));

    for r in 0..=map.n_rows as isize {
        for c in 0..=map.n_cols as isize {
            let symbol = match map.get(r, c) {
                Some(cell) if cell.stair_key == Some(StairKey::Down) => '>',
                Some(cell) if cell.stair_key == Some(StairKey::Up) => '<',
                Some(cell) if cell.door.is_some() => '+',
                Some(cell) if cell.room.is_some() => '.',
                Some(cell) if cell.corridor.is_some() => ',',
                _ => '#',
            };
            out.push(symbol);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MapStyle, StyleName};

    fn dungeon(seed: i64) -> Dungeon {
        let params = DungeonParams {
            seed,
            n_rows: 21,
            n_cols: 27,
            ..DungeonParams::default()
        };
        Dungeon::generate(&params).unwrap()
    }

    #[test]
    fn image_size_follows_grid() {
        let dungeon = dungeon(1);
        let options = RenderOptions {
            cell_size: 10,
            ..RenderOptions::default()
        };
        let img = render_png(&dungeon, &options);
        assert_eq!(img.width(), (dungeon.n_cols as u32 + 1) * 10 + 1);
        assert_eq!(img.height(), (dungeon.n_rows as u32 + 1) * 10 + 1);
    }

    #[test]
    fn room_centre_is_painted_open() {
        let dungeon = dungeon(3);
        let options = RenderOptions {
            grid: false,
            ..RenderOptions::default()
        };
        let img = render_png(&dungeon, &options);
        let open = Rgb(parse_hex_color(&options.palette.open).unwrap());
        let dim = options.cell_size;
        for room in dungeon.rooms() {
            let x = room.west as u32 * dim + dim / 2;
            let y = room.north as u32 * dim + dim / 2;
            assert_eq!(*img.get_pixel(x, y), open, "room {}", room.id);
        }
    }

    #[test]
    fn named_style_sets_palette() {
        let params = DungeonParams {
            map_style: MapStyle::Named(StyleName::Black),
            cell_size: 12,
            ..DungeonParams::default()
        };
        let options = RenderOptions::from_params(&params);
        assert_eq!(options.palette, Palette::black());
        assert_eq!(options.cell_size, 12);
    }

    #[test]
    fn ascii_has_one_line_per_row() {
        let dungeon = dungeon(7);
        let text = render_ascii(&dungeon);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), dungeon.n_rows + 1);
        assert!(lines.iter().all(|l| l.chars().count() == dungeon.n_cols + 1));
        let rooms = text.chars().filter(|&ch| ch == '.').count();
        let room_area: usize = dungeon.rooms().iter().map(|r| r.area).sum();
        assert!(rooms <= room_area);
        assert!(rooms > 0 || dungeon.rooms().is_empty());
    }
}
