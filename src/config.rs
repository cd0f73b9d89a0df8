// src/config.rs
//! Конфигурация генерации подземелья
//!
//! Этот модуль определяет все параметры, управляющие процедурной генерацией:
//! - Размер сетки и маску формы подземелья
//! - Размеры и способ расстановки комнат
//! - Прямолинейность коридоров и удаление тупиков
//! - Количество лестниц и ограничение дублирующихся дверей
//! - Стиль отладочного рендера
//!
//! Все структуры поддерживают сериализацию в TOML/JSON для удобной настройки через конфигурационные файлы.

use crate::error::{DungeonError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Именованный шаблон формы подземелья
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LayoutTemplate {
    /// Без маски: вся сетка доступна
    #[default]
    Normal,
    /// Рамка с пустым центром
    Box,
    /// Крест
    Cross,
    /// Подкова, открытая сверху
    U,
    /// Круг, вписанный в сетку
    Round,
}

impl LayoutTemplate {
    /// Возвращает маску 3×3 для табличных шаблонов.
    ///
    /// `Normal` и `Round` масок не имеют: первый не ограничивает сетку,
    /// второй строится по расстоянию от центра.
    #[must_use]
    pub fn mask(self) -> Option<[[bool; 3]; 3]> {
        match self {
            LayoutTemplate::Normal | LayoutTemplate::Round => None,
            LayoutTemplate::Box => Some([[true, true, true], [true, false, true], [true, true, true]]),
            LayoutTemplate::Cross => Some([
                [false, true, false],
                [true, true, true],
                [false, true, false],
            ]),
            LayoutTemplate::U => Some([[true, false, true], [true, false, true], [true, true, true]]),
        }
    }
}

/// Форма подземелья: именованный шаблон или произвольная булева маска
///
/// В TOML записывается либо строкой (`dungeon_layout = "Cross"`),
/// либо массивом массивов (`dungeon_layout = [[true, false], [true, true]]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DungeonLayout {
    Template(LayoutTemplate),
    /// `true` — клетка доступна, `false` — заблокирована
    Mask(Vec<Vec<bool>>),
}

impl Default for DungeonLayout {
    fn default() -> Self {
        DungeonLayout::Template(LayoutTemplate::Normal)
    }
}

/// Способ расстановки комнат
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RoomStrategy {
    /// Плотная упаковка: попытка комнаты в каждой клетке сетки
    Packed,
    /// Случайное разбрасывание `площадь / max_площадь_комнаты` комнат
    #[default]
    Scattered,
}

/// Расстановка комнат: стратегия или явное количество попыток
///
/// В TOML: `room_layout = "Packed"` или `room_layout = 12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoomLayout {
    Count(usize),
    Strategy(RoomStrategy),
}

impl Default for RoomLayout {
    fn default() -> Self {
        RoomLayout::Strategy(RoomStrategy::Scattered)
    }
}

/// Палитра рендера в формате `"#rrggbb"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub background: String,
    pub wall: String,
    pub fill: String,
    pub open: String,
    pub open_grid: String,
    /// Цвет дверей (по умолчанию — `fill`)
    #[serde(default)]
    pub door: Option<String>,
    /// Цвет лестниц (по умолчанию — `wall`)
    #[serde(default)]
    pub stair: Option<String>,
}

impl Palette {
    #[must_use]
    pub fn standard() -> Self {
        Self {
            background: "#dddddd".to_string(),
            wall: "#999999".to_string(),
            fill: "#000000".to_string(),
            open: "#ffffff".to_string(),
            open_grid: "#cccccc".to_string(),
            door: None,
            stair: None,
        }
    }

    #[must_use]
    pub fn black() -> Self {
        Self {
            background: "#000000".to_string(),
            wall: "#000000".to_string(),
            fill: "#000000".to_string(),
            open: "#ffffff".to_string(),
            open_grid: "#cccccc".to_string(),
            door: None,
            stair: None,
        }
    }

    #[must_use]
    pub fn door_color(&self) -> &str {
        self.door.as_deref().unwrap_or(&self.fill)
    }

    #[must_use]
    pub fn stair_color(&self) -> &str {
        self.stair.as_deref().unwrap_or(&self.wall)
    }

    fn colors(&self) -> impl Iterator<Item = &str> {
        [
            self.background.as_str(),
            self.wall.as_str(),
            self.fill.as_str(),
            self.open.as_str(),
            self.open_grid.as_str(),
            self.door_color(),
            self.stair_color(),
        ]
        .into_iter()
    }
}

/// Разбирает цвет `"#rrggbb"` в компоненты RGB
#[must_use]
pub fn parse_hex_color(color: &str) -> Option<[u8; 3]> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some([r, g, b])
}

/// Именованный стиль карты
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum StyleName {
    #[default]
    Standard,
    Black,
}

/// Стиль рендера: именованный или собственная палитра
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MapStyle {
    Named(StyleName),
    Custom(Palette),
}

impl Default for MapStyle {
    fn default() -> Self {
        MapStyle::Named(StyleName::Standard)
    }
}

impl MapStyle {
    #[must_use]
    pub fn palette(&self) -> Palette {
        match self {
            MapStyle::Named(StyleName::Standard) => Palette::standard(),
            MapStyle::Named(StyleName::Black) => Palette::black(),
            MapStyle::Custom(palette) => palette.clone(),
        }
    }
}

/// Основные параметры генерации подземелья
///
/// Полная конфигурация для генерации одной карты. Поддерживает загрузку из TOML-файлов.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonParams {
    /// Сид генератора случайных чисел (детерминированная генерация)
    #[serde(default)]
    pub seed: i64,

    /// Количество строк сетки (округляется вниз до чётного)
    #[serde(default = "default_n_rows")]
    pub n_rows: usize,

    /// Количество столбцов сетки (округляется вниз до чётного)
    #[serde(default = "default_n_cols")]
    pub n_cols: usize,

    /// Форма подземелья (по умолчанию без маски)
    #[serde(default)]
    pub dungeon_layout: DungeonLayout,

    /// Минимальный размер комнаты в клетках сетки
    #[serde(default = "default_room_min")]
    pub room_min: usize,

    /// Максимальный размер комнаты в клетках сетки
    #[serde(default = "default_room_max")]
    pub room_max: usize,

    /// Расстановка комнат (по умолчанию `Scattered`)
    #[serde(default)]
    pub room_layout: RoomLayout,

    /// Прямолинейность коридоров:
    /// - `0` — лабиринт,
    /// - `100` — коридоры стремятся идти прямо.
    #[serde(default = "default_corridor_layout")]
    pub corridor_layout: u32,

    /// Доля тупиков, которые нужно схлопнуть, в процентах (`100` — все)
    #[serde(default = "default_remove_deadends")]
    pub remove_deadends: u32,

    /// Количество лестниц (первая — вниз, вторая — вверх)
    #[serde(default = "default_add_stairs")]
    pub add_stairs: usize,

    /// Сколько эквивалентных дверей (в ту же комнату или тот же коридор) оставлять на одной стене.
    /// `0` и `1` оставляют одну.
    #[serde(default)]
    pub max_door: usize,

    /// Стиль отладочного рендера
    #[serde(default)]
    pub map_style: MapStyle,

    /// Размер клетки в пикселях для рендера
    #[serde(default = "default_cell_size")]
    pub cell_size: u32,
}

impl DungeonParams {
    /// Загружает параметры из TOML-файла
    ///
    /// # Ошибки
    /// Возвращает ошибку, если файл не найден или содержит недопустимый формат.
    ///
    /// # Пример
    /// ```toml
    /// # dungeon.toml
    /// seed = 4
    /// n_rows = 28
    /// n_cols = 28
    /// room_layout = "Packed"
    /// dungeon_layout = "Cross"
    /// ```
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Разбирает параметры из строки TOML
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let params: Self = toml::from_str(contents)?;
        Ok(params)
    }

    /// Проверяет параметры до запуска генерации.
    ///
    /// Конвейер не даёт никаких гарантий на некорректной конфигурации,
    /// поэтому ошибка возвращается сразу, а не по ходу генерации.
    pub fn validate(&self) -> Result<()> {
        if self.n_rows < 2 || self.n_cols < 2 {
            return Err(DungeonError::InvalidConfig(format!(
                "n_rows and n_cols must be at least 2, got {}×{}",
                self.n_rows, self.n_cols
            )));
        }
        if self.room_min == 0 {
            return Err(DungeonError::InvalidConfig(
                "room_min must be positive".to_string(),
            ));
        }
        if self.room_min > self.room_max {
            return Err(DungeonError::InvalidConfig(format!(
                "room_min ({}) exceeds room_max ({})",
                self.room_min, self.room_max
            )));
        }
        if self.corridor_layout > 100 {
            return Err(DungeonError::InvalidConfig(format!(
                "corridor_layout must be within 0..=100, got {}",
                self.corridor_layout
            )));
        }
        if self.remove_deadends > 100 {
            return Err(DungeonError::InvalidConfig(format!(
                "remove_deadends must be within 0..=100, got {}",
                self.remove_deadends
            )));
        }
        if let DungeonLayout::Mask(mask) = &self.dungeon_layout {
            let width = mask.first().map_or(0, Vec::len);
            if width == 0 || mask.iter().any(|row| row.len() != width) {
                return Err(DungeonError::InvalidConfig(
                    "dungeon_layout mask must be a non-empty rectangular matrix".to_string(),
                ));
            }
        }
        if let MapStyle::Custom(palette) = &self.map_style
            && let Some(bad) = palette.colors().find(|c| parse_hex_color(c).is_none())
        {
            return Err(DungeonError::InvalidConfig(format!(
                "map_style colour {bad:?} is not #rrggbb"
            )));
        }
        if self.cell_size == 0 {
            return Err(DungeonError::InvalidConfig(
                "cell_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_n_rows() -> usize {
    39
}
fn default_n_cols() -> usize {
    39
}
fn default_room_min() -> usize {
    3
}
fn default_room_max() -> usize {
    9
}
fn default_corridor_layout() -> u32 {
    50
}
fn default_remove_deadends() -> u32 {
    50
}
fn default_add_stairs() -> usize {
    2
}
fn default_cell_size() -> u32 {
    18
}

impl Default for DungeonParams {
    fn default() -> Self {
        Self {
            seed: 0,
            n_rows: 39,
            n_cols: 39,
            dungeon_layout: DungeonLayout::default(),
            room_min: 3,
            room_max: 9,
            room_layout: RoomLayout::default(),
            corridor_layout: 50,
            remove_deadends: 50,
            add_stairs: 2,
            max_door: 0,
            map_style: MapStyle::default(),
            cell_size: 18,
        }
    }
}
