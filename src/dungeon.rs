//! Сборка подземелья
//!
//! Конвейер выполняется один раз и строго по порядку:
//! маска → комнаты → проёмы → коридоры → разметка → лестницы → тупики → сводка.
//! После сборки [`Dungeon`] неизменяем.

use crate::config::DungeonParams;
use crate::corridor::{Corridor, carve_corridors, derive_corridor_data, label_corridors};
use crate::deadend::collapse_tunnels;
use crate::door::{Door, finalize_doors, open_rooms};
use crate::error::Result;
use crate::grid::Grid;
use crate::map::{CellInfo, DungeonMap};
use crate::mask::apply_layout;
use crate::rng::DungeonRng;
use crate::room::{Room, emplace_rooms};
use crate::stairs::{Stair, attach_corridors, emplace_stairs};
use petgraph::graph::UnGraph;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Готовое подземелье
#[derive(Debug, Clone, Serialize)]
pub struct Dungeon {
    #[serde(skip)]
    params: DungeonParams,
    #[serde(skip)]
    grid: Grid,
    pub seed: i64,
    pub n_rows: usize,
    pub n_cols: usize,
    rooms: Vec<Room>,
    doors: Vec<Door>,
    corridors: Vec<Corridor>,
    stairs: Vec<Stair>,
    map: DungeonMap,
}

impl Dungeon {
    /// Генерирует подземелье по параметрам.
    ///
    /// Ошибка возможна только при некорректной конфигурации: сам конвейер
    /// не падает, а при нехватке места просто размещает меньше комнат и лестниц.
    pub fn generate(params: &DungeonParams) -> Result<Self> {
        params.validate()?;

        let mut rng = DungeonRng::new(params.seed);
        let mut grid = Grid::new(params.n_rows, params.n_cols);

        apply_layout(&mut grid, &params.dungeon_layout);
        let mut rooms = emplace_rooms(&mut grid, &mut rng, params);
        let builder = open_rooms(&mut grid, &mut rng, &mut rooms);
        carve_corridors(&mut grid, &mut rng, params.corridor_layout);
        let mut corridors = label_corridors(&mut grid);
        let mut stairs = emplace_stairs(&mut grid, &mut rng, params.add_stairs);
        collapse_tunnels(&mut grid, &mut rng, params.remove_deadends);

        let doors = finalize_doors(
            builder,
            &mut grid,
            &mut rooms,
            params.max_door,
            params.remove_deadends >= 100,
        );
        attach_corridors(&grid, &mut stairs);
        grid.empty_blocks();
        derive_corridor_data(&grid, &mut corridors, &doors, &stairs);
        let map = DungeonMap::build(&grid, &doors, &stairs);

        log::info!(
            "dungeon seed {} ({}×{}): {} rooms, {} doors, {} corridors, {} stairs",
            params.seed,
            grid.n_rows,
            grid.n_cols,
            rooms.len(),
            doors.len(),
            corridors.len(),
            stairs.len()
        );

        Ok(Self {
            params: params.clone(),
            seed: params.seed,
            n_rows: grid.n_rows,
            n_cols: grid.n_cols,
            grid,
            rooms,
            doors,
            corridors,
            stairs,
            map,
        })
    }

    #[must_use]
    pub fn params(&self) -> &DungeonParams {
        &self.params
    }

    /// Финальная сетка флагов
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    #[must_use]
    pub fn doors(&self) -> &[Door] {
        &self.doors
    }

    #[must_use]
    pub fn corridors(&self) -> &[Corridor] {
        &self.corridors
    }

    #[must_use]
    pub fn stairs(&self) -> &[Stair] {
        &self.stairs
    }

    #[must_use]
    pub fn map(&self) -> &DungeonMap {
        &self.map
    }

    /// Коридор по идентификатору. Идентификаторы после чистки идут с пропусками.
    #[must_use]
    pub fn corridor(&self, id: u32) -> Option<&Corridor> {
        self.corridors.iter().find(|c| c.id == id)
    }

    /// Запись карты; `None` для пустых клеток и координат вне сетки
    #[must_use]
    pub fn get_cell(&self, row: isize, col: isize) -> Option<&CellInfo> {
        self.map.get(row, col)
    }

    /// Граф связности комнат.
    ///
    /// Узлы графа хранят идентификаторы комнат. Ребро соединяет комнаты
    /// с общей дверью или с дверями в один и тот же коридор.
    #[must_use]
    pub fn room_graph(&self) -> UnGraph<u32, ()> {
        let mut graph = UnGraph::new_undirected();
        let mut id_to_node = HashMap::new();
        for room in &self.rooms {
            id_to_node.insert(room.id, graph.add_node(room.id));
        }

        let direct = self
            .rooms
            .iter()
            .flat_map(|room| room.connect.iter().map(move |&other| (room.id, other)));
        let shared = self.corridors.iter().flat_map(|corridor| {
            corridor.rooms.iter().enumerate().flat_map(move |(k, &a)| {
                corridor.rooms[k + 1..].iter().map(move |&b| (a, b))
            })
        });

        let mut edges = HashSet::new();
        for (a, b) in direct.chain(shared) {
            if a == b {
                continue;
            }
            let key = (a.min(b), a.max(b));
            if edges.insert(key)
                && let (Some(&na), Some(&nb)) = (id_to_node.get(&key.0), id_to_node.get(&key.1))
            {
                graph.add_edge(na, nb, ());
            }
        }
        graph
    }

    /// JSON-документ с комнатами, дверями, коридорами, лестницами и картой
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Генерирует независимые подземелья; порядок результатов совпадает с порядком параметров
#[cfg(feature = "parallel")]
#[must_use]
pub fn generate_many(params: &[DungeonParams]) -> Vec<Result<Dungeon>> {
    use rayon::prelude::*;

    params.par_iter().map(Dungeon::generate).collect()
}

/// Генерирует независимые подземелья; порядок результатов совпадает с порядком параметров
#[cfg(not(feature = "parallel"))]
#[must_use]
pub fn generate_many(params: &[DungeonParams]) -> Vec<Result<Dungeon>> {
    params.iter().map(Dungeon::generate).collect()
}
