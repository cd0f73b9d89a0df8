//! Клетка сетки: флаги роли и владелец
//!
//! Флаги описывают роль клетки (комната, коридор, периметр, дверь, лестница).
//! Идентификатор владельца (комнаты или коридора) хранится отдельным полем
//! и имеет смысл только пока установлен `ROOM` или `CORRIDOR`.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Флаги роли клетки
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CellFlags: u16 {
        const BLOCKED = 1;
        const ROOM = 1 << 1;
        const CORRIDOR = 1 << 2;
        const PERIMETER = 1 << 3;
        const ENTRANCE = 1 << 4;
        const DOOR = 1 << 5;
        const STAIR_DN = 1 << 11;
        const STAIR_UP = 1 << 12;
        const BETWEEN = 1 << 13;

        /// Проходимое пространство
        const OPENSPACE = Self::ROOM.bits() | Self::CORRIDOR.bits() | Self::ENTRANCE.bits();
        const ESPACE = Self::ENTRANCE.bits() | Self::DOOR.bits();
        const STAIRS = Self::STAIR_DN.bits() | Self::STAIR_UP.bits();

        /// Нельзя ставить комнату
        const BLOCK_ROOM = Self::BLOCKED.bits() | Self::ROOM.bits();
        /// Нельзя прокладывать коридор
        const BLOCK_CORR = Self::BLOCKED.bits()
            | Self::PERIMETER.bits()
            | Self::CORRIDOR.bits()
            | Self::ROOM.bits();
        /// Нельзя открывать дверь
        const BLOCK_DOOR = Self::BLOCKED.bits() | Self::DOOR.bits();
    }
}

const OWNER_ROLES: CellFlags = CellFlags::ROOM.union(CellFlags::CORRIDOR);

/// Одна клетка сетки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cell {
    flags: CellFlags,
    owner: Option<u32>,
}

impl Cell {
    pub const EMPTY: Cell = Cell {
        flags: CellFlags::empty(),
        owner: None,
    };

    #[must_use]
    pub const fn with_flags(flags: CellFlags) -> Self {
        Self { flags, owner: None }
    }

    #[must_use]
    pub fn flags(self) -> CellFlags {
        self.flags
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.flags.is_empty()
    }

    #[must_use]
    pub fn contains(self, flags: CellFlags) -> bool {
        self.flags.contains(flags)
    }

    #[must_use]
    pub fn intersects(self, flags: CellFlags) -> bool {
        self.flags.intersects(flags)
    }

    pub fn insert(&mut self, flags: CellFlags) {
        self.flags.insert(flags);
    }

    /// Снимает флаги. Если у клетки не осталось ни `ROOM`, ни `CORRIDOR`,
    /// владелец сбрасывается вместе с ними.
    pub fn remove(&mut self, flags: CellFlags) {
        self.flags.remove(flags);
        if !self.flags.intersects(OWNER_ROLES) {
            self.owner = None;
        }
    }

    pub fn clear(&mut self) {
        *self = Self::EMPTY;
    }

    /// Помечает клетку как часть комнаты `id`
    pub fn set_room(&mut self, id: u32) {
        self.flags.insert(CellFlags::ROOM);
        self.owner = Some(id);
    }

    /// Помечает клетку как часть коридора `id`
    pub fn set_corridor(&mut self, id: u32) {
        self.flags.insert(CellFlags::CORRIDOR);
        self.owner = Some(id);
    }

    /// Прорубает коридор: клетка теряет комнату, вход и владельца
    pub fn carve(&mut self) {
        self.flags.remove(CellFlags::ROOM | CellFlags::ENTRANCE);
        self.flags.insert(CellFlags::CORRIDOR);
        self.owner = None;
    }

    #[must_use]
    pub fn owner(self) -> Option<u32> {
        self.owner
    }

    #[must_use]
    pub fn room_id(self) -> Option<u32> {
        if self.flags.contains(CellFlags::ROOM) {
            self.owner
        } else {
            None
        }
    }

    #[must_use]
    pub fn corridor_id(self) -> Option<u32> {
        if self.flags.contains(CellFlags::CORRIDOR) {
            self.owner
        } else {
            None
        }
    }
}

/// Сторона света
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
    West,
    East,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// Смещение по строкам
    #[must_use]
    pub const fn di(self) -> isize {
        match self {
            Direction::North => -1,
            Direction::South => 1,
            Direction::West | Direction::East => 0,
        }
    }

    /// Смещение по столбцам
    #[must_use]
    pub const fn dj(self) -> isize {
        match self {
            Direction::West => -1,
            Direction::East => 1,
            Direction::North | Direction::South => 0,
        }
    }

    #[must_use]
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::East => Direction::West,
        }
    }

    /// Порядковый номер в `ALL`
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::South => 1,
            Direction::West => 2,
            Direction::East => 3,
        }
    }
}
