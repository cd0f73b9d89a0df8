//! Ошибки генератора
//!
//! Сам конвейер генерации не падает: неудачная попытка поставить комнату или лестницу
//! просто уменьшает итоговое количество. Ошибки возникают только на границах:
//! проверка конфигурации, чтение файлов и экспорт.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DungeonError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to serialize dungeon: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, DungeonError>;
