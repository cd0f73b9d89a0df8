use clap::Parser;
use dungeongen::render::{RenderOptions, render_ascii, save_png};
use dungeongen::{Dungeon, DungeonParams};
use std::fs;
use std::path::PathBuf;

/// Генератор подземелий
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Путь к конфигурационному файлу в формате TOML (по умолчанию: стандартные параметры)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Переопределить seed из конфигурации
    #[arg(short, long)]
    seed: Option<i64>,

    /// Путь для сохранения карты (по умолчанию: ./dungeon.png)
    #[arg(short, long, default_value = "dungeon.png")]
    output: PathBuf,

    /// Дополнительно сохранить подземелье в JSON
    #[arg(short, long)]
    json: Option<PathBuf>,

    /// Вывести карту в консоль текстом
    #[arg(short, long)]
    ascii: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    println!("🔍 Загрузка конфигурации...");
    let mut params = match &cli.config {
        Some(path) => DungeonParams::from_toml_file(path)?,
        None => DungeonParams::default(),
    };
    if let Some(seed) = cli.seed {
        params.seed = seed;
    }

    println!(
        "Генерация подземелья (seed: {}, размер: {}×{})...",
        params.seed, params.n_rows, params.n_cols
    );
    let dungeon = Dungeon::generate(&params)?;
    println!(
        "Комнат: {}, дверей: {}, коридоров: {}, лестниц: {}",
        dungeon.rooms().len(),
        dungeon.doors().len(),
        dungeon.corridors().len(),
        dungeon.stairs().len()
    );

    if cli.ascii {
        println!("\n{}", render_ascii(&dungeon));
    }

    println!("Сохранение в {:?}", cli.output);
    save_png(&dungeon, &RenderOptions::from_params(&params), &cli.output)?;

    if let Some(path) = &cli.json {
        println!("Сохранение JSON в {path:?}");
        fs::write(path, dungeon.to_json()?)?;
    }

    println!("\nГотово! Подземелье сохранено.");
    Ok(())
}
