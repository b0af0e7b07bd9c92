use otmap::otmap_map::Map;
use otmap::otmap_render::{MapRenderer, MinimapPainter};
use otmap::{load_map, save_map, Config};

use clap::{Parser, Subcommand};
use env_logger::Env;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// RON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the header and registry sizes of a map.
    Info { map: PathBuf },
    /// Convert between .otbm and .otcm, picked by extension.
    Convert { input: PathBuf, output: PathBuf },
    /// Render minimap sections to PNG files.
    Render {
        map: PathBuf,
        /// Only render this floor.
        #[arg(long)]
        floor: Option<u8>,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::read_file(path)?,
        None => Config::default(),
    };

    match cli.command {
        Command::Info { map } => {
            let map = open(&config, &map)?;
            print_info(&map);
        }
        Command::Convert { input, output } => {
            let map = open(&config, &input)?;
            save_map(&map, &output, &config)?;
            log::info!("Wrote '{}'", output.display());
        }
        Command::Render { map, floor } => {
            let map = Arc::new(open(&config, &map)?);
            let bounds = map.bounds();
            let mut renderer = MapRenderer::new(map, Arc::new(MinimapPainter), &config.render)?;
            renderer.render_bounds(&bounds, floor);
            renderer.finish();
        }
    }

    Ok(())
}

fn open(config: &Config, path: &Path) -> Result<Map, Box<dyn Error>> {
    let mut map = Map::new(config.load_catalog()?);
    load_map(&mut map, path)?;
    Ok(map)
}

fn print_info(map: &Map) {
    let info = &map.info;
    println!("size:         {}x{}", info.width, info.height);
    println!("description:  {}", info.description);
    if let Some(spawns) = &info.spawn_file {
        println!("spawn file:   {}", spawns.display());
    }
    if let Some(houses) = &info.house_file {
        println!("house file:   {}", houses.display());
    }
    println!("tiles:        {}", map.tiles.tile_count());
    if let Some((min, max)) = map.bounds().extremes() {
        println!("bounds:       {} .. {}", min, max);
    }
    println!("houses:       {}", map.houses.len());
    println!("towns:        {}", map.towns.len());
    println!("waypoints:    {}", map.waypoints.len());
}
