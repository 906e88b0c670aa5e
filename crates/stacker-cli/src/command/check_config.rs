use std::path::PathBuf;

use stacker_engine::PieceKind;

use crate::util;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct CheckConfigArg {
    /// Config file to check; the built-in defaults are checked when omitted
    path: Option<PathBuf>,
}

pub(crate) fn run(arg: &CheckConfigArg) -> anyhow::Result<()> {
    let config = util::load_config(arg.path.as_ref())?;
    match &arg.path {
        Some(path) => eprintln!("{} is valid", path.display()),
        None => eprintln!("Default configuration is valid"),
    }

    println!("grid:           {}x{}", config.grid.width, config.grid.height);
    println!(
        "cell size:      [{}, {}] at origin [{}, {}]",
        config.cell_size.x, config.cell_size.y, config.origin.x, config.origin.y
    );
    let spawn = config.spawn_anchor();
    println!("spawn anchor:   ({}, {})", spawn.x, spawn.y);
    println!("slide duration: {:?}", config.slide_duration());
    println!("fall interval:  {:?}", config.fall_interval());
    println!(
        "shape table:    {}",
        if config.shapes.is_some() {
            "custom"
        } else {
            "standard"
        }
    );
    for kind in PieceKind::ALL {
        println!("  {kind}: color {}", config.palette.color_for(kind));
    }
    println!("  plain: color {}", config.palette.plain);
    Ok(())
}
