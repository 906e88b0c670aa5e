use std::path::PathBuf;

use stacker_engine::{PieceKind, Rotation, ShapeOffsets, ShapeTable};

use crate::util::Output;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ShapesArg {
    /// Print the table as a loadable JSON definition instead of a drawing
    #[arg(long)]
    json: bool,
    /// Output file path for the JSON definition
    #[arg(long, requires = "json")]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &ShapesArg) -> anyhow::Result<()> {
    let table = ShapeTable::STANDARD;
    if arg.json {
        return Output::save_json(&table.to_definition(), arg.output.clone());
    }

    for kind in PieceKind::ALL {
        println!("{kind}:");
        let drawings: Vec<_> = (0..4)
            .map(|r| draw(table.offsets(kind, Rotation::new(r))))
            .collect();
        for row in 0..4 {
            let line: Vec<_> = drawings.iter().map(|d| d[row].as_str()).collect();
            println!("  {}", line.join("  "));
        }
    }
    Ok(())
}

/// Draws offsets inside a 4x4 box, anchor at the top-left corner.
fn draw(offsets: &ShapeOffsets) -> [String; 4] {
    std::array::from_fn(|row| {
        (0..4)
            .map(|col| {
                let covered = offsets
                    .iter()
                    .any(|o| usize::try_from(o.x) == Ok(col) && usize::try_from(-o.y) == Ok(row));
                if covered { '#' } else { '.' }
            })
            .collect()
    })
}
