use std::{fs::File, io::BufWriter, path::Path, path::PathBuf, str::FromStr};

use anyhow::{bail, Context, Result};
use dyeflow::{Array2D, SimConfig, Simulation};
use structopt::StructOpt;

type Image = Array2D<[u8; 3]>;

const SOLID: [u8; 3] = [90, 90, 100];

#[derive(Debug, Clone, Copy)]
enum View {
    Dye,
    Speed,
    Divergence,
}

impl FromStr for View {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "dye" => View::Dye,
            "speed" => View::Speed,
            "divergence" => View::Divergence,
            other => bail!("Unknown view {:?}, expected dye, speed or divergence", other),
        })
    }
}

#[derive(Debug, StructOpt)]
#[structopt(name = "record", about = "Step a fluid scene without a window and write PNG frames.")]
struct Opt {
    /// RON scene file. A wind tunnel is used when omitted.
    #[structopt(short, long)]
    scene: Option<PathBuf>,

    /// Directory receiving 0.png, 1.png, ...
    #[structopt(short, long)]
    out: PathBuf,

    #[structopt(short, long, default_value = "120")]
    frames: usize,

    /// Simulation steps per written frame
    #[structopt(long, default_value = "1")]
    every: usize,

    /// Pixels per cell
    #[structopt(long, default_value = "4")]
    scale: usize,

    /// dye, speed or divergence
    #[structopt(short, long, default_value = "dye")]
    view: View,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Opt::from_args();

    let config = match &args.scene {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("Failed to load scene {}", path.display()))?,
        None => SimConfig::wind_tunnel(160, 90),
    };
    let mut sim = Simulation::new(config)?;

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("Failed to create {}", args.out.display()))?;

    for n in 0..args.frames {
        for _ in 0..args.every.max(1) {
            sim.step();
        }

        let path = args.out.join(format!("{}.png", n));
        write_png(&path, &render(&sim, args.view, args.scale.max(1)))?;
        log::info!(
            "{}/{} step {} dt {:.2e} residual {:.3e}",
            n + 1,
            args.frames,
            sim.steps(),
            sim.last_dt(),
            sim.divergence_residual()
        );
    }

    Ok(())
}

fn render(sim: &Simulation, view: View, scale: usize) -> Image {
    let grid = sim.grid();
    let (w, h) = (grid.width(), grid.height());

    // Normalize speed and divergence to the frame's extremes
    let peak = match view {
        View::Dye => 1.,
        View::Speed => grid.max_speed(),
        View::Divergence => (0..h)
            .flat_map(|j| (0..w).map(move |i| (i, j)))
            .map(|(i, j)| grid.divergence(i, j).abs())
            .fold(0., f32::max),
    };
    let norm = |x: f32| if peak > 0. { (x / peak).clamp(-1., 1.) } else { 0. };
    let byte = |x: f32| (x * 255.) as u8;

    let mut image = Image::new(w * scale, h * scale);
    for j in 0..h {
        for i in 0..w {
            let pixel = if grid.mask().is_solid(i, j) {
                SOLID
            } else {
                match view {
                    View::Dye => [byte(norm(grid.dye()[(i, j)]).max(0.)); 3],
                    View::Speed => {
                        let (u, v) = grid.uv();
                        let speed = if i + 1 < w && j + 1 < h {
                            let (vx, vy) = dyeflow::advect::cell_velocity(u, v, i, j);
                            vx.hypot(vy)
                        } else {
                            0.
                        };
                        let s = norm(speed);
                        [byte(s), byte(s * 0.5), byte(1. - s)]
                    }
                    // Red where flow converges, blue where it spreads
                    View::Divergence => {
                        let d = norm(grid.divergence(i, j));
                        [byte((-d).max(0.)), 0, byte(d.max(0.))]
                    }
                }
            };

            for y in j * scale..(j + 1) * scale {
                for x in i * scale..(i + 1) * scale {
                    image[(x, y)] = pixel;
                }
            }
        }
    }

    image
}

fn write_png(path: impl AsRef<Path>, image: &Image) -> Result<()> {
    let file = File::create(path)?;
    let w = &mut BufWriter::new(file);

    let mut encoder = png::Encoder::new(w, image.width() as _, image.height() as _);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header()?;
    let data: Vec<u8> = image.data().iter().copied().flatten().collect();
    writer.write_image_data(&data)?;

    Ok(())
}
