use chain_hash::SparseGrid;
use chain_hash::geometry::Circle;
use chain_hash::geometry::Vector2;
use clap::Parser;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand_distr::Normal;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'n', long = "movers", default_value_t = 500)]
    movers: u32,

    #[arg(short = 't', long = "tile_side", default_value_t = 4.0)]
    tile_side: f32,

    #[arg(short = 's', long = "steps", default_value_t = 20)]
    steps: usize,

    #[arg(long = "seed", default_value_t = 7)]
    seed: u64,
}

const WORLD_SPREAD: f32 = 50.0;
const RADIUS: f32 = 0.75;

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut rng = SmallRng::seed_from_u64(args.seed);
    let spawn = Normal::new(0.0f32, WORLD_SPREAD).unwrap();
    let step = Normal::new(0.0f32, 1.0).unwrap();

    let mut grid: SparseGrid<u32, Circle<f32>> = SparseGrid::new(args.tile_side);
    for id in 0..args.movers {
        let center = Vector2::new(rng.sample(spawn), rng.sample(spawn));
        grid.insert(id, Circle::new(center, RADIUS));
    }
    println!(
        "Spawned {} movers over {} tiles of side {}",
        grid.len(),
        grid.tile_count(),
        grid.tile_side()
    );

    for tick in 0..args.steps {
        for id in 0..args.movers {
            let Some(&circle) = grid.get(&id) else {
                continue;
            };
            let offset = Vector2::new(rng.sample(step), rng.sample(step));
            grid.update(id, Circle::new(circle.center() + offset, circle.radius()));
        }

        // Each mover finds itself, and every contact is seen from both sides.
        let contacts = grid
            .iter()
            .map(|(_, circle)| grid.find(circle).len() - 1)
            .sum::<usize>()
            / 2;

        // Retire a random mover now and then.
        if rng.random_bool(0.2) {
            let id = rng.random_range(0..args.movers);
            if grid.erase(&id) {
                log::info!("tick {tick}: mover {id} retired");
            }
        }

        println!(
            "tick {tick:>3}: {} movers, {} tiles, {} contacts",
            grid.len(),
            grid.tile_count(),
            contacts
        );
    }
}
