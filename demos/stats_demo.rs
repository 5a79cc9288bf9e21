use chain_hash::HashMap;
use chain_hash::HashMultiMap;
use clap::Parser;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'n', long = "entries", default_value_t = 1000)]
    entries: usize,

    #[arg(short = 'l', long = "max_load_factor", default_value_t = 1.0)]
    max_load_factor: f32,

    #[arg(short = 'd', long = "duplicates", default_value_t = 1)]
    duplicates: usize,

    /// Reserve room for every entry up front instead of growing on demand.
    #[arg(short = 'r', long = "reserve")]
    reserve: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    println!(
        "Filling map with {} entries, max load factor {}",
        args.entries, args.max_load_factor
    );

    let mut map: HashMap<u64, u64> = HashMap::new();
    if let Err(err) = map.set_max_load_factor(args.max_load_factor) {
        eprintln!("Cannot use max load factor {}: {err}", args.max_load_factor);
        return;
    }
    if args.reserve {
        map.reserve(args.entries);
        println!("Reserved {} buckets", map.bucket_count());
    }

    let mut rehashes = 0;
    for key in 0..args.entries as u64 {
        let before = map.bucket_count();
        map.insert(key, key * key);
        if map.bucket_count() != before {
            rehashes += 1;
        }
    }

    println!(
        "Inserted {} entries, {} rehashes, {} buckets",
        map.len(),
        rehashes,
        map.bucket_count()
    );
    map.chain_stats().print();

    if args.duplicates > 1 {
        println!();
        println!(
            "Filling multimap with {} keys x {} duplicates",
            args.entries, args.duplicates
        );

        let mut multi: HashMultiMap<u64, usize> = HashMultiMap::new();
        if let Err(err) = multi.set_max_load_factor(args.max_load_factor) {
            eprintln!("Cannot use max load factor {}: {err}", args.max_load_factor);
            return;
        }
        for copy in 0..args.duplicates {
            for key in 0..args.entries as u64 {
                multi.insert(key, copy);
            }
        }

        let distinct = (0..args.entries as u64)
            .filter(|key| multi.count(key) == args.duplicates)
            .count();
        println!("{distinct} keys hold all {} duplicates", args.duplicates);
        multi.chain_stats().print();
    }
}
