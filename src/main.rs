use clap::Parser;
use colortig::cli;
use colortig::components;
use colortig::constants;
use colortig::gfa;
use colortig::graph::Ccdbg;
use colortig::traverse::DfsEngine;
use colortig::utils;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

fn main() {
    let args = cli::Cli::parse();

    simple_logger::SimpleLogger::new()
        .with_level(args.log_level_filter())
        .init()
        .unwrap();

    if args.kmer_size < constants::MIN_KMER_SIZE {
        log::error!("K-mer size must be at least {}", constants::MIN_KMER_SIZE);
        std::process::exit(1);
    }
    if args.max_paths < 1 {
        log::error!("--max-paths must be at least 1");
        std::process::exit(1);
    }

    let output_dir = Path::new(args.output_dir.as_str());
    if !output_dir.exists() {
        std::fs::create_dir_all(output_dir).unwrap();
    } else if !output_dir.is_dir() {
        log::error!("Output directory is not a directory.");
        std::process::exit(1);
    }

    let cache_path = output_dir.join(constants::GRAPH_CACHE_FILE);
    let start = std::time::Instant::now();
    let mut graph: Ccdbg;

    if let Some(gfa_file) = &args.graph {
        let colors_file = match &args.colors {
            Some(c) => c,
            None => {
                log::error!("A color table (--colors) is required when loading a GFA.");
                std::process::exit(1);
            }
        };
        graph = match gfa::load_graph(Path::new(gfa_file), Path::new(colors_file), args.kmer_size) {
            Ok(g) => g,
            Err(e) => {
                log::error!("{}", e);
                std::process::exit(1);
            }
        };
        bincode::serialize_into(
            BufWriter::new(File::create(&cache_path).unwrap()),
            &graph,
        )
        .unwrap();
    } else {
        if !cache_path.exists() {
            log::error!("No input graph provided and no cached graph found. See --help for usage.");
            std::process::exit(1);
        }
        graph = bincode::deserialize_from(BufReader::new(File::open(&cache_path).unwrap())).unwrap();
        if let Err(e) = graph.validate() {
            log::error!("{}", e);
            std::process::exit(1);
        }
    }
    log::info!("Time elapsed for loading the graph is: {:?}", start.elapsed());
    utils::log_memory_usage("graph loaded");

    graph.assign_ids();

    let start = std::time::Instant::now();
    let uf = match components::connected_components(&graph) {
        Ok(uf) => uf,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };
    log::info!(
        "Graph has {} unitigs in {} connected components ({} colors)",
        graph.len(),
        components::count_components(&uf),
        graph.num_colors
    );
    log::info!("Time elapsed for connected components is: {:?}", start.elapsed());

    let contig_path = output_dir.join(constants::CONTIG_FILE);
    let contig_file = match File::create(&contig_path) {
        Ok(f) => f,
        Err(e) => {
            log::error!("Couldn't open contig file: {}", e);
            std::process::exit(1);
        }
    };
    let mut writer = BufWriter::new(contig_file);

    let start = std::time::Instant::now();
    let mut engine = DfsEngine::new(&graph, args.min_novel);
    let num_contigs = match engine.merge(&mut writer, args.max_paths, args.min_entropy) {
        Ok(n) => n,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = writer.flush() {
        log::error!("Couldn't finish writing contigs: {}", e);
        std::process::exit(1);
    }
    log::info!(
        "Wrote {} contigs to {}",
        num_contigs,
        contig_path.display()
    );
    log::info!("Time elapsed for traversal is: {:?}", start.elapsed());

    if args.setcover_csv {
        let csv_path = output_dir.join(constants::SETCOVER_FILE);
        let mut csv_writer = BufWriter::new(File::create(&csv_path).unwrap());
        if let Err(e) = engine.setcover().write_csv(&mut csv_writer) {
            log::error!("{}", e);
            std::process::exit(1);
        }
        log::info!("Wrote set cover summary to {}", csv_path.display());
    }

    utils::log_memory_usage("done");
}
