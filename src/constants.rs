pub const MIN_KMER_SIZE: usize = 3;

pub const CONTIG_FILE: &str = "contigs.fa";
pub const SETCOVER_FILE: &str = "setcover.csv";
pub const GRAPH_CACHE_FILE: &str = "graph.bin";

pub const CONTIG_PREFIX: &str = "contig_";

// a compacted DBG node has at most 4 neighbors per side (one per base)
pub const NEIGHBORS_PER_SIDE: usize = 4;
