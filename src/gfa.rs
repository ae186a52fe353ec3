use crate::colors::ColorSet;
use crate::graph::Ccdbg;
use crate::types::{ColorId, ColortigError};
use fxhash::FxHashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Loader for an already-built graph: GFA S/L records plus a tab-separated
/// color table. The table starts with a `samples <C>` header and then one row
/// per segment: `name  strand(+/-)  head_colors  tail_colors`, where the
/// color columns hold comma-separated sample ids or `-` for none.
struct ColorEntry {
    strand: bool,
    head: Vec<ColorId>,
    tail: Vec<ColorId>,
}

pub fn load_graph(
    gfa_path: &Path,
    colors_path: &Path,
    k: usize,
) -> Result<Ccdbg, ColortigError> {
    let (num_colors, color_table) = read_color_table(colors_path)?;
    let mut graph = Ccdbg::new(k, num_colors);

    let gfa_name = gfa_path.display().to_string();
    let reader = BufReader::new(File::open(gfa_path)?);
    let mut links: Vec<(String, bool, String, bool)> = Vec::new();

    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        match fields[0] {
            "S" => {
                if fields.len() < 3 {
                    return Err(malformed(&gfa_name, lineno, "S record needs name and sequence"));
                }
                let name = fields[1];
                graph.add_segment(name, fields[2])?;
                let entry = color_table.get(name).ok_or_else(|| {
                    malformed(&gfa_name, lineno, &format!("no color entry for segment '{}'", name))
                })?;
                graph.set_colors(
                    name,
                    entry.strand,
                    ColorSet::from_ids(num_colors, &entry.head),
                    ColorSet::from_ids(num_colors, &entry.tail),
                )?;
            }
            "L" => {
                if fields.len() < 5 {
                    return Err(malformed(&gfa_name, lineno, "L record needs four link fields"));
                }
                let from_fwd = parse_orientation(fields[2])
                    .ok_or_else(|| malformed(&gfa_name, lineno, "bad orientation"))?;
                let to_fwd = parse_orientation(fields[4])
                    .ok_or_else(|| malformed(&gfa_name, lineno, "bad orientation"))?;
                // segments may be declared after the links that use them
                links.push((fields[1].to_string(), from_fwd, fields[3].to_string(), to_fwd));
            }
            _ => {}
        }
    }

    for (from, from_fwd, to, to_fwd) in links {
        graph.add_link(&from, from_fwd, &to, to_fwd)?;
    }

    for name in color_table.keys() {
        if graph.unitig_by_name(name).is_none() {
            log::warn!("color table entry '{}' has no matching segment", name);
        }
    }

    graph.validate()?;
    log::debug!(
        "loaded {} unitigs with {} color(s) from {}",
        graph.len(),
        num_colors,
        gfa_name
    );
    Ok(graph)
}

fn parse_orientation(field: &str) -> Option<bool> {
    match field {
        "+" => Some(true),
        "-" => Some(false),
        _ => None,
    }
}

fn read_color_table(
    path: &Path,
) -> Result<(usize, FxHashMap<String, ColorEntry>), ColortigError> {
    let name = path.display().to_string();
    let reader = BufReader::new(File::open(path)?);
    let mut num_colors = None;
    let mut table = FxHashMap::default();

    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if num_colors.is_none() {
            if fields.len() != 2 || fields[0] != "samples" {
                return Err(malformed(&name, lineno, "expected 'samples <count>' header"));
            }
            let count: usize = fields[1]
                .parse()
                .map_err(|_| malformed(&name, lineno, "sample count is not a number"))?;
            if count == 0 {
                return Err(malformed(&name, lineno, "sample count must be positive"));
            }
            num_colors = Some(count);
            continue;
        }
        let c = num_colors.unwrap();
        if fields.len() != 4 {
            return Err(malformed(&name, lineno, "expected name, strand, head and tail columns"));
        }
        let strand = match fields[1] {
            "+" => true,
            "-" => false,
            _ => return Err(malformed(&name, lineno, "strand must be + or -")),
        };
        let head = parse_color_list(fields[2], c).ok_or_else(|| {
            malformed(&name, lineno, "bad head color list")
        })?;
        let tail = parse_color_list(fields[3], c).ok_or_else(|| {
            malformed(&name, lineno, "bad tail color list")
        })?;
        table.insert(fields[0].to_string(), ColorEntry { strand, head, tail });
    }

    match num_colors {
        Some(c) => Ok((c, table)),
        None => Err(malformed(&name, 0, "missing 'samples <count>' header")),
    }
}

fn parse_color_list(field: &str, num_colors: usize) -> Option<Vec<ColorId>> {
    if field == "-" {
        return Some(Vec::new());
    }
    let mut ids = Vec::new();
    for part in field.split(',') {
        let id: ColorId = part.parse().ok()?;
        if id >= num_colors {
            return None;
        }
        ids.push(id);
    }
    Some(ids)
}

fn malformed(path: &str, lineno: usize, msg: &str) -> ColortigError {
    ColortigError::MalformedInput {
        path: path.to_string(),
        msg: format!("line {}: {}", lineno + 1, msg),
    }
}
