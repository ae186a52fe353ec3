use crate::constants::CONTIG_PREFIX;
use crate::sequence::entropy;
use crate::types::ColortigError;
use std::io::Write;

/// Paths discovered from a single start node. Each path stores its
/// orientation-corrected unitig sequences from sink to source; the source end
/// is pushed last as the recursion unwinds.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Traceback {
    paths: Vec<Vec<String>>,
    pub success: bool,
}

impl Traceback {
    pub fn push_path(&mut self, path: Vec<String>) {
        self.paths.push(path);
    }

    /// Append the current unitig's sequence to every path returned from a
    /// deeper recursion level.
    pub fn push_to_all(&mut self, seq: &str) {
        for path in &mut self.paths {
            path.push(seq.to_string());
        }
    }

    /// Merge the paths of a recursively returned bundle into this one.
    pub fn join(&mut self, other: Traceback) {
        self.paths.extend(other.paths);
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn paths(&self) -> &[Vec<String>] {
        &self.paths
    }

    /// Stitch one sink-first path into a contig: the concatenation runs
    /// backwards over the pieces, so the source-end piece is emitted verbatim
    /// and every following piece loses its leading k-1 bases of overlap.
    pub fn cutconcat(path: &[String], k: usize) -> String {
        let mut contig = String::new();
        for (i, piece) in path.iter().rev().enumerate() {
            if i == 0 {
                contig.push_str(piece);
            } else {
                contig.push_str(&piece[k - 1..]);
            }
        }
        contig
    }

    /// Write every path as a FASTA record `>contig_<n>`, numbering from the
    /// shared counter. Contigs below the entropy threshold are dropped
    /// without consuming a number; 0 disables the filter.
    pub fn write<W: Write>(
        &self,
        out: &mut W,
        k: usize,
        counter: &mut usize,
        min_entropy: f64,
    ) -> Result<(), ColortigError> {
        for path in &self.paths {
            let contig = Self::cutconcat(path, k);
            if min_entropy > 0.0 {
                let h = entropy(&contig);
                if h < min_entropy {
                    log::debug!(
                        "dropping low-complexity contig of length {} (entropy {:.3})",
                        contig.len(),
                        h
                    );
                    continue;
                }
            }
            *counter += 1;
            writeln!(out, ">{}{}", CONTIG_PREFIX, counter)
                .map_err(ColortigError::OutputUnavailable)?;
            writeln!(out, "{}", contig).map_err(ColortigError::OutputUnavailable)?;
        }
        Ok(())
    }
}
