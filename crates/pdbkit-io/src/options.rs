//! Options controlling how coordinate files are read

/// Options for reading coordinate files
///
/// Shared by both parsers: model selection, heteroatom inclusion and
/// occupancy-rank conformer selection have the same meaning for PDB and
/// PDBML input.
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Which model to read from a multi-model file (None = first model)
    pub model: Option<usize>,
    /// Whether heteroatom records are included
    pub all_atoms: bool,
    /// Select the Nth-highest-occupancy conformer per atom identity
    /// (1-based); None returns every conformer
    pub occupancy_rank: Option<usize>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        ReadOptions {
            model: None,
            all_atoms: true,
            occupancy_rank: None,
        }
    }
}

impl ReadOptions {
    /// Create default read options (first model, all atoms, all conformers)
    pub fn new() -> Self {
        ReadOptions::default()
    }

    /// Exclude heteroatom records
    pub fn atoms_only(mut self) -> Self {
        self.all_atoms = false;
        self
    }

    /// Select a specific model from a multi-model file
    pub fn with_model(mut self, model: usize) -> Self {
        self.model = Some(model);
        self
    }

    /// Select the Nth-highest-occupancy conformer per atom identity
    ///
    /// Rank 0 means no selection (all conformers), matching an unset rank.
    pub fn with_occupancy_rank(mut self, rank: usize) -> Self {
        self.occupancy_rank = if rank == 0 { None } else { Some(rank) };
        self
    }
}
