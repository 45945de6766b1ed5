use crate::dataset::Dataset;

/// Set of pathways, one bit per pathway index.
pub type PathMask = u64;

/// Static gene -> pathway mapping.
#[derive(Debug, Clone)]
pub struct AnnotationTable {
    names: Vec<String>,
    gene_masks: Vec<PathMask>,
}

impl AnnotationTable {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let num_genes = dataset.num_genes();
        let mut gene_masks = vec![0; num_genes];
        for (p, members) in dataset.annotation.iter().enumerate() {
            for (g, &is_member) in members.iter().enumerate() {
                if is_member {
                    gene_masks[g] |= 1 << p;
                }
            }
        }
        Self {
            names: dataset.pathways.clone(),
            gene_masks,
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn num_pathways(&self) -> usize {
        self.names.len()
    }

    pub fn num_genes(&self) -> usize {
        self.gene_masks.len()
    }

    #[inline(always)]
    pub fn mask(&self, gene: usize) -> PathMask {
        self.gene_masks[gene]
    }

    pub fn masks(&self) -> &[PathMask] {
        &self.gene_masks
    }

    /// Genes belonging to `pathway`, ascending.
    pub fn members(&self, pathway: usize) -> impl Iterator<Item = usize> + '_ {
        self.gene_masks
            .iter()
            .enumerate()
            .filter(move |(_, &m)| m & (1 << pathway) != 0)
            .map(|(g, _)| g)
    }
}
