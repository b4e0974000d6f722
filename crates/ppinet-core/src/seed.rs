//! Curated starter set of cancer-related genes.
//!
//! Every entry uses a category from the seeded palette, so seeding never
//! needs a category review. Seeding goes through
//! [`KnowledgeCache::commit_enrichment`], which leaves genes that are
//! already cached untouched.

use anyhow::Result;
use tracing::info;

use crate::cache::{CommitReport, KnowledgeCache};
use crate::model::PendingGene;

const TUMOR_SUPPRESSOR: &str = "Tumor Suppressor";
const ONCOGENE: &str = "Oncogene";
const KINASE: &str = "Kinase";
const TRANSCRIPTION_FACTOR: &str = "Transcription Factor";

/// `(symbol, category, description)` for every curated gene.
pub const CURATED_GENES: &[(&str, &str, &str)] = &[
    ("TP53", TUMOR_SUPPRESSOR, "Guardian of the genome, master tumor suppressor"),
    ("BRCA1", TUMOR_SUPPRESSOR, "DNA repair, hereditary breast/ovarian cancer"),
    ("BRCA2", TUMOR_SUPPRESSOR, "DNA repair, hereditary breast/ovarian cancer"),
    ("PTEN", TUMOR_SUPPRESSOR, "Phosphatase, PI3K/AKT pathway inhibitor"),
    ("ATM", TUMOR_SUPPRESSOR, "DNA damage checkpoint kinase"),
    ("RB1", TUMOR_SUPPRESSOR, "Retinoblastoma protein, cell cycle regulator"),
    ("APC", TUMOR_SUPPRESSOR, "Wnt signaling pathway regulator"),
    ("VHL", TUMOR_SUPPRESSOR, "Von Hippel-Lindau tumor suppressor"),
    ("WT1", TUMOR_SUPPRESSOR, "Wilms tumor suppressor"),
    ("MEN1", TUMOR_SUPPRESSOR, "Multiple endocrine neoplasia type 1"),
    ("CHEK2", TUMOR_SUPPRESSOR, "Checkpoint kinase 2, DNA damage response"),
    ("NBN", TUMOR_SUPPRESSOR, "Nijmegen breakage syndrome protein"),
    ("PALB2", TUMOR_SUPPRESSOR, "BRCA2 partner in DNA repair"),
    ("BARD1", TUMOR_SUPPRESSOR, "BRCA1-associated RING domain protein"),
    ("MLH1", TUMOR_SUPPRESSOR, "DNA mismatch repair"),
    ("MSH2", TUMOR_SUPPRESSOR, "DNA mismatch repair"),
    ("MSH6", TUMOR_SUPPRESSOR, "DNA mismatch repair"),
    ("PMS2", TUMOR_SUPPRESSOR, "DNA mismatch repair"),
    ("STK11", TUMOR_SUPPRESSOR, "Serine/threonine kinase, Peutz-Jeghers syndrome"),
    ("SMAD4", TUMOR_SUPPRESSOR, "TGF-beta signaling pathway"),
    ("EGFR", ONCOGENE, "Epidermal growth factor receptor, tyrosine kinase"),
    ("ERBB2", ONCOGENE, "HER2, receptor tyrosine kinase, breast cancer"),
    ("MYC", ONCOGENE, "Master transcription factor, cell proliferation"),
    ("KRAS", ONCOGENE, "RAS family GTPase, highly mutated in cancer"),
    ("HRAS", ONCOGENE, "RAS family GTPase"),
    ("NRAS", ONCOGENE, "RAS family GTPase"),
    ("JUN", ONCOGENE, "AP-1 transcription factor"),
    ("FOS", ONCOGENE, "AP-1 transcription factor"),
    ("ABL1", ONCOGENE, "Tyrosine kinase, BCR-ABL fusion in CML"),
    ("BCL2", ONCOGENE, "Anti-apoptotic protein"),
    ("MET", ONCOGENE, "Hepatocyte growth factor receptor"),
    ("RET", ONCOGENE, "Receptor tyrosine kinase"),
    ("ROS1", ONCOGENE, "Receptor tyrosine kinase"),
    ("FLT3", ONCOGENE, "Tyrosine kinase receptor, AML"),
    ("KIT", ONCOGENE, "Stem cell factor receptor"),
    ("PDGFRA", ONCOGENE, "Platelet-derived growth factor receptor"),
    ("AKT1", KINASE, "Serine/threonine kinase, PI3K/AKT pathway"),
    ("PIK3CA", KINASE, "PI3-kinase catalytic subunit alpha"),
    ("CDK4", KINASE, "Cyclin-dependent kinase 4, cell cycle"),
    ("CDK6", KINASE, "Cyclin-dependent kinase 6, cell cycle"),
    ("BRAF", KINASE, "Serine/threonine kinase, MAPK pathway"),
    ("RAF1", KINASE, "Serine/threonine kinase, MAPK pathway"),
    ("MAP2K1", KINASE, "MEK1, MAPK pathway"),
    ("ALK", KINASE, "Anaplastic lymphoma kinase"),
    ("SRC", KINASE, "Proto-oncogene tyrosine kinase"),
    ("AKT2", KINASE, "Serine/threonine kinase, PI3K/AKT pathway"),
    ("AKT3", KINASE, "Serine/threonine kinase, PI3K/AKT pathway"),
    ("PIK3R1", KINASE, "PI3-kinase regulatory subunit"),
    ("MTOR", KINASE, "Mechanistic target of rapamycin"),
    ("JAK2", KINASE, "Janus kinase 2"),
    ("MAP2K2", KINASE, "MEK2, MAPK pathway"),
    ("CCND1", TRANSCRIPTION_FACTOR, "Cyclin D1, cell cycle regulator"),
    ("E2F1", TRANSCRIPTION_FACTOR, "E2F family, cell cycle transcription"),
    ("STAT3", TRANSCRIPTION_FACTOR, "Signal transducer and activator of transcription"),
    ("NFKB1", TRANSCRIPTION_FACTOR, "NF-kappa-B, inflammation and immunity"),
    ("HIF1A", TRANSCRIPTION_FACTOR, "Hypoxia-inducible factor 1-alpha"),
    ("ESR1", TRANSCRIPTION_FACTOR, "Estrogen receptor alpha"),
    ("FOXA1", TRANSCRIPTION_FACTOR, "Forkhead box protein A1"),
    ("CDKN2A", TRANSCRIPTION_FACTOR, "p16INK4a, cell cycle inhibitor"),
    ("CDKN1A", TRANSCRIPTION_FACTOR, "p21, CDK inhibitor"),
    ("E2F3", TRANSCRIPTION_FACTOR, "E2F family, cell cycle transcription"),
    ("MDM2", TRANSCRIPTION_FACTOR, "E3 ubiquitin ligase, p53 regulator"),
    ("MYCN", TRANSCRIPTION_FACTOR, "MYC family, neuroblastoma"),
    ("NOTCH1", TRANSCRIPTION_FACTOR, "Notch signaling pathway"),
    ("CTNNB1", TRANSCRIPTION_FACTOR, "Beta-catenin, Wnt signaling"),
];

/// The curated set as pending genes ready to commit.
#[must_use]
pub fn curated_genes() -> Vec<PendingGene> {
    CURATED_GENES
        .iter()
        .map(|(symbol, category, description)| PendingGene {
            symbol: (*symbol).to_string(),
            category: (*category).to_string(),
            description: (*description).to_string(),
        })
        .collect()
}

/// Add every curated gene that is not cached yet.
///
/// # Errors
///
/// Returns [`crate::PpiError::CacheWrite`] if the commit rolls back.
pub fn seed_curated_genes(cache: &mut KnowledgeCache) -> Result<CommitReport> {
    let report = cache.commit_enrichment(&[], &curated_genes())?;
    info!(
        added = report.genes_written,
        already_cached = report.already_cached.len(),
        "seeded curated genes"
    );
    Ok(report)
}
