//! Compiled-in shader manifest
//!
//! The set of shaders the renderer ships, as (source, artifact) filename
//! pairs, plus the default directory prefixes they are joined onto. Callers
//! with a bespoke layout supply their own prefixes; the filename pairs stay
//! fixed.

use std::path::Path;

use crate::batch::WorkItem;

/// Source and artifact filenames for every shader in the set
pub const SHADER_SET: &[(&str, &str)] = &[
    ("IndirectDrawBuild.comp", "IndirectDrawBuild.spv"),
    ("TLASInstBuild.comp", "TLASInstBuild.spv"),
    ("raytrace.rchit", "raytrace_chit.spv"),
    ("raytrace.rgen", "raytrace_rgen.spv"),
    ("raytrace.rmiss", "raytrace_rmiss.spv"),
    ("raytraceShadow.rmiss", "raytraceShadow_rmiss.spv"),
    ("Default.vert", "Default_vert.spv"),
    ("Default.frag", "Default_frag.spv"),
];

/// Directory the shader sources live in when none is given
pub const DEFAULT_SOURCE_DIR: &str = "src/PaperRenderer/Shaders";

/// Directory the compiled artifacts land in when none is given
pub const DEFAULT_OUTPUT_DIR: &str = "build/resources/shaders";

/// Joins every manifest pair onto the given directory prefixes
pub fn work_items(source_dir: &Path, output_dir: &Path) -> Vec<WorkItem> {
    SHADER_SET
        .iter()
        .map(|(source, dest)| WorkItem::new(source_dir.join(source), output_dir.join(dest)))
        .collect()
}

/// Manifest joined onto the default prefixes
pub fn default_work_items() -> Vec<WorkItem> {
    work_items(Path::new(DEFAULT_SOURCE_DIR), Path::new(DEFAULT_OUTPUT_DIR))
}
