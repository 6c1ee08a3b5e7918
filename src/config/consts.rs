/// Suffix of compressed image files.
pub const COMPRESSED_SUFFIX: &str = ".gz";
/// Extension of uncompressed image files that rename rules are declared against.
pub const UNCOMPRESSED_EXTENSION: &str = ".nii";

/// Placeholder filled with the basename of the primary anatomical input.
pub const ANAT_PLACEHOLDER: &str = "anat";
/// Placeholder filled with the basename of the configured atlas file.
pub const ATLAS_PLACEHOLDER: &str = "atlas";

/// Identity node exposing the configured input files of a run.
pub const INPUT_FILES_NODE: &str = "input_files";
/// Collector node receiving every `(category, file)` pair of a run.
pub const DATASINK_NODE: &str = "datasink";
/// Name of the parent graph every workflow box is attached to.
pub const MAIN_WORKFLOW_NAME: &str = "main_workflow";

/// Folder created next to `data_dir` when no output directory is configured.
pub const DEFAULT_OUTPUT_DIR: &str = "out";
/// Folder created next to `data_dir` when no working directory is configured.
pub const DEFAULT_WORK_DIR: &str = "wd";
/// Folder below `<work_dir>/<workflow>` where failed node reports are written.
pub const CRASHDUMP_DIR: &str = "log";

/// Concurrency used when the platform cannot report its parallelism.
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;
/// Statistic reported per connectivity edge by the tractography workflow.
pub const DEFAULT_FA_TRACT_STAT: &str = "mean";
