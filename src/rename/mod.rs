// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Output renaming.
//!
//! Produced artifacts carry tool-generated names (`c1sub01_corrected.nii`,
//! `y_sub01_corrected.nii`, ...). The sink maps them to discoverable names with
//! an ordered list of regex find/replace rules:
//!
//! 1. **Instantiate**: placeholder tokens such as `{anat}` are filled with the
//!    subject basename. Values are inserted literally, never as regex syntax.
//! 2. **Synthesize**: every rule ending in the uncompressed extension gets a
//!    parallel rule for the compressed variant, appended after the declared rules.
//! 3. **Install**: the rules are appended to the sink's [`SubstitutionList`].
//!    The list only grows and keeps declaration order across attachments.
//! 4. **Apply**: after execution each destination path is rewritten by the first
//!    matching rule; paths no rule matches keep their name.

mod rule;
mod sink;
mod substitutions;
mod synthesis;

pub use rule::{basename_token, Placeholders, RenameRule};
pub use sink::{category_folder, DataSink, SinkEntry};
pub use substitutions::{Rewrite, SubstitutionList};
pub use synthesis::{compressed_variants, with_compressed_variants};
