// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Camino deterministic tractography over preprocessed diffusion data.
//!
//! Depends on a composed `fsl_dti_preproc` box for the corrected diffusion
//! image, rotated gradients, brain mask and the atlas in diffusion space.

use super::tools::{self, tool_node, GET_AFFINE, GET_DATA_DIMS, GET_VOX_DIMS};
use super::AttachContext;
use crate::composer::{AttachmentRecord, Boundary, MainWorkflow, WorkflowBox};
use crate::errors::BuildError;
use crate::graph::PortRef;
use crate::traits::ToolProvider;

pub const CAMINO_TRACT: &str = "camino_tract";
pub const FSL_DTI_PREPROC: &str = "fsl_dti_preproc";

const INPUT_FIELDS: &[&str] = &["diff", "bvec", "bval", "mask", "atlas"];
const OUTPUT_FIELDS: &[&str] = &["tensor", "tracks", "connectivity", "mean_fa"];

/// `dti_output` field of the preprocessing box to tractography input field.
const DTI_FEEDS: &[(&str, &str)] = &[
    ("corrected", "diff"),
    ("bvec_rotated", "bvec"),
    ("brain_mask_diff", "mask"),
    ("atlas_diff", "atlas"),
];

const SINK_CATEGORIES: &[(&str, &str)] = &[
    ("tensor", "tract.@tensor"),
    ("tracks", "tract.@tracks"),
    ("connectivity", "tract.@connectivity"),
    ("mean_fa", "tract.@mean_fa"),
];

/// Build the tractography box: tensor fit, FA map, streamline tracking seeded
/// from the atlas, and a connectivity matrix summarized with `fa_tract_stat`.
pub fn camino_tractography(fa_tract_stat: &str, provider: &dyn ToolProvider) -> Result<WorkflowBox, BuildError> {
    let mut wf = WorkflowBox::new(
        CAMINO_TRACT,
        Boundary::new("tract_input", INPUT_FIELDS),
        Boundary::new("tract_output", OUTPUT_FIELDS),
    )?;
    let input = wf.input_boundary().clone();
    let output = wf.output_boundary().clone();

    let g = wf.graph_mut();
    let img2vox_diff = g.declare_node(tool_node("img2vox_diff", tools::camino_image2voxel("float"), provider))?;
    let img2vox_mask = g.declare_node(tool_node("img2vox_mask", tools::camino_image2voxel("short"), provider))?;
    let fsl2scheme = g.declare_node(tool_node("fsl2scheme", tools::camino_fsl2scheme(), provider))?;
    let dtifit = g.declare_node(tool_node("dtifit", tools::camino_dtifit(), provider))?;
    let fa = g.declare_node(tool_node("fa", tools::camino_fractional_anisotropy(), provider))?;
    let analyzeheader_fa = g.declare_node(tool_node(
        "analyzeheader_fa",
        tools::camino_analyze_header("double"),
        provider,
    ))?;
    let fa2nii = g.declare_node(tool_node("fa2nii", tools::create_nifti(), provider))?;
    let track = g.declare_node(tool_node("track", tools::camino_track(), provider))?;
    let conmat = g.declare_node(tool_node("conmat", tools::camino_conmat(fa_tract_stat), provider))?;

    g.connect_pairs(&input, &img2vox_diff, &[("diff", "in_file")])?;
    g.connect_pairs(&input, &fsl2scheme, &[("bvec", "bvec_file"), ("bval", "bval_file")])?;
    g.connect_pairs(&input, &track, &[("atlas", "seed_file")])?;
    g.connect_pairs(&input, &conmat, &[("atlas", "target_file")])?;
    g.connect_pairs(&input, &img2vox_mask, &[("mask", "in_file")])?;

    g.connect_pairs(&img2vox_diff, &dtifit, &[("voxel_order", "in_file")])?;
    g.connect_pairs(&img2vox_mask, &dtifit, &[("voxel_order", "bgmask")])?;
    g.connect_pairs(&fsl2scheme, &dtifit, &[("scheme", "scheme_file")])?;
    g.connect_pairs(&fsl2scheme, &fa, &[("scheme", "scheme_file")])?;

    g.connect_pairs(&dtifit, &fa, &[("tensor_fitted", "in_file")])?;
    g.connect_pairs(&dtifit, &output, &[("tensor_fitted", "tensor")])?;
    g.connect_pairs(&dtifit, &track, &[("tensor_fitted", "in_file")])?;
    g.connect_pairs(&track, &conmat, &[("tracked", "in_file")])?;
    g.connect_pairs(&track, &output, &[("tracked", "tracks")])?;

    // FA is written as raw doubles; give it the header and affine of the input image.
    g.connect_pairs(&fa, &analyzeheader_fa, &[("fa", "in_file")])?;
    g.connect_with(
        PortRef::new(&input, "diff"),
        PortRef::new(&analyzeheader_fa, "voxel_dims"),
        provider.transform(GET_VOX_DIMS),
    )?;
    g.connect_with(
        PortRef::new(&input, "diff"),
        PortRef::new(&analyzeheader_fa, "data_dims"),
        provider.transform(GET_DATA_DIMS),
    )?;
    g.connect_pairs(&analyzeheader_fa, &fa2nii, &[("header", "header_file")])?;
    g.connect_with(
        PortRef::new(&input, "diff"),
        PortRef::new(&fa2nii, "affine"),
        provider.transform(GET_AFFINE),
    )?;
    g.connect_pairs(&fa, &fa2nii, &[("fa", "data_file")])?;
    g.connect_pairs(&fa2nii, &conmat, &[("nifti_file", "scalar_file")])?;

    g.connect_pairs(
        &conmat,
        &output,
        &[("conmat_sc", "connectivity"), ("conmat_ts", "mean_fa")],
    )?;

    Ok(wf)
}

/// Compose the tractography box and feed it from the composed `fsl_dti_preproc` box.
///
/// # Errors
/// * `MissingCollaborator` - `fsl_dti_preproc` has not been composed; nothing is added
/// * `MissingInput` - the run has no `bval` file
pub fn attach_camino_tractography(
    main: &mut MainWorkflow,
    ctx: &AttachContext,
) -> Result<AttachmentRecord, BuildError> {
    let dti = main.require_box(CAMINO_TRACT, FSL_DTI_PREPROC)?;
    main.input_port(CAMINO_TRACT, "bval")?;

    let wf = camino_tractography(&ctx.fa_tract_stat, ctx.provider.as_ref())?;
    let handle = main.compose(wf)?;

    let mut attachment = main.attach(handle);
    attachment.feed_input("bval", "bval")?;
    for (dti_field, field) in DTI_FEEDS {
        let source = PortRef::new(dti.output_boundary(), *dti_field);
        attachment.feed(source, field)?;
    }
    for (field, category) in SINK_CATEGORIES {
        attachment.drain(field, category)?;
    }
    Ok(attachment.finish())
}
