// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! SPM12 anatomical preprocessing: bias-field correction, tissue segmentation,
//! MNI normalization, and an optional atlas warped into anatomical space.

use std::path::Path;

use super::tools::{self, tool_node};
use super::AttachContext;
use crate::composer::{AttachmentRecord, Boundary, MainWorkflow, WorkflowBox};
use crate::config::consts::{ANAT_PLACEHOLDER, ATLAS_PLACEHOLDER};
use crate::config::AtlasSelection;
use crate::errors::{BuildError, ConfigError};
use crate::graph::{NodeSpec, PortRef, Transform};
use crate::observability::messages::attachment::{OptionalBranchAttached, OptionalBranchSkipped};
use crate::observability::messages::StructuredLog;
use crate::rename::{basename_token, Placeholders, RenameRule};
use crate::traits::ToolProvider;

pub const SPM_ANAT_PREPROC: &str = "spm_anat_preproc";

const INPUT_FIELDS: &[&str] = &["in_file"];
const OUTPUT_FIELDS: &[&str] = &[
    "anat_mni",
    "tissues_warped",
    "tissues_native",
    "affine_transform",
    "warp_forward",
    "warp_inverse",
    "anat_biascorr",
    "brain_mask",
];
const ATLAS_INPUT: &str = "atlas_file";
const ATLAS_OUTPUT: &str = "atlas_anat";

const BRAIN_MASK_FILE: &str = "tissues_brain_mask.nii.gz";
const BRAIN_MASK_FORMULA: &str = "np.abs(gm + wm + csf) > 0";
const TISSUES: &[&str] = &["gm", "wm", "csf"];

/// Box output field to sink category.
const SINK_CATEGORIES: &[(&str, &str)] = &[
    ("anat_mni", "anat.@mni"),
    ("tissues_warped", "anat.tissues.warped"),
    ("tissues_native", "anat.tissues.native"),
    ("affine_transform", "anat.transform.@linear"),
    ("warp_forward", "anat.transform.@forward"),
    ("warp_inverse", "anat.transform.@inverse"),
    ("anat_biascorr", "anat.@biascor"),
    ("brain_mask", "anat.@brain_mask"),
];
const ATLAS_CATEGORY: &str = "anat.@atlas";

/// Build the anatomical preprocessing box.
///
/// With the atlas enabled the boundaries gain `atlas_file` and `atlas_anat`
/// before any internal connection is made, `atlas_file` is bound to the atlas
/// path, and the atlas is warped with the inverse deformation field.
pub fn spm_anat_preprocessing(
    atlas: &AtlasSelection,
    tpm_path: &Path,
    provider: &dyn ToolProvider,
) -> Result<WorkflowBox, BuildError> {
    let mut wf = WorkflowBox::new(
        SPM_ANAT_PREPROC,
        Boundary::new("anat_input", INPUT_FIELDS),
        Boundary::new("anat_output", OUTPUT_FIELDS),
    )?;

    if let Some(atlas_path) = atlas.path() {
        wf.extend_inputs(&[ATLAS_INPUT])?;
        wf.extend_outputs(&[ATLAS_OUTPUT])?;
        let input_boundary = wf.input_boundary().clone();
        wf.graph_mut().bind(&input_boundary, ATLAS_INPUT, atlas_path)?;
    }

    let g = wf.graph_mut();
    let biascor = g.declare_node(tool_node("bias_correction", tools::n4_bias_field_correction(), provider))?;
    let gunzip_anat = g.declare_node(tool_node("gunzip_anat", tools::gunzip(), provider))?;
    let segment = g.declare_node(tool_node("new_segment", tools::spm_new_segment(tpm_path), provider))?;
    let warp_anat = g.declare_node(tool_node("warp_anat", tools::spm_apply_deformations(), provider))?;
    let tpm_bbox = g.declare_node(
        tool_node("tpm_bbox", tools::bounding_box(), provider).bind("in_file", tpm_path),
    )?;
    let tissues = g.declare_node(NodeSpec::identity("tissues", TISSUES.iter().copied()))?;
    let brain_mask = g.declare_node(
        tool_node("brain_mask", tools::math_img(TISSUES), provider)
            .bind("out_file", BRAIN_MASK_FILE)
            .bind("formula", BRAIN_MASK_FORMULA),
    )?;

    let input = wf.input_boundary().clone();
    let output = wf.output_boundary().clone();
    let g = wf.graph_mut();

    g.connect(PortRef::new(&input, "in_file"), PortRef::new(&biascor, "input_image"))?;
    g.connect_pairs(&biascor, &gunzip_anat, &[("output_image", "in_file")])?;
    g.connect_pairs(&gunzip_anat, &segment, &[("out_file", "channel_files")])?;
    g.connect_pairs(
        &segment,
        &warp_anat,
        &[
            ("forward_deformation_field", "deformation_file"),
            ("bias_corrected_images", "apply_to_files"),
        ],
    )?;
    g.connect_pairs(&tpm_bbox, &warp_anat, &[("bbox", "write_bounding_box")])?;

    for (index, tissue) in TISSUES.iter().enumerate() {
        g.connect_with(
            PortRef::new(&segment, "native_class_images"),
            PortRef::new(&tissues, *tissue),
            Transform::select_index(index),
        )?;
    }
    g.connect_pairs(&tissues, &brain_mask, &[("gm", "gm"), ("wm", "wm"), ("csf", "csf")])?;

    g.connect_pairs(&warp_anat, &output, &[("normalized_files", "anat_mni")])?;
    g.connect_pairs(
        &segment,
        &output,
        &[
            ("modulated_class_images", "tissues_warped"),
            ("native_class_images", "tissues_native"),
            ("transformation_mat", "affine_transform"),
            ("forward_deformation_field", "warp_forward"),
            ("inverse_deformation_field", "warp_inverse"),
            ("bias_corrected_images", "anat_biascorr"),
        ],
    )?;
    g.connect_pairs(&brain_mask, &output, &[("out_file", "brain_mask")])?;

    if atlas.is_enabled() {
        let gunzip_atlas = g.declare_node(tool_node("gunzip_atlas", tools::gunzip(), provider))?;
        let anat_bbox = g.declare_node(tool_node("anat_bbox", tools::bounding_box(), provider))?;
        let warp_atlas = g.declare_node(
            tool_node("warp_atlas", tools::spm_apply_deformations(), provider).bind("write_interp", 0i64),
        )?;

        g.connect(PortRef::new(&input, ATLAS_INPUT), PortRef::new(&gunzip_atlas, "in_file"))?;
        g.connect_pairs(&gunzip_anat, &anat_bbox, &[("out_file", "in_file")])?;
        g.connect_pairs(&gunzip_atlas, &warp_atlas, &[("out_file", "apply_to_files")])?;
        g.connect_pairs(&segment, &warp_atlas, &[("inverse_deformation_field", "deformation_file")])?;
        g.connect_pairs(&anat_bbox, &warp_atlas, &[("bbox", "write_bounding_box")])?;
        g.connect_pairs(&warp_atlas, &output, &[("normalized_files", ATLAS_OUTPUT)])?;

        OptionalBranchAttached {
            workflow: SPM_ANAT_PREPROC,
            branch: "atlas",
            inputs: &[ATLAS_INPUT],
            outputs: &[ATLAS_OUTPUT],
        }
        .log();
    } else {
        OptionalBranchSkipped {
            workflow: SPM_ANAT_PREPROC,
            branch: "atlas",
            reason: "atlas normalization is not enabled",
        }
        .log();
    }

    Ok(wf)
}

/// Rename rules for the anatomical outputs, with `{anat}` and `{atlas}` unfilled.
///
/// Order matters: the first matching rule wins.
pub fn anat_rename_rules(atlas_enabled: bool) -> Vec<RenameRule> {
    let mut rules: Vec<RenameRule> = [
        (r"/{anat}_.*corrected_seg8.mat$", "/{anat}_to_mni_affine.mat"),
        (r"/m{anat}.*_corrected.nii$", "/{anat}_biascorrected.nii"),
        (r"/wm{anat}.*_corrected.nii$", "/{anat}_mni.nii"),
        (r"/y_{anat}.*nii$", "/{anat}_to_mni_field.nii"),
        (r"/iy_{anat}.*nii$", "/{anat}_to_mni_inv_field.nii"),
        (r"/mwc1{anat}.*nii$", "/{anat}_gm_mod_mni.nii"),
        (r"/mwc2{anat}.*nii$", "/{anat}_wm_mod_mni.nii"),
        (r"/mwc3{anat}.*nii$", "/{anat}_csf_mod_mni.nii"),
        (r"/mwc4{anat}.*nii$", "/{anat}_nobrain_mod_mni.nii"),
        (r"/c1{anat}.*nii$", "/{anat}_gm.nii"),
        (r"/c2{anat}.*nii$", "/{anat}_wm.nii"),
        (r"/c3{anat}.*nii$", "/{anat}_csf.nii"),
        (r"/c4{anat}.*nii$", "/{anat}_nobrain.nii"),
        (r"/c5{anat}.*nii$", "/{anat}_nobrain_mask.nii"),
    ]
    .iter()
    .map(|(pattern, replacement)| RenameRule::new(*pattern, *replacement))
    .collect();

    if atlas_enabled {
        rules.push(RenameRule::new(r"/w{atlas}\.nii$", "/{atlas}_anat_space.nii"));
    }
    rules
}

/// Compose the anatomical box into `main`, feed it the `anat` input, drain
/// its outputs into the sink, and install its rename rules.
///
/// # Errors
/// * `MissingInput` - the run has no `anat` file
/// * `MissingSetting` - no tissue probability map is configured
pub fn attach_spm_anat_preprocessing(
    main: &mut MainWorkflow,
    ctx: &AttachContext,
) -> Result<AttachmentRecord, BuildError> {
    let anat_file = main
        .input_file("anat")
        .ok_or_else(|| ConfigError::MissingInput {
            workflow: SPM_ANAT_PREPROC.to_string(),
            modality: "anat".to_string(),
        })?
        .to_path_buf();
    let tpm_path = ctx.tpm_path.as_deref().ok_or_else(|| ConfigError::MissingSetting {
        workflow: SPM_ANAT_PREPROC.to_string(),
        key: "spm.tpm_path".to_string(),
    })?;

    let mut placeholders = Placeholders::new().with(ANAT_PLACEHOLDER, basename_token(&anat_file));
    if let Some(atlas) = ctx.atlas.basename() {
        placeholders.insert(ATLAS_PLACEHOLDER, atlas);
    }
    let rules = anat_rename_rules(ctx.atlas.is_enabled())
        .iter()
        .map(|rule| rule.instantiate(&placeholders))
        .collect();

    let wf = spm_anat_preprocessing(&ctx.atlas, tpm_path, ctx.provider.as_ref())?;
    let handle = main.compose(wf)?;

    let mut attachment = main.attach(handle);
    attachment.feed_input("anat", "in_file")?;
    for (field, category) in SINK_CATEGORIES {
        attachment.drain(field, category)?;
    }
    attachment.drain_if_present(ATLAS_OUTPUT, ATLAS_CATEGORY)?;
    attachment.rename_rules(rules)?;
    Ok(attachment.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::local::ToolRegistry;
    use crate::errors::GraphError;
    use crate::graph::NodeId;
    use crate::rename::DataSink;
    use std::path::PathBuf;
    use std::sync::Arc;

    const TPM: &str = "/opt/spm12/tpm/TPM.nii";

    fn ctx(atlas: AtlasSelection) -> AttachContext {
        AttachContext {
            atlas,
            tpm_path: Some(PathBuf::from(TPM)),
            fa_tract_stat: "mean".to_string(),
            provider: Arc::new(ToolRegistry::new()),
        }
    }

    fn main_wf(inputs: &[(&str, &str)]) -> MainWorkflow {
        let inputs: Vec<(String, PathBuf)> = inputs
            .iter()
            .map(|(m, p)| (m.to_string(), PathBuf::from(p)))
            .collect();
        MainWorkflow::new("main_workflow", &inputs, DataSink::new("/data/out")).unwrap()
    }

    fn fields(graph: &crate::graph::Graph, node: &str, outputs: bool) -> Vec<String> {
        let node = graph.find_node(node).unwrap();
        if outputs {
            node.output_ports().to_vec()
        } else {
            node.input_ports().to_vec()
        }
    }

    #[test]
    fn without_atlas_the_boundaries_have_the_base_fields() {
        let wf = spm_anat_preprocessing(&AtlasSelection::Disabled, Path::new(TPM), &ToolRegistry::new()).unwrap();
        assert_eq!(fields(wf.graph(), "anat_input", false), vec!["in_file"]);
        assert_eq!(fields(wf.graph(), "anat_output", true), OUTPUT_FIELDS.to_vec());
        assert!(wf.graph().find_node("warp_atlas").is_none());
        wf.graph().validate().unwrap();
    }

    #[test]
    fn with_atlas_the_boundaries_gain_the_atlas_fields() {
        let atlas = AtlasSelection::Enabled(PathBuf::from("/atlases/aal.nii.gz"));
        let wf = spm_anat_preprocessing(&atlas, Path::new(TPM), &ToolRegistry::new()).unwrap();

        assert_eq!(fields(wf.graph(), "anat_input", false), vec!["in_file", "atlas_file"]);
        assert!(wf.has_output("atlas_anat"));

        let input = wf.graph().find_node("anat_input").unwrap();
        assert_eq!(
            input.bound_config().get("atlas_file").and_then(|v| v.as_path()),
            Some(Path::new("/atlases/aal.nii.gz"))
        );

        let warp_atlas = NodeId::from("warp_atlas");
        let segment = NodeId::from("new_segment");
        assert!(wf.graph().is_reachable(&segment, &warp_atlas));
        assert!(wf.graph().incoming_to(&PortRef::new("anat_output", "atlas_anat")).is_some());
        wf.graph().validate().unwrap();
    }

    #[test]
    fn tissues_are_selected_by_index() {
        let wf = spm_anat_preprocessing(&AtlasSelection::Disabled, Path::new(TPM), &ToolRegistry::new()).unwrap();
        let csf = wf.graph().incoming_to(&PortRef::new("tissues", "csf")).unwrap();
        assert_eq!(csf.transform.name(), "select_index[2]");
    }

    #[test]
    fn rule_order_puts_the_atlas_rule_last() {
        let rules = anat_rename_rules(true);
        assert_eq!(rules.len(), 15);
        assert_eq!(rules[0].pattern, r"/{anat}_.*corrected_seg8.mat$");
        assert_eq!(rules[14].pattern, r"/w{atlas}\.nii$");
        assert_eq!(anat_rename_rules(false).len(), 14);
    }

    #[test]
    fn attach_wires_inputs_sink_and_rules() {
        let mut main = main_wf(&[("anat", "/data/sub01/mprage.nii.gz")]);
        let record = attach_spm_anat_preprocessing(&mut main, &ctx(AtlasSelection::Disabled)).unwrap();

        assert_eq!(record.inbound.len(), 1);
        assert_eq!(record.outbound.len(), SINK_CATEGORIES.len());
        assert_eq!(record.rules.len(), 14);
        assert_eq!(record.rules[9].pattern, "/c1mprage.*nii$");
        main.graph().validate().unwrap();

        // c1 through c5 and the other .nii rules each gain a compressed variant.
        let sink = main.sink();
        assert!(sink.substitutions().len() > 14);
        let renamed = sink.destination("anat.tissues.native", Path::new("/wd/c1mprage_corrected.nii.gz"));
        assert_eq!(renamed, PathBuf::from("/data/out/anat/tissues/native/mprage_gm.nii.gz"));
    }

    #[test]
    fn attach_with_atlas_drains_the_atlas_category() {
        let mut main = main_wf(&[("anat", "/data/sub01/mprage.nii")]);
        let atlas = AtlasSelection::Enabled(PathBuf::from("/atlases/aal.nii"));
        let record = attach_spm_anat_preprocessing(&mut main, &ctx(atlas)).unwrap();

        assert_eq!(record.outbound.len(), SINK_CATEGORIES.len() + 1);
        assert!(record
            .outbound
            .iter()
            .any(|m| m.target == PortRef::new(main.datasink(), ATLAS_CATEGORY)));
        assert_eq!(record.rules[14].pattern, r"/waal\.nii$");
    }

    #[test]
    fn attach_without_anat_is_a_missing_input() {
        let mut main = main_wf(&[("pet", "/data/sub01/pet.nii")]);
        let err = attach_spm_anat_preprocessing(&mut main, &ctx(AtlasSelection::Disabled)).unwrap_err();
        assert!(matches!(
            err,
            BuildError::Config(ConfigError::MissingInput { ref modality, .. }) if modality == "anat"
        ));
        assert_eq!(main.graph().boxes().len(), 0);
    }

    #[test]
    fn attach_without_priors_is_a_missing_setting() {
        let mut main = main_wf(&[("anat", "/data/sub01/mprage.nii")]);
        let mut context = ctx(AtlasSelection::Disabled);
        context.tpm_path = None;
        let err = attach_spm_anat_preprocessing(&mut main, &context).unwrap_err();
        assert!(matches!(err, BuildError::Config(ConfigError::MissingSetting { .. })));
    }

    #[test]
    fn attaching_twice_is_a_duplicate_box() {
        let mut main = main_wf(&[("anat", "/data/sub01/mprage.nii")]);
        attach_spm_anat_preprocessing(&mut main, &ctx(AtlasSelection::Disabled)).unwrap();
        let err = attach_spm_anat_preprocessing(&mut main, &ctx(AtlasSelection::Disabled)).unwrap_err();
        assert!(matches!(err, BuildError::Graph(GraphError::DuplicateNode { .. })));
    }
}
