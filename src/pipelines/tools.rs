// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Port signatures and default settings of the external tools the bundled
//! workflows use. Settings are bound as node configuration, so every setting
//! name is also an input port.

use std::path::Path;

use crate::graph::{NodeSpec, PortValue};
use crate::traits::{ToolProvider, ToolSpec};

/// Named transforms resolved through the [`ToolProvider`].
pub const GET_VOX_DIMS: &str = "get_vox_dims";
pub const GET_DATA_DIMS: &str = "get_data_dims";
pub const GET_AFFINE: &str = "get_affine";

/// Declare a node running `spec`, with the body supplied by `provider` and the
/// tool's default settings bound.
pub fn tool_node(id: &str, spec: ToolSpec, provider: &dyn ToolProvider) -> NodeSpec {
    let body = provider.body(&spec);
    NodeSpec::new(id, body)
        .inputs(spec.inputs)
        .outputs(spec.outputs)
        .bind_all(spec.settings)
}

fn flags(a: bool, b: bool) -> PortValue {
    PortValue::List(vec![PortValue::Bool(a), PortValue::Bool(b)])
}

/// ANTs N4 bias-field correction.
pub fn n4_bias_field_correction() -> ToolSpec {
    ToolSpec::interface(
        "N4BiasFieldCorrection",
        &[
            "input_image",
            "dimension",
            "bspline_fitting_distance",
            "shrink_factor",
            "n_iterations",
            "convergence_threshold",
            "save_bias",
        ],
        &["output_image", "bias_image"],
    )
    .with("dimension", 3i64)
    .with("bspline_fitting_distance", 300i64)
    .with("shrink_factor", 3i64)
    .with("n_iterations", vec![50i64, 50, 30, 20])
    .with("convergence_threshold", 1e-6)
    .with("save_bias", true)
}

pub fn gunzip() -> ToolSpec {
    ToolSpec::interface("Gunzip", &["in_file"], &["out_file"])
}

/// SPM12 New Segment over six tissue classes of the given priors.
///
/// Each tissue is `((priors, class), gaussians, (native, dartel), (warped, modulated))`.
pub fn spm_new_segment(priors: &Path) -> ToolSpec {
    let tissue = |class: i64, gaussians: i64, native: (bool, bool), warped: (bool, bool)| {
        PortValue::List(vec![
            PortValue::List(vec![PortValue::path(priors), PortValue::Int(class)]),
            PortValue::Int(gaussians),
            flags(native.0, native.1),
            flags(warped.0, warped.1),
        ])
    };
    ToolSpec::interface(
        "NewSegment",
        &["channel_files", "channel_info", "tissues", "write_deformation_fields"],
        &[
            "native_class_images",
            "dartel_input_images",
            "modulated_class_images",
            "normalized_class_images",
            "transformation_mat",
            "bias_corrected_images",
            "bias_field_images",
            "forward_deformation_field",
            "inverse_deformation_field",
        ],
    )
    .with(
        "tissues",
        vec![
            tissue(1, 1, (true, true), (true, true)),
            tissue(2, 1, (true, true), (true, true)),
            tissue(3, 2, (true, true), (true, true)),
            tissue(4, 3, (true, true), (true, true)),
            tissue(5, 4, (true, false), (false, false)),
            tissue(6, 2, (false, false), (false, false)),
        ],
    )
    .with(
        "channel_info",
        PortValue::List(vec![
            PortValue::Float(0.0001),
            PortValue::Float(60.0),
            flags(true, true),
        ]),
    )
    .with("write_deformation_fields", vec![true, true])
}

/// SPM12 Normalise (write only): apply a deformation field to images.
pub fn spm_apply_deformations() -> ToolSpec {
    ToolSpec::interface(
        "Normalize12",
        &[
            "deformation_file",
            "apply_to_files",
            "write_bounding_box",
            "write_interp",
            "jobtype",
        ],
        &["normalized_files"],
    )
    .with("jobtype", "write")
}

/// Bounding box of an image, in world coordinates.
pub fn bounding_box() -> ToolSpec {
    ToolSpec::function("get_bounding_box", &["in_file"], &["bbox"])
}

/// Evaluate an image formula over named images.
pub fn math_img(images: &[&str]) -> ToolSpec {
    let mut inputs = vec!["formula", "out_file"];
    inputs.extend_from_slice(images);
    ToolSpec::function("math_img", &inputs, &["out_file"])
}

pub fn camino_image2voxel(out_type: &str) -> ToolSpec {
    ToolSpec::interface("Image2Voxel", &["in_file", "out_type"], &["voxel_order"])
        .with("out_type", out_type)
}

pub fn camino_fsl2scheme() -> ToolSpec {
    ToolSpec::interface("FSL2Scheme", &["bvec_file", "bval_file"], &["scheme"])
}

pub fn camino_dtifit() -> ToolSpec {
    ToolSpec::interface("DTIFit", &["in_file", "bgmask", "scheme_file"], &["tensor_fitted"])
}

pub fn camino_fractional_anisotropy() -> ToolSpec {
    ToolSpec::interface("ComputeFractionalAnisotropy", &["in_file", "scheme_file"], &["fa"])
}

pub fn camino_analyze_header(datatype: &str) -> ToolSpec {
    ToolSpec::interface(
        "AnalyzeHeader",
        &["in_file", "voxel_dims", "data_dims", "datatype"],
        &["header"],
    )
    .with("datatype", datatype)
}

pub fn create_nifti() -> ToolSpec {
    ToolSpec::interface("CreateNifti", &["header_file", "data_file", "affine"], &["nifti_file"])
}

pub fn camino_track() -> ToolSpec {
    ToolSpec::interface(
        "Track",
        &["in_file", "seed_file", "inputmodel", "out_file"],
        &["tracked"],
    )
    .with("inputmodel", "dt")
    .with("out_file", "tracts.Bfloat")
}

pub fn camino_conmat(tract_stat: &str) -> ToolSpec {
    ToolSpec::interface(
        "Conmat",
        &["in_file", "target_file", "scalar_file", "output_root", "tract_stat"],
        &["conmat_sc", "conmat_ts"],
    )
    .with("output_root", "conmat_")
    .with("tract_stat", tract_stat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::local::ToolRegistry;

    #[test]
    fn every_setting_is_an_input_port() {
        let specs = vec![
            n4_bias_field_correction(),
            spm_new_segment(Path::new("/opt/spm12/tpm/TPM.nii")),
            spm_apply_deformations(),
            math_img(&["gm", "wm", "csf"]),
            camino_image2voxel("float"),
            camino_analyze_header("double"),
            camino_track(),
            camino_conmat("mean"),
        ];
        for spec in specs {
            for setting in spec.settings.keys() {
                assert!(
                    spec.inputs.contains(setting),
                    "{} binds '{}' which is not an input",
                    spec.tool,
                    setting
                );
            }
        }
    }

    #[test]
    fn n4_defaults() {
        let spec = n4_bias_field_correction();
        assert_eq!(spec.settings.get("dimension"), Some(&PortValue::Int(3)));
        assert_eq!(spec.settings.get("bspline_fitting_distance"), Some(&PortValue::Int(300)));
        assert_eq!(
            spec.settings.get("n_iterations"),
            Some(&PortValue::List(vec![
                PortValue::Int(50),
                PortValue::Int(50),
                PortValue::Int(30),
                PortValue::Int(20)
            ]))
        );
        assert_eq!(spec.settings.get("convergence_threshold"), Some(&PortValue::Float(1e-6)));
        assert_eq!(spec.settings.get("save_bias"), Some(&PortValue::Bool(true)));
    }

    #[test]
    fn new_segment_uses_six_tissue_classes_over_the_priors() {
        let spec = spm_new_segment(Path::new("/tpm/TPM.nii"));
        let tissues = match spec.settings.get("tissues") {
            Some(PortValue::List(items)) => items.clone(),
            other => panic!("unexpected tissues setting {:?}", other),
        };
        assert_eq!(tissues.len(), 6);
        assert_eq!(tissues[0].paths(), vec![Path::new("/tpm/TPM.nii")]);
    }

    #[test]
    fn tool_node_binds_defaults() {
        let node = tool_node("track", camino_track(), &ToolRegistry::new());
        assert_eq!(node.input_ports().len(), 4);
        assert_eq!(node.output_ports(), ["tracked".to_string()]);
    }
}
