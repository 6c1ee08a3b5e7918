#[cfg(test)]
mod integration_tests {
    use std::collections::BTreeSet;
    use std::path::PathBuf;
    use std::sync::Arc;

    use crate::backends::local::Identity;
    use crate::composer::{Boundary, MainWorkflow, WorkflowBox};
    use crate::errors::GraphError;
    use crate::graph::{Graph, NodeSpec, PortRef};
    use crate::rename::{DataSink, RenameRule};

    fn main_wf() -> MainWorkflow {
        MainWorkflow::new(
            "main_workflow",
            &[
                ("anat".to_string(), PathBuf::from("/data/sub01/mprage.nii")),
                ("pet".to_string(), PathBuf::from("/data/sub01/pet.nii")),
            ],
            DataSink::new("/data/out"),
        )
        .unwrap()
    }

    /// A box with one processing node between `in_file` and each output field.
    fn simple_box(name: &str, outputs: &[&str]) -> WorkflowBox {
        let input_id = format!("{}_input", name);
        let output_id = format!("{}_output", name);
        let mut wf = WorkflowBox::new(
            name,
            Boundary::new(&input_id, &["in_file"]),
            Boundary::new(&output_id, outputs),
        )
        .unwrap();
        let step = wf
            .graph_mut()
            .declare_node(
                NodeSpec::new("step", Arc::new(Identity))
                    .inputs(["in_file"])
                    .outputs(outputs.iter().copied()),
            )
            .unwrap();
        let input = wf.input("in_file");
        wf.graph_mut()
            .connect(input, PortRef::new(&step, "in_file"))
            .unwrap();
        for field in outputs {
            let target = wf.output(field);
            wf.graph_mut()
                .connect(PortRef::new(&step, *field), target)
                .unwrap();
        }
        wf
    }

    fn connection_set(graph: &Graph) -> BTreeSet<String> {
        graph.connections().iter().map(|c| c.to_string()).collect()
    }

    /// One producer into the box, two box outputs into the sink, no cycles.
    #[test]
    fn test_box_wired_between_producer_and_sink() {
        let mut parent = Graph::new("parent");
        let producer = parent
            .declare_node(NodeSpec::identity("producer", ["in_file"]))
            .unwrap();
        let sink = parent.declare_node(NodeSpec::collector("sink")).unwrap();

        let handle = crate::composer::compose_box(&mut parent, simple_box("wf", &["out_a", "out_b"])).unwrap();
        parent
            .connect(PortRef::new(&producer, "in_file"), handle.input("in_file"))
            .unwrap();
        parent.connect(handle.output("out_a"), PortRef::new(&sink, "out_a")).unwrap();
        parent.connect(handle.output("out_b"), PortRef::new(&sink, "out_b")).unwrap();

        assert_eq!(parent.incoming(handle.input_boundary()).count(), 1);
        assert_eq!(parent.outgoing(handle.output_boundary()).count(), 2);
        assert!(parent.validate().is_ok());
        for node in parent.nodes() {
            for next in parent.successors(node.id()) {
                assert!(!parent.is_reachable(next, node.id()));
            }
        }
    }

    /// Composing boxes in either order yields the same nodes and connections.
    #[test]
    fn test_composition_order_is_commutative() {
        let build = |order: [&str; 2]| {
            let mut main = main_wf();
            for name in order {
                let modality = if name == "anat_wf" { "anat" } else { "pet" };
                let handle = main.compose(simple_box(name, &["result"])).unwrap();
                let mut attachment = main.attach(handle);
                attachment
                    .feed_input(modality, "in_file")
                    .unwrap()
                    .drain("result", &format!("{}.@result", name))
                    .unwrap();
                attachment.finish();
            }
            let (graph, _sink) = main.into_parts();
            let nodes: BTreeSet<String> = graph.nodes().map(|n| n.id().to_string()).collect();
            (nodes, connection_set(&graph))
        };

        assert_eq!(build(["anat_wf", "pet_wf"]), build(["pet_wf", "anat_wf"]));
    }

    /// Extend first, then connect: the optional branch ends at the new output port.
    fn anat_like_box(with_atlas: bool) -> WorkflowBox {
        let mut wf = WorkflowBox::new(
            "anat_wf",
            Boundary::new("anat_wf_input", &["in_file"]),
            Boundary::new("anat_wf_output", &["anat_mni"]),
        )
        .unwrap();
        if with_atlas {
            wf.extend_inputs(&["atlas_file"]).unwrap();
            wf.extend_outputs(&["atlas_anat"]).unwrap();
        }

        let (in_file, anat_mni) = (wf.input("in_file"), wf.output("anat_mni"));
        wf.graph_mut().connect(in_file, anat_mni).unwrap();

        if with_atlas {
            let warp = wf
                .graph_mut()
                .declare_node(
                    NodeSpec::new("warp_atlas", Arc::new(Identity))
                        .inputs(["apply_to_files"])
                        .outputs(["normalized_files"]),
                )
                .unwrap();
            let (atlas_file, atlas_anat) = (wf.input("atlas_file"), wf.output("atlas_anat"));
            let graph = wf.graph_mut();
            graph
                .connect(atlas_file, PortRef::new(&warp, "apply_to_files"))
                .unwrap();
            graph
                .connect(PortRef::new(&warp, "normalized_files"), atlas_anat)
                .unwrap();
        }
        wf
    }

    /// Optional ports exist only when the predicate holds, and are wired by one path.
    #[test]
    fn test_conditional_branch_changes_only_the_optional_ports() {
        for with_atlas in [false, true] {
            let wf = anat_like_box(with_atlas);
            assert_eq!(wf.has_input("atlas_file"), with_atlas);
            assert_eq!(wf.has_output("atlas_anat"), with_atlas);
            assert!(wf.has_output("anat_mni"));
            let into_atlas = wf.graph().incoming_to(&wf.output("atlas_anat")).is_some();
            assert_eq!(into_atlas, with_atlas);

            let mut main = main_wf();
            let handle = main.compose(wf).unwrap();
            let mut attachment = main.attach(handle);
            attachment.feed_input("anat", "in_file").unwrap();
            attachment.drain("anat_mni", "anat.@mni").unwrap();
            let attached = attachment
                .drain_if_present("atlas_anat", "anat.@atlas")
                .unwrap();
            let record = attachment.finish();

            assert_eq!(attached, with_atlas);
            assert_eq!(record.outbound.len(), if with_atlas { 2 } else { 1 });
            assert!(main.graph().validate().is_ok());
        }
    }

    /// Rules from a later attachment are appended after the earlier ones.
    #[test]
    fn test_rename_rules_accumulate_across_attachments() {
        let mut main = main_wf();
        for (name, modality, rule) in [
            ("anat_wf", "anat", RenameRule::new(r"/c1mprage.*nii$", "/mprage_gm.nii")),
            ("pet_wf", "pet", RenameRule::new(r"/wpet\.nii$", "/pet_mni.nii")),
        ] {
            let handle = main.compose(simple_box(name, &["result"])).unwrap();
            let mut attachment = main.attach(handle);
            attachment.feed_input(modality, "in_file").unwrap();
            attachment.rename_rules(vec![rule]).unwrap();
            attachment.finish();
        }

        let patterns: Vec<String> = main
            .sink()
            .substitutions()
            .rules()
            .map(|r| r.pattern.clone())
            .collect();
        assert_eq!(
            patterns,
            vec![
                r"/c1mprage.*nii$",
                r"/c1mprage.*nii\.gz$",
                r"/wpet\.nii$",
                r"/wpet\.nii\.gz$",
            ]
        );
        assert_eq!(main.attachments().len(), 2);
        assert_eq!(main.attachments()[1].workflow, "pet_wf");
    }

    /// Two boxes cannot drain into the same sink category.
    #[test]
    fn test_shared_sink_category_is_rejected() {
        let mut main = main_wf();
        let a = main.compose(simple_box("a_wf", &["result"])).unwrap();
        main.attach(a).drain("result", "shared.@result").unwrap();
        let b = main.compose(simple_box("b_wf", &["result"])).unwrap();
        let err = main
            .attach(b)
            .drain("result", "shared.@result")
            .err()
            .unwrap();
        assert!(matches!(err, GraphError::PortAlreadyBound { .. }));
    }
}
