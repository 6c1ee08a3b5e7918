// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::graph::{PortRef, PortValue};
use std::fmt;
use std::sync::Arc;

type TransformFn = dyn Fn(PortValue) -> Result<PortValue, String> + Send + Sync;

/// A pure function applied to a value while it travels along a connection.
///
/// Transforms never see the graph; they only map one value to another.
#[derive(Clone)]
pub struct Transform {
    name: String,
    func: Option<Arc<TransformFn>>,
}

impl Transform {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(PortValue) -> Result<PortValue, String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Some(Arc::new(func)),
        }
    }

    pub fn identity() -> Self {
        Self {
            name: "identity".to_string(),
            func: None,
        }
    }

    /// Select one element of a multi-valued output.
    pub fn select_index(index: usize) -> Self {
        Self::new(format!("select_index[{}]", index), move |value| match value {
            PortValue::List(mut items) => {
                if index < items.len() {
                    Ok(items.swap_remove(index))
                } else {
                    Err(format!(
                        "index {} out of range for a list of {} values",
                        index,
                        items.len()
                    ))
                }
            }
            other => Err(format!("expected a list, got {:?}", other)),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_identity(&self) -> bool {
        self.func.is_none()
    }

    pub fn apply(&self, value: PortValue) -> Result<PortValue, String> {
        match &self.func {
            Some(func) => func(value),
            None => Ok(value),
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform").field("name", &self.name).finish()
    }
}

/// A directed edge delivering one output port's value to one input port.
#[derive(Debug, Clone)]
pub struct Connection {
    pub source: PortRef,
    pub target: PortRef,
    pub transform: Transform,
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.transform.is_identity() {
            write!(f, "{} -> {}", self.source, self.target)
        } else {
            write!(f, "{} -[{}]-> {}", self.source, self.transform.name(), self.target)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_index_picks_one_element() {
        let list = PortValue::from(vec!["c1.nii", "c2.nii", "c3.nii"]);
        let picked = Transform::select_index(1).apply(list).unwrap();
        assert_eq!(picked, PortValue::text("c2.nii"));
    }

    #[test]
    fn select_index_rejects_out_of_range_and_scalars() {
        let list = PortValue::from(vec!["c1.nii"]);
        assert!(Transform::select_index(2).apply(list).is_err());
        assert!(Transform::select_index(0).apply(PortValue::Int(1)).is_err());
    }

    #[test]
    fn identity_passes_values_through() {
        let t = Transform::identity();
        assert!(t.is_identity());
        assert_eq!(t.apply(PortValue::Bool(true)).unwrap(), PortValue::Bool(true));
    }

    #[test]
    fn display_shows_transform_name() {
        let conn = Connection {
            source: PortRef::new("new_segment", "native_class_images"),
            target: PortRef::new("tissues", "gm"),
            transform: Transform::select_index(0),
        };
        assert_eq!(
            conn.to_string(),
            "new_segment.native_class_images -[select_index[0]]-> tissues.gm"
        );
    }
}
