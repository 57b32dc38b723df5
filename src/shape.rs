//! Heap shape data model
//!
//! A shape is one observed object's reference layout at one collection pass.
//! Shapes are grouped into epochs (one per pass), and a benchmark run's
//! recording is an ordered sequence of epochs.
//!
//! ```text
//! ShapesCorpus
//! └─ Epoch (one collection pass)
//!    └─ ShapeRecord { kind, address, offsets }
//! ```

use serde::{Serialize, Serializer};
use std::fmt;

/// Layout class of an observed object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// Flat array of scalar values, no outgoing references
    ValueArray,
    /// Homogeneous array of object references
    ObjectArray,
    /// Object with an explicit (possibly empty) list of reference offsets
    Generic,
}

/// One observed object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeRecord {
    pub kind: ShapeKind,
    /// Object start address
    pub address: u64,
    /// Reference slot offsets relative to `address`, in recorded order.
    /// Only meaningful for [`ShapeKind::Generic`].
    pub offsets: Vec<i64>,
}

impl ShapeRecord {
    pub fn value_array(address: u64) -> Self {
        Self {
            kind: ShapeKind::ValueArray,
            address,
            offsets: Vec::new(),
        }
    }

    pub fn object_array(address: u64) -> Self {
        Self {
            kind: ShapeKind::ObjectArray,
            address,
            offsets: Vec::new(),
        }
    }

    pub fn generic(address: u64, offsets: Vec<i64>) -> Self {
        Self {
            kind: ShapeKind::Generic,
            address,
            offsets,
        }
    }
}

/// All shapes observed during one collection pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Epoch {
    pub shapes: Vec<ShapeRecord>,
}

impl Epoch {
    pub fn new(shapes: Vec<ShapeRecord>) -> Self {
        Self { shapes }
    }
}

/// Full decoded content of one benchmark recording
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShapesCorpus {
    pub epochs: Vec<Epoch>,
}

impl ShapesCorpus {
    pub fn new(epochs: Vec<Epoch>) -> Self {
        Self { epochs }
    }

    /// Total number of shape records across all epochs
    pub fn shape_count(&self) -> usize {
        self.epochs.iter().map(|e| e.shapes.len()).sum()
    }

    /// Iterate every record of every epoch
    pub fn records(&self) -> impl Iterator<Item = &ShapeRecord> {
        self.epochs.iter().flat_map(|e| e.shapes.iter())
    }
}

/// Canonical identity of a shape, used for frequency grouping
///
/// Two offset sequences are the same pattern only if they are equal
/// element-for-element in the same order. Offsets render as a tuple literal,
/// so a single offset keeps its trailing comma: `(8,)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PatternKey {
    NoRef,
    ObjArray,
    Offsets(Vec<i64>),
}

impl fmt::Display for PatternKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternKey::NoRef => f.write_str("NoRef"),
            PatternKey::ObjArray => f.write_str("ObjArray"),
            PatternKey::Offsets(offsets) => {
                f.write_str("(")?;
                for (i, offset) in offsets.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", offset)?;
                }
                if offsets.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl Serialize for PatternKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
