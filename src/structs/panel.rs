// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # Panel Module - *3D Labeled Container*
//!
//! Groups frames that share row and column labels under a third "items" axis,
//! e.g. time snapshots or a category dimension.
//!
//! ## Behaviour
//! - Every frame has the same row index (major axis) and column index (minor axis).
//! - Arithmetic and boolean operators accept scalars only. Comparisons accept
//!   a scalar or an identically-labeled panel. See [`crate::kernels::broadcast::panel`].

use std::fmt::{Display, Formatter};

use crate::enums::error::OpsError;
use crate::structs::frame::Frame;
use crate::structs::index::LabelIndex;

/// # Panel
///
/// ## Structure
/// - `items`: one label per frame.
/// - `frames`: the frames, all aligned on the same major and minor axes.
#[derive(Debug, Clone)]
pub struct Panel {
    pub items: LabelIndex,
    pub frames: Vec<Frame>,
}

impl Panel {
    /// Builds a panel, checking that every frame shares the first frame's axes.
    pub fn new(items: LabelIndex, frames: Vec<Frame>) -> Result<Self, OpsError> {
        if items.len() != frames.len() {
            return Err(OpsError::LengthMismatch {
                context: "Panel::new items",
                left: frames.len(),
                right: items.len(),
            });
        }
        if let Some(first) = frames.first() {
            let misaligned = frames
                .iter()
                .any(|f| !f.index.equals(&first.index) || !f.columns.equals(&first.columns));
            if misaligned {
                return Err(OpsError::Validation {
                    op: None,
                    message: "Panel frames must share row and column labels".into(),
                });
            }
        }
        Ok(Self { items, frames })
    }

    pub(crate) fn from_parts(items: LabelIndex, frames: Vec<Frame>) -> Self {
        Self { items, frames }
    }

    #[inline]
    pub fn n_items(&self) -> usize {
        self.frames.len()
    }

    /// Row labels shared by every frame.
    pub fn major_axis(&self) -> Option<&LabelIndex> {
        self.frames.first().map(|f| &f.index)
    }

    /// Column labels shared by every frame.
    pub fn minor_axis(&self) -> Option<&LabelIndex> {
        self.frames.first().map(|f| &f.columns)
    }

    /// Whether both panels carry equal labels on all three axes.
    pub fn is_identically_labeled(&self, other: &Panel) -> bool {
        if !self.items.equals(&other.items) {
            return false;
        }
        match (self.frames.first(), other.frames.first()) {
            (Some(a), Some(b)) => a.index.equals(&b.index) && a.columns.equals(&b.columns),
            (None, None) => true,
            _ => false,
        }
    }

    /// Frame for an item label.
    pub fn item(&self, label: impl Into<crate::Label>) -> Option<&Frame> {
        self.items.position(&label.into()).map(|i| &self.frames[i])
    }
}

impl Display for Panel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let (rows, cols) = self
            .frames
            .first()
            .map(|fr| (fr.n_rows(), fr.n_cols()))
            .unwrap_or((0, 0));
        writeln!(f, "Panel [{} items × {} rows × {} cols]", self.n_items(), rows, cols)?;
        for (label, frame) in self.items.labels().iter().zip(&self.frames) {
            writeln!(f, "Item: {}", label)?;
            write!(f, "{}", frame)?;
        }
        Ok(())
    }
}
