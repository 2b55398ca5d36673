//! Master lines.

use std::sync::Arc;

use serde::Serialize;

use super::{Line, MasterLineId};

/// A grouping of several related numbered lines, typically variants of the
/// same corridor.
///
/// A master line may have zero lines when none of its detail records match
/// a known line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MasterLine {
    pub id: MasterLineId,
    pub number: String,
    pub name_el: String,
    pub name_en: String,
    pub lines: Vec<Arc<Line>>,
}
