//! ID3 decision trees and bagged ensembles over categorical records.
//!
//! Records are fixed-width rows of non-negative integers. One column is the
//! target label; the others are candidate split attributes. Trees are
//! induced with entropy-based information gain, and ensembles train each
//! member on a bootstrap sample and classify by majority vote. A record whose
//! attribute value was never seen at a split is reported as
//! [`Prediction::Unclassifiable`] rather than forced into a label.

mod config;
mod dataset;
mod error;
mod evaluate;
mod forest;
mod gain;
mod importance;
mod node;
mod oob;
mod predict;
mod result;
mod tree;

pub use config::{ForestConfig, OobMode};
pub use dataset::Dataset;
pub use error::Id3Error;
pub use evaluate::{ConfusionEntry, Evaluation, LabelMetrics};
pub use forest::Forest;
pub use gain::{choose_split_attribute, entropy, information_gain, majority_label};
pub use importance::RankedAttribute;
pub use node::{AttributeIndex, Node, NodeIndex};
pub use oob::OobScore;
pub use predict::{Prediction, VoteTally};
pub use result::{ForestResult, TrainingMetadata};
pub use tree::{DecisionTree, TreeConfig};
