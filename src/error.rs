use crate::cluster::node::NodeId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("unknown node id {}", .0.index())]
    UnknownNode(NodeId),
    #[error("cannot transfer load from a node to itself")]
    SelfTransfer,
}
