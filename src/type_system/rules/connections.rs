//! Rule: children are wired to slots their parent declares, with legal arity.
use crate::store::InstanceFactory;
use crate::tree::ParseNode;
use crate::type_system::error::{TreeError, TreeErrorType};
use indexmap::IndexMap;

pub(crate) fn check_slots(factory: &InstanceFactory, children: &[ParseNode]) -> Vec<TreeError> {
    let mut errors = Vec::new();
    let mut counts: IndexMap<&str, usize> = IndexMap::new();

    for child in children {
        let slot = child.slot();
        *counts.entry(slot).or_insert(0) += 1;
        if factory.param(slot).is_none() {
            errors.push(TreeError::new(
                TreeErrorType::InvalidNodeConnection,
                format!("'{}' has no input named '{slot}'", factory.name()),
            ));
        }
    }

    for (slot, count) in counts {
        if count > 1 && factory.param(slot).map_or(false, |info| !info.is_array) {
            errors.push(TreeError::new(
                TreeErrorType::InvalidNodeConnection,
                format!("'{}' input '{slot}' accepts one connection but has {count}", factory.name()),
            ));
        }
    }

    for info in factory.params().filter(|info| info.is_required) {
        if !children.iter().any(|c| c.slot() == info.name) {
            errors.push(TreeError::new(
                TreeErrorType::InputNotConnected,
                format!("'{}' requires input '{}'", factory.name(), info.name),
            ));
        }
    }
    errors
}
