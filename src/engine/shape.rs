// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Tensor signature compatibility.

use crate::graph::TensorDescriptor;

/// Whether two tensor signatures line up slot by slot.
///
/// Either side being absent means the shape is unknown, which never counts as
/// compatible. Lists of different length are incompatible. Slots are compared
/// by datatype, rank and every dimension; tensor names are ignored.
pub fn compatible(a: Option<&[TensorDescriptor]>, b: Option<&[TensorDescriptor]>) -> bool {
    let (Some(a), Some(b)) = (a, b) else {
        return false;
    };

    a.len() == b.len()
        && a.iter().zip(b).all(|(left, right)| {
            left.datatype == right.datatype
                && left.rank() == right.rank()
                && left.shape == right.shape
        })
}

/// Human-readable rendering of a signature for diagnostics.
pub fn describe(tensors: Option<&[TensorDescriptor]>) -> String {
    match tensors {
        None => "<unknown>".to_string(),
        Some(tensors) => {
            let slots: Vec<String> = tensors
                .iter()
                .map(|t| format!("{}{:?}", t.datatype, t.shape))
                .collect();
            format!("[{}]", slots.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tensor(name: &str, datatype: &str, shape: &[i64]) -> TensorDescriptor {
        TensorDescriptor::new(name, datatype, shape.to_vec())
    }

    #[test]
    fn test_absent_is_never_compatible() {
        let present = vec![tensor("a", "BYTES", &[1])];
        assert!(!compatible(None, Some(&present)));
        assert!(!compatible(Some(&present), None));
        assert!(!compatible(None, None));
    }

    #[test]
    fn test_empty_lists_are_compatible() {
        assert!(compatible(Some(&[]), Some(&[])));
    }

    #[test]
    fn test_names_are_ignored() {
        let a = vec![tensor("input", "FP32", &[1, 5])];
        let b = vec![tensor("something-else", "FP32", &[1, 5])];
        assert!(compatible(Some(&a), Some(&b)));
    }

    #[test]
    fn test_length_mismatch_is_incompatible() {
        let a = vec![tensor("a", "FP32", &[1, 5])];
        let b = vec![tensor("a", "FP32", &[1, 5]), tensor("b", "FP32", &[1, 5])];
        assert!(!compatible(Some(&a), Some(&b)));
        assert!(!compatible(Some(&b), Some(&a)));
    }

    #[test]
    fn test_datatype_rank_and_dims_must_match() {
        let base = vec![tensor("a", "FP32", &[1, 5])];
        assert!(!compatible(Some(&base), Some(&[tensor("a", "INT64", &[1, 5])])));
        assert!(!compatible(Some(&base), Some(&[tensor("a", "FP32", &[1, 5, 1])])));
        assert!(!compatible(Some(&base), Some(&[tensor("a", "FP32", &[1, 3])])));
    }

    #[test]
    fn test_negative_dims_compare_literally() {
        let a = vec![tensor("a", "FP32", &[-1, 5])];
        assert!(compatible(Some(&a), Some(&[tensor("b", "FP32", &[-1, 5])])));
        assert!(!compatible(Some(&a), Some(&[tensor("b", "FP32", &[8, 5])])));
    }

    #[test]
    fn test_describe_unknown_and_known() {
        assert_eq!(describe(None), "<unknown>");
        let a = vec![tensor("a", "FP32", &[1, 5])];
        assert_eq!(describe(Some(&a)), "[FP32[1, 5]]");
    }
}
