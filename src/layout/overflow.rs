//! The protocol parts use to hand whatever did not fit on a page over to the next one.
//!
//! A part that runs out of room keeps the children it placed and moves the rest into a
//! *continuation*: a fresh part of the same kind with the same shared attributes, which
//! the caller lays out on the following page. Running out of room is never an error.

/// A part made of an ordered list of children that can be split between pages
pub trait Continuable: Sized {
    type Child;

    fn children_mut(&mut self) -> &mut Vec<Self::Child>;

    /// Build a new part of the same kind around `remainder`, carrying over the attributes
    /// every piece of a split part shares
    fn continue_with(&mut self, remainder: Vec<Self::Child>) -> Self;
}

/// Split `children` at `index`: everything before it is kept, everything from it onwards
/// is the remainder. `partial` is the unplaced tail of the child just before `index`
/// (whose placed head the caller keeps) and goes to the front of the remainder.
pub fn split<T>(mut children: Vec<T>, index: usize, partial: Option<T>) -> (Vec<T>, Vec<T>) {
    let index = index.min(children.len());
    let rest = children.split_off(index);
    let remainder = partial.into_iter().chain(rest).collect();
    (children, remainder)
}

/// Split `part` in place at `index` and return the continuation holding the remainder
pub fn split_off<C: Continuable>(part: &mut C, index: usize, partial: Option<C::Child>) -> C {
    let children = std::mem::take(part.children_mut());
    let (kept, remainder) = split(children, index, partial);
    log::debug!(
        "splitting part after {} children, {} continue on the next page",
        kept.len(),
        remainder.len()
    );
    *part.children_mut() = kept;
    part.continue_with(remainder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Default)]
    struct Column {
        tag: &'static str,
        items: Vec<u32>,
    }

    impl Continuable for Column {
        type Child = u32;

        fn children_mut(&mut self) -> &mut Vec<u32> {
            &mut self.items
        }

        fn continue_with(&mut self, remainder: Vec<u32>) -> Column {
            Column {
                tag: self.tag,
                items: remainder,
            }
        }
    }

    #[test]
    fn partial_child_leads_the_remainder() {
        let (kept, remainder) = split(vec![1, 2, 3, 4], 2, Some(20));
        assert_eq!(kept, vec![1, 2]);
        assert_eq!(remainder, vec![20, 3, 4]);
    }

    #[test]
    fn splitting_at_the_end_leaves_only_the_partial() {
        let (kept, remainder) = split(vec![1, 2], 5, Some(9));
        assert_eq!(kept, vec![1, 2]);
        assert_eq!(remainder, vec![9]);
    }

    #[test]
    fn continuations_carry_shared_attributes() {
        let mut column = Column {
            tag: "body",
            items: vec![1, 2, 3],
        };
        let rest = split_off(&mut column, 1, None);
        assert_eq!(column.items, vec![1]);
        assert_eq!(rest.items, vec![2, 3]);
        assert_eq!(rest.tag, "body");
    }

    proptest! {
        #[test]
        fn splitting_preserves_order(len in 0usize..50, at in 0usize..60) {
            let children: Vec<usize> = (0..len).collect();
            let (kept, remainder) = split(children.clone(), at, None);
            let joined: Vec<usize> = kept.into_iter().chain(remainder).collect();
            prop_assert_eq!(joined, children);
        }
    }
}
