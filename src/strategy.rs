/// How sorted rows are rebuilt after the merge
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Encode whole rows, merge them and decode the merged records
    Binarize,
    /// Merge a narrow index of key columns and row ordinals, then copy the original lines in
    /// index order
    IndexPermute,
}
