// Column widths in terminal cells, borders excluded.
pub const COL_NAME: usize = 22;
pub const COL_PROFILE: usize = 36;
pub const COL_MESSAGE: usize = 58;

pub const EMPTY_CELL: &str = "-";
pub const ELLIPSIS: char = '…';
