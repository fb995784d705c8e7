pub mod head_to_head;
pub mod league;
pub mod weekly;
