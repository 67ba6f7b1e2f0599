pub mod fake_board;
pub mod test_data;
